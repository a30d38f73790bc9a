//! Game Flow Integration Tests
//!
//! Drives the controller and the polling session with simulated sensor
//! snapshots:
//! - Setup verification
//! - Lift/place gestures, captures and promotions
//! - Turn gating in assisted mode
//! - Engine instructions replayed by hand
//! - Board-cleared reset and the sensor test mode

use boardsense::game::ai::{EngineAdapter, EngineError, EngineSettings, MoveSpec};
use boardsense::game::controller::{GameController, GameMode, GamePhase, TickOutcome};
use boardsense::game::error::GameError;
use boardsense::game::reconciler::{PickupGate, ReconcilerEvent, SelectionState};
use boardsense::game::rules::{BoardState, StartingLayout};
use boardsense::game::sensors::SensorSnapshot;
use boardsense::game::types::{Color, Piece, Square};
use boardsense::networking::MockBoard;
use boardsense::session::Session;
use std::cell::RefCell;
use std::collections::VecDeque;

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

fn occupancy(controller: &GameController) -> SensorSnapshot {
    SensorSnapshot::from_bits(controller.board().occupancy())
}

/// Controller that has already passed setup
fn started(mode: GameMode) -> GameController {
    let mut controller = GameController::new(mode);
    let snapshot = occupancy(&controller);
    let report = controller.verify_setup(snapshot);
    assert!(report.is_complete(), "Starting layout should verify");
    controller
}

const ASSISTED_BLACK_ENGINE: GameMode = GameMode::Assisted {
    engine_color: Color::Black,
};

/// Engine that answers from a fixed script and records what it was asked
struct ScriptedEngine {
    replies: RefCell<VecDeque<Result<MoveSpec, EngineError>>>,
    positions: RefCell<Vec<String>>,
}

impl ScriptedEngine {
    fn new(replies: Vec<Result<MoveSpec, EngineError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            positions: RefCell::new(Vec::new()),
        }
    }
}

impl EngineAdapter for ScriptedEngine {
    fn request_move(
        &self,
        position: &str,
        _settings: &EngineSettings,
    ) -> Result<MoveSpec, EngineError> {
        self.positions.borrow_mut().push(position.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::Connection("script exhausted".to_string())))
    }
}

// ============================================================================
// Setup Tests
// ============================================================================

#[test]
fn test_setup_waits_for_exact_layout() {
    let mut controller = GameController::new(GameMode::Local);
    let full = occupancy(&controller);

    let report = controller.verify_setup(full.with(sq("e1"), false));
    assert_eq!(report.missing, vec![sq("e1")]);
    assert_eq!(controller.phase(), GamePhase::AwaitingSetup);

    let report = controller.verify_setup(full);
    assert!(report.is_complete());
    assert_eq!(
        controller.phase(),
        GamePhase::InProgress { turn: Color::White },
        "White moves first"
    );
}

#[test]
fn test_assisted_mode_uses_standard_layout() {
    let controller = GameController::new(ASSISTED_BLACK_ENGINE);
    assert_eq!(
        *controller.board(),
        BoardState::with_layout(StartingLayout::Standard)
    );
}

// ============================================================================
// Gesture Tests
// ============================================================================

#[test]
fn test_lift_and_replace_leaves_board_unchanged() {
    let mut controller =
        GameController::from_position(GameMode::Local, "8/8/8/8/3K4/8/8/8 w KQkq - 0 1").unwrap();
    let before = *controller.board();
    let full = occupancy(&controller);
    let square = Square::new(3, 3).unwrap();

    controller.tick(full.with(square, false));
    let outcome = controller.tick(full);

    assert_eq!(outcome, TickOutcome::Event(ReconcilerEvent::Cancel { origin: square }));
    assert!(controller.selection().is_idle());
    assert_eq!(*controller.board(), before, "Board must be untouched");
    assert_eq!(controller.side_to_move(), Color::White, "Turn must not advance");
}

#[test]
fn test_wrong_square_then_right_square() {
    let mut controller = started(GameMode::Local);
    let full = occupancy(&controller);

    let lifted = full.with(sq("d3"), false);
    controller.tick(lifted);

    // Pawn set down two squares ahead: rejected, still in hand
    let wrong = lifted.with(sq("d5"), true);
    assert_eq!(
        controller.tick(wrong),
        TickOutcome::Rejected(GameError::InvalidPlacement { square: sq("d5") })
    );
    assert!(matches!(controller.selection(), SelectionState::Lifted { .. }));

    // Picked back up off d5 and placed correctly
    let corrected = wrong.with(sq("d5"), false).with(sq("d4"), true);
    assert!(matches!(
        controller.tick(corrected),
        TickOutcome::Event(ReconcilerEvent::Place { .. })
    ));
    assert_eq!(controller.board().piece_at(sq("d4")), Piece::from_symbol('P'));
}

#[test]
fn test_capture_sequence() {
    let mut controller = GameController::from_position(
        GameMode::Local,
        "4k3/8/8/3p4/4P3/8/8/4K3 w KQkq - 0 1",
    )
    .unwrap();
    let full = occupancy(&controller);

    controller.tick(full.with(sq("e4"), false));
    let target_lifted = full.with(sq("e4"), false).with(sq("d5"), false);
    assert!(matches!(
        controller.tick(target_lifted),
        TickOutcome::Event(ReconcilerEvent::CaptureLift { target, .. }) if target == sq("d5")
    ));

    let placed = target_lifted.with(sq("d5"), true);
    assert_eq!(
        controller.tick(placed),
        TickOutcome::Event(ReconcilerEvent::Place {
            from: sq("e4"),
            to: sq("d5"),
            piece: Piece::from_symbol('P').unwrap(),
            captured: Piece::from_symbol('p'),
            promotes: false,
        })
    );
    assert_eq!(controller.board().piece_at(sq("d5")), Piece::from_symbol('P'));
    assert_eq!(controller.side_to_move(), Color::Black);
}

#[test]
fn test_promotion_sequence() {
    let mut controller =
        GameController::from_position(GameMode::Local, "4k3/8/8/2P5/8/8/8/4K3 w KQkq - 0 1")
            .unwrap();
    let full = occupancy(&controller);

    let lifted = full.with(sq("c5"), false);
    controller.tick(lifted);
    let placed = lifted.with(sq("c6"), true);
    assert!(matches!(
        controller.tick(placed),
        TickOutcome::Event(ReconcilerEvent::Place { promotes: true, .. })
    ));
    assert!(matches!(
        controller.selection(),
        SelectionState::AwaitingPromotion { .. }
    ));

    let cleared = placed.with(sq("c6"), false);
    assert_eq!(
        controller.tick(cleared),
        TickOutcome::Event(ReconcilerEvent::PromotionPieceRemoved { square: sq("c6") })
    );
    controller.tick(placed);

    assert_eq!(controller.board().piece_at(sq("c6")), Piece::from_symbol('Q'));
    assert!(controller.selection().is_idle());
}

// ============================================================================
// Assisted Mode Tests
// ============================================================================

#[test]
fn test_illegal_pickup_of_side_not_to_move() {
    let mut controller = started(ASSISTED_BLACK_ENGINE);
    let full = occupancy(&controller);

    let outcome = controller.tick(full.with(sq("e7"), false));
    assert_eq!(
        outcome,
        TickOutcome::Rejected(GameError::IllegalPickup { square: sq("e7") })
    );
    assert!(controller.selection().is_idle());
}

#[test]
fn test_engine_instruction_replayed_by_hand() {
    let mut controller = started(ASSISTED_BLACK_ENGINE);
    let full = occupancy(&controller);

    // Human (White) pushes e2-e3
    let after_white = full.with(sq("e2"), false);
    controller.tick(after_white);
    let after_white = after_white.with(sq("e3"), true);
    controller.tick(after_white);
    assert!(controller.needs_engine_move());
    assert_eq!(controller.gate(), PickupGate::Locked);

    let engine = ScriptedEngine::new(vec![Ok("e7e6".parse().unwrap())]);
    let spec = controller
        .request_engine_move(&engine, &EngineSettings::default())
        .unwrap();
    assert_eq!(
        engine.positions.borrow().as_slice(),
        &["rnbqkbnr/pppppppp/8/8/8/4P3/PPPP1PPP/RNBQKBNR b KQkq - 0 1".to_string()]
    );
    assert_eq!(controller.instruction(), Some(spec));
    assert!(!controller.needs_engine_move());

    // Wrong piece first
    assert_eq!(
        controller.tick(after_white.with(sq("d7"), false)),
        TickOutcome::Rejected(GameError::IllegalPickup { square: sq("d7") })
    );

    // Putting d7 back down is not a qualifying edge in Idle
    controller.tick(after_white);
    let lifted = after_white.with(sq("e7"), false);
    assert!(matches!(
        controller.tick(lifted),
        TickOutcome::Event(ReconcilerEvent::Pick { ref destinations, .. }) if destinations.as_slice() == [sq("e6")]
    ));
    controller.tick(lifted.with(sq("e6"), true));

    assert_eq!(controller.board().piece_at(sq("e6")), Piece::from_symbol('p'));
    assert_eq!(controller.instruction(), None);
    assert_eq!(controller.side_to_move(), Color::White);
}

#[test]
fn test_engine_failure_leaves_game_untouched() {
    let mode = ASSISTED_BLACK_ENGINE;
    let mut controller =
        GameController::from_position(mode, "4k3/8/8/8/8/8/8/4K3 b KQkq - 0 1").unwrap();
    let before = *controller.board();

    let engine = ScriptedEngine::new(vec![Err(EngineError::Timeout(30_000))]);
    let result = controller.request_engine_move(&engine, &EngineSettings::default());

    assert_eq!(result, Err(EngineError::Timeout(30_000)));
    assert_eq!(*controller.board(), before);
    assert_eq!(controller.side_to_move(), Color::Black);
    assert!(controller.needs_engine_move(), "Engine turn is still pending");
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_session_signals_setup_complete() {
    let layout = BoardState::with_layout(StartingLayout::Makruk);
    let mut board = MockBoard::with_occupancy(layout.occupancy());
    let engine = ScriptedEngine::new(Vec::new());
    let mut session = Session::new(GameMode::Local, EngineSettings::default());

    session.poll(&mut board, &engine).unwrap();

    let sent = board.take_sent();
    assert_eq!(sent.first().map(String::as_str), Some("C"));
    assert_eq!(sent.last().map(String::as_str), Some("S"));
    assert_eq!(sent.iter().filter(|line| line.ends_with("0 255 0")).count(), 64);
    assert!(matches!(
        session.controller().phase(),
        GamePhase::InProgress { .. }
    ));
}

#[test]
fn test_session_rejects_with_red_square() {
    let layout = BoardState::with_layout(StartingLayout::Standard);
    let mut board = MockBoard::with_occupancy(layout.occupancy());
    let engine = ScriptedEngine::new(Vec::new());
    let mut session = Session::new(ASSISTED_BLACK_ENGINE, EngineSettings::default());
    session.poll(&mut board, &engine).unwrap();
    board.take_sent();

    board.lift(sq("a7"));
    session.poll(&mut board, &engine).unwrap();
    assert_eq!(board.sent_lines(), &["L 6 0 255 0 0", "S"]);
}

#[test]
fn test_session_requests_engine_move_once() {
    let mut board = MockBoard::new();
    let controller = GameController::from_position(
        ASSISTED_BLACK_ENGINE,
        "4k3/8/8/8/8/8/8/4K3 b KQkq - 0 1",
    )
    .unwrap();
    for (square, _) in controller.board().occupied_squares() {
        board.place(square);
    }
    let engine = ScriptedEngine::new(vec![Ok("e8d8".parse().unwrap())]);
    let mut session = Session::with_controller(controller, EngineSettings::default());

    session.poll(&mut board, &engine).unwrap();
    session.poll(&mut board, &engine).unwrap();

    assert_eq!(engine.positions.borrow().len(), 1, "Instruction is reused, not re-requested");
    let sent = board.sent_lines();
    assert!(sent.contains(&"L 0 0 0 0 255".to_string()), "Thinking corners shown");
    assert!(sent.contains(&"L 7 4 255 255 255".to_string()), "Origin lit");
    assert!(sent.contains(&"L 7 3 255 255 255".to_string()), "Destination lit");
}

#[test]
fn test_session_gives_up_after_retry_budget() {
    let mut board = MockBoard::new();
    let controller = GameController::from_position(
        ASSISTED_BLACK_ENGINE,
        "4k3/8/8/8/8/8/8/4K3 b KQkq - 0 1",
    )
    .unwrap();
    for (square, _) in controller.board().occupied_squares() {
        board.place(square);
    }
    let settings = EngineSettings {
        max_retries: 2,
        ..EngineSettings::default()
    };
    let engine = ScriptedEngine::new(Vec::new());
    let mut session = Session::with_controller(controller, settings);

    for _ in 0..10 {
        session.poll(&mut board, &engine).unwrap();
    }
    assert_eq!(
        engine.positions.borrow().len(),
        3,
        "One request plus two retries"
    );
    assert_eq!(session.controller().side_to_move(), Color::Black);
}

#[test]
fn test_cleared_board_resets_after_engine_gives_up() {
    let mut board = MockBoard::new();
    let controller = GameController::from_position(
        ASSISTED_BLACK_ENGINE,
        "4k3/8/8/8/8/8/8/4K3 b KQkq - 0 1",
    )
    .unwrap();
    for (square, _) in controller.board().occupied_squares() {
        board.place(square);
    }
    let settings = EngineSettings {
        max_retries: 2,
        ..EngineSettings::default()
    };
    let failure = || -> Result<MoveSpec, EngineError> {
        Err(EngineError::Connection("offline".to_string()))
    };
    let engine = ScriptedEngine::new(vec![
        failure(),
        failure(),
        failure(),
        Ok("e7e5".parse().unwrap()),
    ]);
    let mut session = Session::with_controller(controller, settings);

    for _ in 0..5 {
        session.poll(&mut board, &engine).unwrap();
    }
    assert_eq!(engine.positions.borrow().len(), 3);

    // Sweep the board clear
    board.lift(sq("e1"));
    board.lift(sq("e8"));
    session.poll(&mut board, &engine).unwrap();
    assert_eq!(session.controller().phase(), GamePhase::AwaitingSetup);
    assert_eq!(session.controller().engine_failures(), 0);

    // Set up again and play e2-e3; the engine is asked once more
    let layout = BoardState::with_layout(StartingLayout::Standard);
    for (square, _) in layout.occupied_squares() {
        board.place(square);
    }
    session.poll(&mut board, &engine).unwrap();
    assert_eq!(
        session.controller().phase(),
        GamePhase::InProgress { turn: Color::White }
    );

    board.lift(sq("e2"));
    session.poll(&mut board, &engine).unwrap();
    board.place(sq("e3"));
    session.poll(&mut board, &engine).unwrap();

    let positions = engine.positions.borrow();
    assert_eq!(positions.len(), 4, "Requests resume after the reset");
    assert_eq!(
        positions[3],
        "rnbqkbnr/pppppppp/8/8/8/4P3/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
    );
    assert_eq!(
        session.controller().instruction(),
        "e7e5".parse::<MoveSpec>().ok()
    );
}

#[test]
fn test_empty_board_before_any_reading_keeps_loaded_position() {
    let controller = GameController::from_position(
        GameMode::Local,
        "4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1",
    )
    .unwrap();
    let mut board = MockBoard::new();
    let engine = ScriptedEngine::new(Vec::new());
    let mut session = Session::with_controller(controller, EngineSettings::default());

    // No reports have arrived yet
    session.poll(&mut board, &engine).unwrap();
    assert_eq!(
        session.controller().phase(),
        GamePhase::InProgress { turn: Color::White }
    );
}

#[test]
fn test_sensor_test_mirrors_raw_occupancy() {
    let mut board = MockBoard::new();
    board.place(sq("a1"));
    board.place(sq("d5"));
    let engine = ScriptedEngine::new(Vec::new());
    let mut session = Session::sensor_test();

    session.poll(&mut board, &engine).unwrap();
    assert_eq!(
        board.take_sent(),
        vec!["C", "L 0 0 255 255 255", "L 4 3 255 255 255", "S"]
    );

    // Unchanged readings are not re-sent
    session.poll(&mut board, &engine).unwrap();
    assert!(board.sent_lines().is_empty());

    board.lift(sq("a1"));
    board.place(sq("h8"));
    session.poll(&mut board, &engine).unwrap();
    assert_eq!(
        board.take_sent(),
        vec!["C", "L 4 3 255 255 255", "L 7 7 255 255 255", "S"]
    );

    assert_eq!(session.controller().phase(), GamePhase::AwaitingSetup);
    assert!(engine.positions.borrow().is_empty());
}
