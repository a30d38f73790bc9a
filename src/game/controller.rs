//! Game flow controller
//!
//! Single writer of the [`BoardState`]. Each poll the host hands it a fresh
//! [`SensorSnapshot`]; the controller diffs it against the previous one,
//! runs one reconciler step, and commits confirmed moves and promotions.
//!
//! # Game Phases
//!
//! ```text
//! AwaitingSetup ──verify_setup (exact match)──▶ InProgress { turn: White }
//!       ▲                                              │
//!       └──────────────────── reset ◀──────────────────┘
//! ```
//!
//! # Modes
//!
//! - **Local**: both sides human, Makruk starting layout, any piece may be
//!   lifted
//! - **Assisted**: one side human, the other answered by the engine and
//!   replayed by hand; standard layout, pickups gated by turn

use crate::game::ai::{EngineAdapter, EngineError, EngineSettings, MoveSpec};
use crate::game::error::{GameError, GameResult};
use crate::game::reconciler::{PickupGate, ReconcilerEvent, SelectionState, SensorReconciler};
use crate::game::rules::{parse_position_string, position_string, BoardState, StartingLayout};
use crate::game::sensors::SensorSnapshot;
use crate::game::types::{Color, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Who plays which side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Two humans at the board
    #[default]
    Local,
    /// Human against the external engine
    Assisted {
        /// The side the engine plays
        engine_color: Color,
    },
}

impl GameMode {
    /// Starting layout for this mode
    ///
    /// Assisted games use the standard layout because the engine plays
    /// orthodox chess.
    pub fn layout(self) -> StartingLayout {
        match self {
            GameMode::Local => StartingLayout::Makruk,
            GameMode::Assisted { .. } => StartingLayout::Standard,
        }
    }

    pub fn engine_color(self) -> Option<Color> {
        match self {
            GameMode::Local => None,
            GameMode::Assisted { engine_color } => Some(engine_color),
        }
    }
}

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Waiting for the physical pieces to match the starting layout
    #[default]
    AwaitingSetup,
    /// Moves are being tracked; `turn` is the side to move
    InProgress { turn: Color },
}

/// Result of comparing the sensors with the expected layout
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupReport {
    /// Squares that should hold a piece but read empty
    pub missing: Vec<Square>,
    /// Squares that should be empty but read occupied
    pub unexpected: Vec<Square>,
}

impl SetupReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// All mismatched squares, row-major
    pub fn mismatched(&self) -> Vec<Square> {
        let mut squares: Vec<Square> = self.missing.iter().chain(&self.unexpected).copied().collect();
        squares.sort_by_key(|square| square.index());
        squares
    }
}

/// What one tick produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Setup has not been verified yet; the snapshot was ignored
    NotStarted,
    /// No edge qualified
    Quiet,
    /// A confirmed event, already applied to the board
    Event(ReconcilerEvent),
    /// A non-fatal gesture error; the selection is unchanged
    Rejected(GameError),
}

/// Owns the board model and drives the reconciler
#[derive(Debug)]
pub struct GameController {
    mode: GameMode,
    board: BoardState,
    phase: GamePhase,
    reconciler: SensorReconciler,
    baseline: SensorSnapshot,
    instruction: Option<MoveSpec>,
    engine_failures: u32,
}

impl GameController {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            board: BoardState::with_layout(mode.layout()),
            phase: GamePhase::AwaitingSetup,
            reconciler: SensorReconciler::new(),
            baseline: SensorSnapshot::default(),
            instruction: None,
            engine_failures: 0,
        }
    }

    /// Start from an arbitrary position instead of a verified layout
    ///
    /// The game is immediately in progress and the edge baseline is the
    /// position's own occupancy, so the physical board must already match it.
    pub fn from_position(mode: GameMode, position: &str) -> GameResult<Self> {
        let (board, turn) = parse_position_string(position)?;
        let mut controller = Self::new(mode);
        controller.board = board;
        controller.phase = GamePhase::InProgress { turn };
        controller.baseline = SensorSnapshot::from_bits(board.occupancy());
        info!("[CONTROLLER] Loaded position {}", position);
        Ok(controller)
    }

    /// Back to setup with a fresh layout; any selection is discarded
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
        info!("[CONTROLLER] Reset, waiting for {:?} setup", self.mode.layout());
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn selection(&self) -> &SelectionState {
        self.reconciler.state()
    }

    /// Side to move; White before the game starts
    pub fn side_to_move(&self) -> Color {
        match self.phase {
            GamePhase::AwaitingSetup => Color::White,
            GamePhase::InProgress { turn } => turn,
        }
    }

    /// Engine move waiting to be replayed on the board
    pub fn instruction(&self) -> Option<MoveSpec> {
        self.instruction
    }

    /// Compare sensor occupancy with the expected layout
    ///
    /// On an exact match during setup the game starts with White to move and
    /// `snapshot` becomes the edge baseline.
    pub fn verify_setup(&mut self, snapshot: SensorSnapshot) -> SetupReport {
        let expected = self.board.occupancy();
        let mut report = SetupReport::default();
        for square in snapshot.mismatches(expected) {
            if snapshot.is_occupied(square) {
                report.unexpected.push(square);
            } else {
                report.missing.push(square);
            }
        }

        if report.is_complete() && self.phase == GamePhase::AwaitingSetup {
            self.phase = GamePhase::InProgress { turn: Color::White };
            self.baseline = snapshot;
            info!("[CONTROLLER] Setup verified, White to move");
        }
        report
    }

    /// Pickup gate for the current turn
    pub fn gate(&self) -> PickupGate {
        let turn = self.side_to_move();
        match self.mode {
            GameMode::Local => PickupGate::Any,
            GameMode::Assisted { engine_color } if turn != engine_color => PickupGate::Side(turn),
            GameMode::Assisted { .. } => match self.instruction {
                Some(spec) => PickupGate::Instruction {
                    from: spec.from,
                    to: spec.to,
                },
                None => PickupGate::Locked,
            },
        }
    }

    /// Process one sensor poll
    pub fn tick(&mut self, snapshot: SensorSnapshot) -> TickOutcome {
        let GamePhase::InProgress { turn } = self.phase else {
            return TickOutcome::NotStarted;
        };

        let edges = snapshot.edges_since(&self.baseline);
        self.baseline = snapshot;
        if edges.is_empty() {
            return TickOutcome::Quiet;
        }

        let gate = self.gate();
        match self.reconciler.reconcile(&self.board, &edges, gate) {
            None => TickOutcome::Quiet,
            Some(Err(error)) => TickOutcome::Rejected(error),
            Some(Ok(event)) => {
                self.apply(&event, turn);
                TickOutcome::Event(event)
            }
        }
    }

    fn apply(&mut self, event: &ReconcilerEvent, turn: Color) {
        match *event {
            ReconcilerEvent::Place { from, to, piece, .. } => {
                self.board.apply_move(from, to);
                self.phase = GamePhase::InProgress {
                    turn: turn.opposite(),
                };
                if self.instruction.take().is_some() {
                    info!("[CONTROLLER] Engine move {}{} replayed", from, to);
                }
                info!(
                    "[CONTROLLER] {} {} {}->{}, {} to move",
                    piece.color,
                    piece.symbol(),
                    from,
                    to,
                    turn.opposite()
                );
                debug!("[CONTROLLER] Board after move:\n{}", self.board.diagram());
            }
            ReconcilerEvent::Promotion { square, piece } => {
                self.board.set(square, Some(piece));
                info!("[CONTROLLER] Promoted on {} to {}", square, piece.symbol());
            }
            ReconcilerEvent::Pick { .. }
            | ReconcilerEvent::CaptureLift { .. }
            | ReconcilerEvent::Cancel { .. }
            | ReconcilerEvent::PromotionPieceRemoved { .. } => {}
        }
    }

    /// True when the engine should be asked for a move now
    pub fn needs_engine_move(&self) -> bool {
        let GamePhase::InProgress { turn } = self.phase else {
            return false;
        };
        self.mode.engine_color() == Some(turn)
            && self.selection().is_idle()
            && self.instruction.is_none()
    }

    /// Consecutive failed engine requests since the last success
    pub fn engine_failures(&self) -> u32 {
        self.engine_failures
    }

    /// True once more requests failed in a row than `settings` allows
    pub fn engine_retries_exhausted(&self, settings: &EngineSettings) -> bool {
        self.engine_failures > settings.max_retries
    }

    /// Ask the engine for its move and store it as the pending instruction
    ///
    /// Blocks for up to `settings.timeout_ms`. On any failure the board and
    /// the turn are untouched and the failure counter is bumped. A pending
    /// instruction is returned as-is without a new request.
    pub fn request_engine_move<E: EngineAdapter + ?Sized>(
        &mut self,
        engine: &E,
        settings: &EngineSettings,
    ) -> Result<MoveSpec, EngineError> {
        if let Some(spec) = self.instruction {
            return Ok(spec);
        }

        let turn = self.side_to_move();
        let position = position_string(&self.board, turn);
        let result = engine
            .request_move(&position, settings)
            .and_then(|spec| self.validate_engine_move(spec, turn));

        match result {
            Ok(spec) => {
                self.engine_failures = 0;
                self.instruction = Some(spec);
                info!("[CONTROLLER] Engine plays {}, waiting for replay", spec);
                Ok(spec)
            }
            Err(error) => {
                self.engine_failures += 1;
                warn!(
                    "[CONTROLLER] Engine request failed ({} in a row): {}",
                    self.engine_failures, error
                );
                Err(error)
            }
        }
    }

    fn validate_engine_move(&self, spec: MoveSpec, turn: Color) -> Result<MoveSpec, EngineError> {
        if spec.from == spec.to {
            return Err(EngineError::Parse(format!("null move {spec}")));
        }
        match self.board.piece_at(spec.from) {
            Some(piece) if piece.color == turn => {}
            _ => {
                return Err(EngineError::Parse(format!(
                    "move {spec} does not start on a {turn} piece"
                )))
            }
        }
        // Own-piece targets could never be replayed through the instruction gate
        if self.board.get_piece_color(spec.to) == Some(turn) {
            return Err(EngineError::Parse(format!(
                "move {spec} lands on a {turn} piece"
            )));
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Piece;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn started(mode: GameMode) -> (GameController, SensorSnapshot) {
        let mut controller = GameController::new(mode);
        let snapshot = SensorSnapshot::from_bits(controller.board().occupancy());
        assert!(controller.verify_setup(snapshot).is_complete());
        (controller, snapshot)
    }

    #[test]
    fn test_new_controller_awaits_setup() {
        let controller = GameController::new(GameMode::Local);
        assert_eq!(controller.phase(), GamePhase::AwaitingSetup);
        assert_eq!(controller.side_to_move(), Color::White);
        assert_eq!(
            *controller.board(),
            BoardState::with_layout(StartingLayout::Makruk)
        );
    }

    #[test]
    fn test_tick_ignored_before_setup() {
        let mut controller = GameController::new(GameMode::Local);
        let outcome = controller.tick(SensorSnapshot::from_bits(0));
        assert_eq!(outcome, TickOutcome::NotStarted);
    }

    #[test]
    fn test_setup_report_lists_mismatches() {
        let mut controller = GameController::new(GameMode::Local);
        let expected = SensorSnapshot::from_bits(controller.board().occupancy());
        let snapshot = expected.with(sq("a1"), false).with(sq("d4"), true);

        let report = controller.verify_setup(snapshot);
        assert_eq!(report.missing, vec![sq("a1")]);
        assert_eq!(report.unexpected, vec![sq("d4")]);
        assert_eq!(report.mismatched(), vec![sq("a1"), sq("d4")]);
        assert_eq!(controller.phase(), GamePhase::AwaitingSetup);
    }

    #[test]
    fn test_local_move_advances_turn() {
        let (mut controller, snapshot) = started(GameMode::Local);

        // Makruk White pawn on row 2
        let lifted = snapshot.with(sq("c3"), false);
        assert!(matches!(
            controller.tick(lifted),
            TickOutcome::Event(ReconcilerEvent::Pick { .. })
        ));

        let placed = lifted.with(sq("c4"), true);
        assert!(matches!(
            controller.tick(placed),
            TickOutcome::Event(ReconcilerEvent::Place { .. })
        ));
        assert_eq!(controller.side_to_move(), Color::Black);
        assert_eq!(controller.board().piece_at(sq("c4")), Piece::from_symbol('P'));
        assert!(controller.board().is_empty(sq("c3")));
    }

    #[test]
    fn test_reset_discards_progress() {
        let (mut controller, snapshot) = started(GameMode::Local);
        controller.tick(snapshot.with(sq("c3"), false));
        controller.reset();

        assert_eq!(controller.phase(), GamePhase::AwaitingSetup);
        assert!(controller.selection().is_idle());
    }

    #[test]
    fn test_gate_follows_turn_in_assisted_mode() {
        let mode = GameMode::Assisted {
            engine_color: Color::Black,
        };
        let controller =
            GameController::from_position(mode, "4k3/8/8/8/8/8/8/4K3 b KQkq - 0 1").unwrap();
        assert_eq!(controller.gate(), PickupGate::Locked);
        assert!(controller.needs_engine_move());

        let controller =
            GameController::from_position(mode, "4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1").unwrap();
        assert_eq!(controller.gate(), PickupGate::Side(Color::White));
        assert!(!controller.needs_engine_move());
    }

    struct FixedEngine(&'static str);

    impl EngineAdapter for FixedEngine {
        fn request_move(&self, _: &str, _: &EngineSettings) -> Result<MoveSpec, EngineError> {
            self.0.parse()
        }
    }

    #[test]
    fn test_engine_move_from_wrong_side_rejected() {
        let mode = GameMode::Assisted {
            engine_color: Color::Black,
        };
        let mut controller =
            GameController::from_position(mode, "4k3/8/8/8/8/8/8/4K3 b KQkq - 0 1").unwrap();
        let before = *controller.board();

        let result = controller.request_engine_move(&FixedEngine("e1e2"), &EngineSettings::default());
        assert!(matches!(result, Err(EngineError::Parse(_))));
        assert_eq!(*controller.board(), before);
        assert_eq!(controller.instruction(), None);
        assert_eq!(controller.engine_failures(), 1);
    }

    #[test]
    fn test_engine_move_onto_own_piece_rejected() {
        let mode = GameMode::Assisted {
            engine_color: Color::Black,
        };
        let mut controller =
            GameController::from_position(mode, "3qk3/8/8/8/8/8/8/4K3 b KQkq - 0 1").unwrap();

        let result = controller.request_engine_move(&FixedEngine("e8d8"), &EngineSettings::default());
        assert!(matches!(result, Err(EngineError::Parse(_))));
        assert_eq!(controller.instruction(), None);
        assert_eq!(controller.engine_failures(), 1);
        assert!(controller.needs_engine_move(), "Engine is asked again next poll");

        controller
            .request_engine_move(&FixedEngine("e8f8"), &EngineSettings::default())
            .unwrap();
        assert_eq!(
            controller.gate(),
            PickupGate::Instruction {
                from: sq("e8"),
                to: sq("f8")
            }
        );
    }

    #[test]
    fn test_retry_budget() {
        let mode = GameMode::Assisted {
            engine_color: Color::Black,
        };
        let mut controller =
            GameController::from_position(mode, "4k3/8/8/8/8/8/8/4K3 b KQkq - 0 1").unwrap();
        let settings = EngineSettings {
            max_retries: 1,
            ..EngineSettings::default()
        };

        let _ = controller.request_engine_move(&FixedEngine("zz"), &settings);
        assert!(!controller.engine_retries_exhausted(&settings));
        let _ = controller.request_engine_move(&FixedEngine("zz"), &settings);
        assert!(controller.engine_retries_exhausted(&settings));

        controller
            .request_engine_move(&FixedEngine("e8d8"), &settings)
            .unwrap();
        assert_eq!(controller.engine_failures(), 0);
    }
}
