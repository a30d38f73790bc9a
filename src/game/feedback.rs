//! Indicator feedback
//!
//! Every poll the host turns the controller's state into a [`Frame`] (one
//! optional color per square) and pushes it to the hardware only when it
//! differs from the last one shown. Frames are pure values so the colors can
//! be tested without a board.
//!
//! | Situation             | Squares                                   | Color      |
//! |-----------------------|-------------------------------------------|------------|
//! | Idle                  | occupied                                  | dim white  |
//! | Piece lifted          | other pieces, empty legal destinations    | dim white  |
//! |                       | legal captures                            | green      |
//! |                       | illegal squares next to the origin        | red        |
//! | Capture in progress   | target                                    | green      |
//! | Promotion             | promotion square                          | gold       |
//! | Engine instruction    | origin and destination                    | bright white |
//! | Engine thinking       | four corners                              | blue       |
//! | Setup                 | mismatched / correct                      | red / green |
//! | Sensor test           | every detected square                     | bright white |

use crate::game::controller::{GameController, GamePhase, SetupReport};
use crate::game::reconciler::SelectionState;
use crate::game::rules::BoardState;
use crate::game::sensors::SensorSnapshot;
use crate::game::types::{Square, BOARD_SIZE};
use crate::networking::hardware::BoardHardware;
use crate::networking::protocol::ProtocolError;
use serde::{Deserialize, Serialize};

/// RGB indicator color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl IndicatorColor {
    pub const DIM_WHITE: IndicatorColor = IndicatorColor::new(50, 50, 50);
    pub const GREEN: IndicatorColor = IndicatorColor::new(0, 255, 0);
    pub const RED: IndicatorColor = IndicatorColor::new(255, 0, 0);
    pub const GOLD: IndicatorColor = IndicatorColor::new(255, 215, 0);
    pub const BRIGHT_WHITE: IndicatorColor = IndicatorColor::new(255, 255, 255);
    pub const BLUE: IndicatorColor = IndicatorColor::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        IndicatorColor { r, g, b }
    }
}

/// One full board of indicator colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    cells: [[Option<IndicatorColor>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Frame {
    pub fn get(&self, square: Square) -> Option<IndicatorColor> {
        self.cells[square.row() as usize][square.col() as usize]
    }

    pub fn set(&mut self, square: Square, color: IndicatorColor) {
        self.cells[square.row() as usize][square.col() as usize] = Some(color);
    }

    /// Lit squares, row-major
    pub fn lit(&self) -> impl Iterator<Item = (Square, IndicatorColor)> + '_ {
        Square::all().filter_map(move |square| self.get(square).map(|color| (square, color)))
    }
}

/// Occupied squares in dim white
pub fn render_idle(board: &BoardState) -> Frame {
    let mut frame = Frame::default();
    for (square, _) in board.occupied_squares() {
        frame.set(square, IndicatorColor::DIM_WHITE);
    }
    frame
}

/// Raw sensor readings in bright white, independent of any game state
pub fn render_occupancy(snapshot: SensorSnapshot) -> Frame {
    let mut frame = Frame::default();
    for square in Square::all().filter(|square| snapshot.is_occupied(*square)) {
        frame.set(square, IndicatorColor::BRIGHT_WHITE);
    }
    frame
}

/// Frame for the current selection
pub fn render_selection(board: &BoardState, selection: &SelectionState) -> Frame {
    match selection {
        SelectionState::Idle => render_idle(board),

        SelectionState::Lifted {
            origin,
            piece,
            legal_destinations,
        } => {
            let mut frame = Frame::default();
            for (square, _) in board.occupied_squares() {
                if square != *origin {
                    frame.set(square, IndicatorColor::DIM_WHITE);
                }
            }
            for &target in legal_destinations {
                if board.is_opponent(target, piece.color) {
                    frame.set(target, IndicatorColor::GREEN);
                } else if board.is_empty(target) {
                    frame.set(target, IndicatorColor::DIM_WHITE);
                }
            }
            for square in Square::all() {
                if square.distance(*origin) == 1
                    && !legal_destinations.contains(&square)
                    && board.is_empty(square)
                {
                    frame.set(square, IndicatorColor::RED);
                }
            }
            frame
        }

        SelectionState::AwaitingCaptureRemoval { target, .. } => {
            let mut frame = Frame::default();
            frame.set(*target, IndicatorColor::GREEN);
            frame
        }

        SelectionState::AwaitingPromotion { square, .. } => {
            let mut frame = Frame::default();
            frame.set(*square, IndicatorColor::GOLD);
            frame
        }
    }
}

/// Engine move to replay: origin and destination, destination only once lifted
pub fn render_instruction(from: Square, to: Square, lifted: bool) -> Frame {
    let mut frame = Frame::default();
    if !lifted {
        frame.set(from, IndicatorColor::BRIGHT_WHITE);
    }
    frame.set(to, IndicatorColor::BRIGHT_WHITE);
    frame
}

/// Four blue corners while the engine is searching
pub fn render_thinking() -> Frame {
    let mut frame = Frame::default();
    for (row, col) in [(0, 0), (0, 7), (7, 0), (7, 7)] {
        if let Some(square) = Square::new(row, col) {
            frame.set(square, IndicatorColor::BLUE);
        }
    }
    frame
}

/// Setup progress: mismatched squares red, correctly occupied squares green
pub fn render_setup(expected: &BoardState, report: &SetupReport) -> Frame {
    let mut frame = Frame::default();
    for (square, _) in expected.occupied_squares() {
        frame.set(square, IndicatorColor::GREEN);
    }
    for square in report.mismatched() {
        frame.set(square, IndicatorColor::RED);
    }
    frame
}

/// Frame for an in-progress game
///
/// A pending engine instruction takes over the board until it is replayed;
/// during a capture or promotion the selection view still wins.
pub fn render_game(controller: &GameController) -> Frame {
    let selection = controller.selection();
    match (controller.instruction(), selection) {
        (Some(spec), SelectionState::Idle) => render_instruction(spec.from, spec.to, false),
        (Some(spec), SelectionState::Lifted { origin, .. }) if *origin == spec.from => {
            render_instruction(spec.from, spec.to, true)
        }
        _ if controller.phase() == GamePhase::AwaitingSetup => Frame::default(),
        _ => render_selection(controller.board(), selection),
    }
}

/// Push a frame to the hardware: clear, stage every lit square, commit
pub fn present<H: BoardHardware + ?Sized>(hardware: &mut H, frame: &Frame) -> Result<(), ProtocolError> {
    hardware.clear_indicators()?;
    for (square, color) in frame.lit() {
        hardware.set_square_indicator(square, color);
    }
    hardware.commit_indicators()
}
