//! Game logic - pure board model and sensor reconciliation
//!
//! Everything here is independent of the physical board: sensor readings
//! come in as [`sensors::SensorSnapshot`] values and feedback goes out as
//! [`feedback::Frame`] values, so the whole game can be driven from tests.
//!
//! # Module Organization
//!
//! - `types` - squares, colors, pieces
//! - `rules` - move generation, board state, position strings
//! - `sensors` - occupancy snapshots and edge detection
//! - `reconciler` - selection state machine turning edges into moves
//! - `controller` - game phase, turn, engine instruction; sole board writer
//! - `feedback` - indicator frames for each situation
//! - `ai` - external engine adapter and HTTP client
//!
//! # Data Flow
//!
//! 1. Host samples a snapshot
//! 2. `GameController::tick` diffs it and runs one reconciler step
//! 3. Confirmed moves and promotions are committed to the `BoardState`
//! 4. Host renders a feedback frame from the controller

pub mod ai;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod reconciler;
pub mod rules;
pub mod sensors;
pub mod types;

pub use controller::{GameController, GameMode, GamePhase, SetupReport, TickOutcome};
pub use error::{GameError, GameResult};
