//! Sensor chessboard controller
//!
//! Tracks a Makruk-style game on a board that only senses occupancy, guides
//! the players with per-square indicators, and optionally plays one side
//! through an external engine.

pub mod core;
pub mod game;
pub mod networking;
pub mod session;
