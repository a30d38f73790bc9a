//! Error types for game module
//!
//! Every game error is non-fatal and scoped to the gesture or request that
//! raised it: the board model is never left half-updated.

use crate::game::types::Square;

/// Errors that can occur in game logic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A lifted piece was set down on a square it cannot reach
    #[error("Invalid placement on {square}")]
    InvalidPlacement { square: Square },

    /// A piece was lifted that may not move now (wrong side, or not the
    /// piece the engine asked for)
    #[error("Illegal pickup at {square}")]
    IllegalPickup { square: Square },

    /// A position string could not be read
    #[error("Invalid position string: {message}")]
    InvalidPosition { message: String },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
