//! External engine opponent
//!
//! In assisted mode one side is played by a remote engine. The board cannot
//! move pieces, so the engine's answer becomes an instruction the human
//! carries out by hand.
//!
//! # Architecture
//!
//! - `EngineSettings` / `EngineDifficulty`: search depth and request bounds
//! - `EngineAdapter`: the seam between the controller and any engine
//! - `HttpEngine`: blocking HTTP client for the hosted service
//! - `parse_engine_response`: literal scan of the service's JSON answer
//!
//! # Integration Strategy
//!
//! The controller's `BoardState` is the source of truth. On the engine's turn:
//! 1. Serialize the board with `position_string`
//! 2. Block on `EngineAdapter::request_move`
//! 3. Validate the origin and store the move as the pending instruction
//! 4. Wait for the human to lift and place the piece, through the same
//!    reconciler as human moves

pub mod adapter;
pub mod http;
pub mod resource;

// Re-export for convenience
pub use adapter::{parse_engine_response, EngineAdapter, EngineError, MoveSpec};
pub use http::{HttpEngine, DEFAULT_ENGINE_ENDPOINT};
pub use resource::{EngineDifficulty, EngineSettings};
