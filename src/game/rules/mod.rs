//! Chess rules module - Pure game logic without hardware coupling
//!
//! Implements the variant's move generation and board state management using
//! pure functions, so every rule can be unit tested without sensors or LEDs.
//!
//! # Module Structure
//!
//! - `piece_moves` - Movement rules for each piece kind (pawn, rook, knight, Khon, Met, king)
//! - `board_state` - Board representation and the fixed starting layouts
//! - `position` - Position strings for the external engine

pub mod board_state;
pub mod piece_moves;
pub mod position;


// Re-export commonly used items
pub use board_state::{BoardState, StartingLayout};
pub use piece_moves::{
    generate_moves, is_legal_move, is_promotion_move, promoted_piece, MoveList, MAX_MOVES,
};
pub use position::{parse_position_string, position_string};
