//! Piece movement rules
//!
//! Pseudo-legal destination generation for the variant's simplified rule
//! set. Pure functions with no side effects - easy to test.
//!
//! The bishop and queen follow Makruk's Khon and Met: single steps only.
//! King safety, castling and en passant are not modelled.

use super::board_state::BoardState;
use crate::game::types::{Color, Piece, PieceKind, Square};
use smallvec::SmallVec;

/// Upper bound on destinations for any piece (queen-equivalent bound)
pub const MAX_MOVES: usize = 28;

/// Ordered destination list, stored inline
pub type MoveList = SmallVec<[Square; MAX_MOVES]>;

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];
const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Get all pseudo-legal destinations for the piece standing on `square`
///
/// Returns an empty list for an empty square. The output order is fixed per
/// piece kind, so repeated calls on an unchanged board are identical.
pub fn generate_moves(board: &BoardState, square: Square) -> MoveList {
    let mut moves = MoveList::new();
    let Some(piece) = board.piece_at(square) else {
        return moves;
    };

    match piece.kind {
        PieceKind::Pawn => add_pawn_moves(board, square, piece.color, &mut moves),
        PieceKind::Rook => add_sliding_moves(board, square, piece.color, &ORTHOGONAL, &mut moves),
        PieceKind::Knight => add_step_moves(board, square, piece.color, &KNIGHT_JUMPS, &mut moves),
        PieceKind::Bishop => {
            add_step_moves(board, square, piece.color, &DIAGONAL, &mut moves);
            add_step_moves(board, square, piece.color, &[(piece.color.forward(), 0)], &mut moves);
        }
        PieceKind::Queen => add_step_moves(board, square, piece.color, &DIAGONAL, &mut moves),
        PieceKind::King => add_step_moves(board, square, piece.color, &KING_STEPS, &mut moves),
    }

    debug_assert!(moves.len() <= MAX_MOVES);
    moves
}

/// Check if `to` is a pseudo-legal destination of the piece on `from`
pub fn is_legal_move(board: &BoardState, from: Square, to: Square) -> bool {
    generate_moves(board, from).contains(&to)
}

/// Check if a piece arriving on `target_row` must be promoted
///
/// Promotion happens on the row adjacent to the far edge's pawn row: row 5
/// for White, row 2 for Black.
pub fn is_promotion_move(piece: Piece, target_row: u8) -> bool {
    if piece.kind != PieceKind::Pawn {
        return false;
    }
    match piece.color {
        Color::White => target_row == 5,
        Color::Black => target_row == 2,
    }
}

/// The piece a promoting pawn becomes (always the queen-equivalent Met)
pub fn promoted_piece(color: Color) -> Piece {
    Piece::new(PieceKind::Queen, color)
}

fn add_pawn_moves(board: &BoardState, from: Square, color: Color, moves: &mut MoveList) {
    let forward = color.forward();

    // Forward move, no double step
    if let Some(to) = from.offset(forward, 0) {
        if board.is_empty(to) {
            moves.push(to);
        }
    }

    // Capture diagonally
    for d_col in [-1, 1] {
        if let Some(to) = from.offset(forward, d_col) {
            if board.is_opponent(to, color) {
                moves.push(to);
            }
        }
    }
}

fn add_step_moves(
    board: &BoardState,
    from: Square,
    color: Color,
    steps: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(d_row, d_col) in steps {
        if let Some(to) = from.offset(d_row, d_col) {
            if board.get_piece_color(to) != Some(color) {
                moves.push(to);
            }
        }
    }
}

fn add_sliding_moves(
    board: &BoardState,
    from: Square,
    color: Color,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(d_row, d_col) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            match board.get_piece_color(to) {
                None => moves.push(to),
                Some(occupant) => {
                    if occupant != color {
                        moves.push(to);
                    }
                    break;
                }
            }
            current = to;
        }
    }
}
