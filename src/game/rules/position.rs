//! Position strings handed to the external move-selection service
//!
//! The placement field is real FEN; the four trailing fields are constants
//! (`KQkq - 0 1`) because castling rights, en passant and move counters are
//! not tracked by this board.

use super::board_state::BoardState;
use crate::game::error::{GameError, GameResult};
use crate::game::types::{Color, Piece, Square};

/// Castling, en-passant and counter fields appended to every position
pub const FIXED_TRAILER: &str = "KQkq - 0 1";

/// Serialize `board` with `active` to move, far rank (row 7) first
///
/// # Examples
///
/// ```rust,ignore
/// // Lone kings on e1 and e8, White to move
/// assert_eq!(position_string(&board, Color::White), "4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1");
/// ```
pub fn position_string(board: &BoardState, active: Color) -> String {
    let mut out = String::with_capacity(64);

    for row in (0..8u8).rev() {
        let mut empty_run = 0u8;
        for col in 0..8u8 {
            let occupant = Square::new(row, col).and_then(|square| board.piece_at(square));
            match occupant {
                Some(piece) => {
                    if empty_run > 0 {
                        out.push(char::from(b'0' + empty_run));
                        empty_run = 0;
                    }
                    out.push(piece.symbol());
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            out.push(char::from(b'0' + empty_run));
        }
        if row > 0 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(active.letter());
    out.push(' ');
    out.push_str(FIXED_TRAILER);
    out
}

/// Read the placement and active-color fields of a position string
///
/// Any trailing fields are accepted and ignored.
pub fn parse_position_string(position: &str) -> GameResult<(BoardState, Color)> {
    let mut fields = position.split_whitespace();
    let placement = fields.next().ok_or_else(|| invalid("empty position"))?;
    let active = match fields.next() {
        Some("w") => Color::White,
        Some("b") => Color::Black,
        Some(other) => return Err(invalid(format!("unknown active color '{other}'"))),
        None => return Err(invalid("missing active color")),
    };

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, found {}", ranks.len())));
    }

    let mut board = BoardState::empty();
    for (i, rank) in ranks.iter().enumerate() {
        let row = 7 - i as u8;
        let mut col = 0u8;
        for c in rank.chars() {
            if let Some(run) = c.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(invalid(format!("bad empty run '{c}' on rank {}", row + 1)));
                }
                col += run as u8;
            } else {
                let piece =
                    Piece::from_symbol(c).ok_or_else(|| invalid(format!("unknown piece '{c}'")))?;
                let square = Square::new(row, col)
                    .ok_or_else(|| invalid(format!("rank {} overflows", row + 1)))?;
                board.set(square, Some(piece));
                col += 1;
            }
            if col > 8 {
                return Err(invalid(format!("rank {} overflows", row + 1)));
            }
        }
        if col != 8 {
            return Err(invalid(format!("rank {} has {col} squares", row + 1)));
        }
    }

    Ok((board, active))
}

fn invalid(message: impl Into<String>) -> GameError {
    GameError::InvalidPosition {
        message: message.into(),
    }
}
