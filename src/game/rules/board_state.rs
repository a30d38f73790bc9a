//! Board state representation for move validation
//!
//! The single source of truth for "what piece is where". Sensors only report
//! occupancy, so piece identity is tracked here and updated exclusively
//! through confirmed move and promotion events.

use crate::game::types::{Color, Piece, PieceKind, Square};
use serde::{Deserialize, Serialize};

/// Fixed starting layouts the board can be set up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartingLayout {
    /// Makruk setup: pawns on the third rows, kings facing each other
    #[default]
    Makruk,
    /// Orthodox setup, used when an orthodox engine chooses one side's moves
    Standard,
}

const WHITE_BACK_ROW: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

// Black's king and queen trade files relative to White.
const MAKRUK_BLACK_BACK_ROW: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::King,
    PieceKind::Queen,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl StartingLayout {
    fn pawn_rows(self) -> (u8, u8) {
        match self {
            StartingLayout::Makruk => (2, 5),
            StartingLayout::Standard => (1, 6),
        }
    }

    fn black_back_row(self) -> [PieceKind; 8] {
        match self {
            StartingLayout::Makruk => MAKRUK_BLACK_BACK_ROW,
            StartingLayout::Standard => WHITE_BACK_ROW,
        }
    }
}

/// 8x8 grid of occupants, indexed `[row][col]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardState {
    squares: [[Option<Piece>; 8]; 8],
}

impl BoardState {
    /// Board with no pieces
    pub fn empty() -> Self {
        Self::default()
    }

    /// Board populated with a fixed starting layout
    pub fn with_layout(layout: StartingLayout) -> Self {
        let mut board = Self::empty();
        let (white_pawns, black_pawns) = layout.pawn_rows();
        let black_back = layout.black_back_row();

        for col in 0..8u8 {
            board.squares[0][col as usize] =
                Some(Piece::new(WHITE_BACK_ROW[col as usize], Color::White));
            board.squares[white_pawns as usize][col as usize] =
                Some(Piece::new(PieceKind::Pawn, Color::White));
            board.squares[black_pawns as usize][col as usize] =
                Some(Piece::new(PieceKind::Pawn, Color::Black));
            board.squares[7][col as usize] = Some(Piece::new(black_back[col as usize], Color::Black));
        }
        board
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row() as usize][square.col() as usize]
    }

    pub fn get_piece_color(&self, square: Square) -> Option<Color> {
        self.piece_at(square).map(|piece| piece.color)
    }

    /// True if `square` holds a piece of the color opposing `color`
    pub fn is_opponent(&self, square: Square, color: Color) -> bool {
        self.get_piece_color(square)
            .is_some_and(|occupant| occupant != color)
    }

    /// Place (or clear, with `None`) an occupant
    pub fn set(&mut self, square: Square, occupant: Option<Piece>) {
        self.squares[square.row() as usize][square.col() as usize] = occupant;
    }

    /// Move whatever stands on `from` to `to`, returning the captured occupant
    ///
    /// No rule checking happens here; callers move only destinations the
    /// generator (or the engine instruction) confirmed.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Option<Piece> {
        let moving = self.piece_at(from);
        let captured = self.piece_at(to);
        self.set(to, moving);
        self.set(from, None);
        captured
    }

    /// Occupied squares in row-major order
    pub fn occupied_squares(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Occupancy mask (bit `row * 8 + col`) as sensors would report it
    pub fn occupancy(&self) -> u64 {
        self.occupied_squares()
            .fold(0u64, |mask, (square, _)| mask | (1u64 << square.index()))
    }

    /// Multi-line diagram, rank 8 on top, for debug logging
    pub fn diagram(&self) -> String {
        let mut out = String::from("  a b c d e f g h\n");
        for row in (0..8u8).rev() {
            out.push_str(&format!("{} ", row + 1));
            for col in 0..8u8 {
                let symbol = Square::new(row, col)
                    .and_then(|square| self.piece_at(square))
                    .map(Piece::symbol)
                    .unwrap_or('.');
                out.push(symbol);
                out.push(' ');
            }
            out.push_str(&format!("{}\n", row + 1));
        }
        out.push_str("  a b c d e f g h");
        out
    }
}
