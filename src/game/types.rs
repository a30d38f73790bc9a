//! Type definitions for board coordinates and pieces
//!
//! Provides small `Copy` types shared by the move generator, the sensor
//! reconciler and the engine adapter. Coordinates follow the physical board:
//! row 0 is White's baseline, row 7 is Black's baseline, and columns run from
//! file 'a' (0) to file 'h' (7).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows and columns on the board
pub const BOARD_SIZE: u8 = 8;

/// Board square position (row, col)
///
/// Both indices are in `0..8`. Constructors that take untrusted input return
/// `Option` so an out-of-range coordinate can never be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Create a square from row and column indices
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let square = Square::new(1, 4).unwrap(); // e2
    /// assert!(Square::new(8, 0).is_none());
    /// ```
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Square { row, col })
        } else {
            None
        }
    }

    /// Create a square from its row-major bit index (0-63)
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 64 {
            Some(Square {
                row: (index / 8) as u8,
                col: (index % 8) as u8,
            })
        } else {
            None
        }
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn col(self) -> u8 {
        self.col
    }

    /// Row-major bit index: `row * 8 + col`
    #[inline]
    pub const fn index(self) -> usize {
        (self.row as usize) * 8 + (self.col as usize)
    }

    /// Step by a signed (row, col) delta, returning `None` off the board
    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Chebyshev distance, used to find squares adjacent to a lifted piece
    pub fn distance(self, other: Square) -> u8 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Create a square from algebraic notation (e.g., "e2" = row 1, col 4)
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let square = Square::from_algebraic("e2").unwrap();
    /// assert_eq!((square.row(), square.col()), (1, 4));
    /// ```
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Self::from_file_rank(file, rank)
    }

    /// Decode a file letter ('a'..='h') and rank digit ('1'..='8')
    pub fn from_file_rank(file: char, rank: char) -> Option<Self> {
        let col = match file {
            'a'..='h' => file as u8 - b'a',
            _ => return None,
        };
        let row = match rank {
            '1'..='8' => rank as u8 - b'1',
            _ => return None,
        };
        Square::new(row, col)
    }

    /// Convert square to algebraic notation (e.g., "e2")
    pub fn to_algebraic(self) -> String {
        self.to_string()
    }

    /// Iterate all 64 squares in row-major order
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).filter_map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

/// Side of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a "forward" step: White advances up the board
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Active-color letter used in position strings
    pub fn letter(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

/// Piece kinds of the variant
///
/// Bishop and Queen keep their orthodox names (and symbols) so position
/// strings stay readable by an orthodox engine, but move like Khon and Met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c {
            'p' => Some(PieceKind::Pawn),
            'r' => Some(PieceKind::Rook),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A colored piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Piece { kind, color }
    }

    /// One of the 12 occupant symbols: uppercase White, lowercase Black
    pub fn symbol(self) -> char {
        let letter = self.kind.letter();
        match self.color {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }

    /// Parse an occupant symbol (`PRNBQK` / `prnbqk`)
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let kind = PieceKind::from_letter(symbol.to_ascii_lowercase())?;
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { kind, color })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
