//! Sensor occupancy snapshots and edge detection
//!
//! Occupancy is stored as a bitboard: bit `row * 8 + col` set means the
//! square's sensor reads "occupied". Comparing two consecutive snapshots
//! yields per-square edges in row-major order (ascending bit index).
//!
//! Debouncing is the hardware layer's job; a snapshot is taken at face value.

use crate::game::types::Square;
use std::fmt;

/// Direction of a sensor reading change between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Occupied -> unoccupied: a piece was lifted
    Falling,
    /// Unoccupied -> occupied: a piece was placed
    Rising,
}

/// A single square's transition between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorEdge {
    pub square: Square,
    pub kind: EdgeKind,
}

impl SensorEdge {
    pub fn falling(square: Square) -> Self {
        SensorEdge {
            square,
            kind: EdgeKind::Falling,
        }
    }

    pub fn rising(square: Square) -> Self {
        SensorEdge {
            square,
            kind: EdgeKind::Rising,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.kind == EdgeKind::Falling
    }

    pub fn is_rising(&self) -> bool {
        self.kind == EdgeKind::Rising
    }
}

impl fmt::Display for SensorEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.kind {
            EdgeKind::Falling => "lifted",
            EdgeKind::Rising => "placed",
        };
        write!(f, "{} {}", self.square, arrow)
    }
}

/// One poll's worth of occupancy readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SensorSnapshot {
    occupied: u64,
}

impl SensorSnapshot {
    /// Snapshot from a raw occupancy mask
    pub const fn from_bits(occupied: u64) -> Self {
        SensorSnapshot { occupied }
    }

    /// Snapshot from an `[row][col]` matrix, as a hardware scan produces it
    pub fn from_matrix(matrix: &[[bool; 8]; 8]) -> Self {
        let mut snapshot = SensorSnapshot::default();
        for (row, cells) in matrix.iter().enumerate() {
            for (col, &occupied) in cells.iter().enumerate() {
                if let Some(square) = Square::new(row as u8, col as u8) {
                    snapshot.set(square, occupied);
                }
            }
        }
        snapshot
    }

    pub const fn bits(&self) -> u64 {
        self.occupied
    }

    /// No sensor reads a piece
    pub const fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.occupied & (1u64 << square.index()) != 0
    }

    #[inline]
    pub fn set(&mut self, square: Square, occupied: bool) {
        let mask = 1u64 << square.index();
        if occupied {
            self.occupied |= mask;
        } else {
            self.occupied &= !mask;
        }
    }

    /// Copy of this snapshot with one square changed
    pub fn with(mut self, square: Square, occupied: bool) -> Self {
        self.set(square, occupied);
        self
    }

    /// Edges from `previous` to `self`, row-major
    pub fn edges_since(&self, previous: &SensorSnapshot) -> Vec<SensorEdge> {
        let mut changed = self.occupied ^ previous.occupied;
        let mut edges = Vec::with_capacity(changed.count_ones() as usize);

        while changed != 0 {
            let index = changed.trailing_zeros() as usize;
            changed &= changed - 1;
            if let Some(square) = Square::from_index(index) {
                let edge = if self.occupied & (1u64 << index) != 0 {
                    SensorEdge::rising(square)
                } else {
                    SensorEdge::falling(square)
                };
                edges.push(edge);
            }
        }
        edges
    }

    /// Occupancy grid, rank 8 on top, `X` for a detected piece
    pub fn diagram(&self) -> String {
        let mut out = String::from("  a b c d e f g h\n");
        for row in (0..8u8).rev() {
            out.push_str(&format!("{} ", row + 1));
            for col in 0..8u8 {
                let occupied = Square::new(row, col).is_some_and(|square| self.is_occupied(square));
                out.push(if occupied { 'X' } else { '.' });
                out.push(' ');
            }
            out.push_str(&format!("{}\n", row + 1));
        }
        out.push_str("  a b c d e f g h");
        out
    }

    /// Squares whose reading differs from an expected occupancy mask
    pub fn mismatches(&self, expected: u64) -> Vec<Square> {
        let mut diff = self.occupied ^ expected;
        let mut squares = Vec::new();
        while diff != 0 {
            let index = diff.trailing_zeros() as usize;
            diff &= diff - 1;
            squares.extend(Square::from_index(index));
        }
        squares
    }
}
