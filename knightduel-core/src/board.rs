//! Square board geometry with (row, col) coordinates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default board dimension
pub const DEFAULT_BOARD_SIZE: u8 = 8;

/// Largest supported board dimension (bounded by `SquareSet` capacity)
pub const MAX_BOARD_SIZE: u8 = 16;

/// The eight knight displacements (drow, dcol), in generation order
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

/// A board square, 0-indexed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Displace by (drow, dcol); `None` if either coordinate goes negative
    pub fn offset(self, drow: i8, dcol: i8) -> Option<Square> {
        Some(Square::new(
            self.row.checked_add_signed(drow)?,
            self.col.checked_add_signed(dcol)?,
        ))
    }

    /// Square colour: 0 or 1
    pub fn parity(self) -> u8 {
        (self.row + self.col) % 2
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl FromStr for Square {
    type Err = Error;

    /// Parses `r,c` or `(r,c)`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (row, col) = trimmed
            .split_once(',')
            .ok_or_else(|| Error::InvalidSquare(s.to_string()))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSquare(s.to_string()))?;
        let col = col
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSquare(s.to_string()))?;
        Ok(Square::new(row, col))
    }
}

/// An N x N board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: u8,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
        }
    }
}

impl Board {
    pub fn new(size: u8) -> Result<Self> {
        if size == 0 {
            return Err(Error::BoardTooSmall(size, 1));
        }
        if size > MAX_BOARD_SIZE {
            return Err(Error::BoardTooLarge(size));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Total number of squares
    pub fn area(&self) -> usize {
        self.size as usize * self.size as usize
    }

    /// Check if a square lies on the board
    pub fn contains(&self, sq: Square) -> bool {
        sq.row < self.size && sq.col < self.size
    }

    /// Reject squares supplied from outside the engine
    pub fn check(&self, sq: Square) -> Result<Square> {
        if self.contains(sq) {
            Ok(sq)
        } else {
            Err(Error::StartOutOfBounds {
                square: sq,
                size: self.size,
            })
        }
    }

    /// All squares in row-major order
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        let n = self.size;
        (0..n).flat_map(move |r| (0..n).map(move |c| Square::new(r, c)))
    }

    /// Centre coordinate (N-1)/2, shared by both axes
    pub fn center(&self) -> f32 {
        (self.size as f32 - 1.0) / 2.0
    }

    pub fn manhattan_to_center(&self, sq: Square) -> f32 {
        let c = self.center();
        (sq.row as f32 - c).abs() + (sq.col as f32 - c).abs()
    }

    pub fn chebyshev_to_center(&self, sq: Square) -> f32 {
        let c = self.center();
        (sq.row as f32 - c).abs().max((sq.col as f32 - c).abs())
    }

    pub fn euclidean_to_center(&self, sq: Square) -> f64 {
        let c = self.center() as f64;
        (sq.row as f64 - c).hypot(sq.col as f64 - c)
    }

    /// Distance to the nearest edge (0 on the rim)
    pub fn edge_distance(&self, sq: Square) -> u8 {
        let last = self.size - 1;
        sq.row.min(last - sq.row).min(sq.col).min(last - sq.col)
    }

    /// Point reflection through the centre
    pub fn reflect_through_center(&self, sq: Square) -> Square {
        let last = self.size - 1;
        Square::new(last - sq.row, last - sq.col)
    }

    /// Reflection across the vertical centre line
    pub fn reflect_columns(&self, sq: Square) -> Square {
        Square::new(sq.row, self.size - 1 - sq.col)
    }

    /// Knight destinations that stay on the board, in offset order
    pub fn knight_targets(&self, from: Square) -> impl Iterator<Item = Square> + '_ {
        KNIGHT_OFFSETS
            .iter()
            .filter_map(move |&(dr, dc)| from.offset(dr, dc))
            .filter(move |&sq| self.contains(sq))
    }
}
