//! Fixed-capacity bitset of squares
//!
//! Squares are packed at a row stride of `MAX_BOARD_SIZE`, so one set
//! covers every supported board size. The set is `Copy`; deriving a
//! hypothetical visited set costs four words.

use std::fmt;

use crate::board::{Square, MAX_BOARD_SIZE};

const STRIDE: usize = MAX_BOARD_SIZE as usize;
const WORDS: usize = STRIDE * STRIDE / 64;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SquareSet([u64; WORDS]);

#[inline]
fn bit(sq: Square) -> (usize, u64) {
    debug_assert!(sq.row < MAX_BOARD_SIZE && sq.col < MAX_BOARD_SIZE);
    let idx = sq.row as usize * STRIDE + sq.col as usize;
    (idx / 64, 1u64 << (idx % 64))
}

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet([0; WORDS]);

    pub fn contains(&self, sq: Square) -> bool {
        let (word, mask) = bit(sq);
        self.0[word] & mask != 0
    }

    /// Insert a square, returning true if it was not already present
    pub fn insert(&mut self, sq: Square) -> bool {
        let (word, mask) = bit(sq);
        let fresh = self.0[word] & mask == 0;
        self.0[word] |= mask;
        fresh
    }

    /// Copy of this set with one more square
    pub fn with(mut self, sq: Square) -> SquareSet {
        self.insert(sq);
        self
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    pub fn union(&self, other: &SquareSet) -> SquareSet {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
        out
    }

    /// Squares in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        (0..STRIDE * STRIDE)
            .filter(move |idx| self.0[idx / 64] & (1u64 << (idx % 64)) != 0)
            .map(|idx| Square::new((idx / STRIDE) as u8, (idx % STRIDE) as u8))
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut set = SquareSet::EMPTY;
        for sq in iter {
            set.insert(sq);
        }
        set
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
