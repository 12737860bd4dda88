//! Legal move generation

use crate::board::{Board, Square};
use crate::field::Field;
use crate::geometry::Segment;

/// Destinations reachable from `position`: on the board, unvisited, and
/// (under the non-crossing rule) not crossing any drawn segment.
///
/// Results follow `KNIGHT_OFFSETS` order. An empty vector means the
/// knight is stuck. An off-board `position` has no moves.
pub fn legal_moves(board: &Board, position: Square, field: &Field) -> Vec<Square> {
    if !board.contains(position) {
        return Vec::new();
    }
    board
        .knight_targets(position)
        .filter(|&to| admissible(position, to, field))
        .collect()
}

/// Number of legal moves from `position`
pub fn mobility(board: &Board, position: Square, field: &Field) -> usize {
    if !board.contains(position) {
        return 0;
    }
    board
        .knight_targets(position)
        .filter(|&to| admissible(position, to, field))
        .count()
}

/// Check a single move against the current field
pub fn is_legal(board: &Board, from: Square, to: Square, field: &Field) -> bool {
    board.contains(from) && board.knight_targets(from).any(|t| t == to) && admissible(from, to, field)
}

#[inline]
fn admissible(from: Square, to: Square, field: &Field) -> bool {
    !field.is_visited(to) && field.permits(&Segment::new(from, to))
}

/// What a knight sees when it is asked for a move
#[derive(Clone, Copy, Debug)]
pub struct Turn<'a> {
    pub board: &'a Board,
    pub field: &'a Field,
    pub position: Square,
    pub opponent: Option<Square>,
}

impl<'a> Turn<'a> {
    pub fn new(board: &'a Board, field: &'a Field, position: Square, opponent: Option<Square>) -> Self {
        Self {
            board,
            field,
            position,
            opponent,
        }
    }

    pub fn legal_moves(&self) -> Vec<Square> {
        legal_moves(self.board, self.position, self.field)
    }

    /// Field after this knight moves to `to`
    pub fn after(&self, to: Square) -> Field {
        self.field.with_move(self.position, to)
    }

    /// Own mobility once the move to `to` is made
    pub fn own_mobility_after(&self, to: Square) -> usize {
        mobility(self.board, to, &self.after(to))
    }

    /// Opponent mobility once the move to `to` is made (0 without an opponent)
    pub fn opponent_mobility_after(&self, to: Square) -> usize {
        match self.opponent {
            Some(opp) => mobility(self.board, opp, &self.after(to)),
            None => 0,
        }
    }
}
