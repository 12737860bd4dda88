//! Shared duel state: visited squares and drawn segments

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Square;
use crate::geometry::{crosses_any, Segment};
use crate::square_set::SquareSet;

/// Whether drawn segments constrain later moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossingRule {
    /// A move may not properly cross any drawn segment
    #[default]
    NonCrossing,
    /// Plain knight graph: only visited squares are excluded
    Free,
}

impl CrossingRule {
    pub fn name(self) -> &'static str {
        match self {
            CrossingRule::NonCrossing => "non-crossing",
            CrossingRule::Free => "crossing allowed",
        }
    }
}

impl fmt::Display for CrossingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Squares visited by either knight plus every segment drawn so far.
///
/// Only the duel engine grows the live field. Heuristics explore
/// hypothetical continuations with `with_move`, which returns a copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Field {
    visited: SquareSet,
    segments: Vec<Segment>,
    rule: CrossingRule,
}

impl Field {
    pub fn new(rule: CrossingRule) -> Self {
        Self {
            visited: SquareSet::EMPTY,
            segments: Vec::new(),
            rule,
        }
    }

    /// Field with the given squares already occupied
    pub fn with_starts(rule: CrossingRule, starts: &[Square]) -> Self {
        let mut field = Self::new(rule);
        for &sq in starts {
            field.visited.insert(sq);
        }
        field
    }

    pub fn visited(&self) -> &SquareSet {
        &self.visited
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn rule(&self) -> CrossingRule {
        self.rule
    }

    pub fn is_visited(&self, sq: Square) -> bool {
        self.visited.contains(sq)
    }

    /// Check a segment against the crossing rule
    pub fn permits(&self, segment: &Segment) -> bool {
        match self.rule {
            CrossingRule::Free => true,
            CrossingRule::NonCrossing => !crosses_any(segment, &self.segments),
        }
    }

    /// Record a move: `to` becomes visited and the segment is drawn
    pub fn record_move(&mut self, from: Square, to: Square) {
        self.visited.insert(to);
        if self.rule == CrossingRule::NonCrossing {
            self.segments.push(Segment::new(from, to));
        }
    }

    /// Copy of this field with one more move recorded
    pub fn with_move(&self, from: Square, to: Square) -> Field {
        let mut next = self.clone();
        next.record_move(from, to);
        next
    }
}
