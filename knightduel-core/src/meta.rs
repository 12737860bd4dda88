//! Weighted meta-heuristic
//!
//! Each member heuristic proposes one move. The distinct legal proposals
//! are scored with a linear combination of move features and the best
//! one is played.

use serde::{Deserialize, Serialize};

use crate::board::Square;
use crate::heuristics::{Heuristic, SelectionContext};
use crate::moves::{mobility, Turn};

/// Feature weights for the meta score
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaWeights {
    pub own_mobility: f64,
    pub opponent_mobility: f64,
    pub center: f64,
    pub edge: f64,
    pub parity: f64,
}

impl Default for MetaWeights {
    fn default() -> Self {
        Self {
            own_mobility: 2.0,
            opponent_mobility: -1.0,
            center: 0.5,
            edge: 0.5,
            parity: 0.25,
        }
    }
}

/// Raw features of one candidate move
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveFeatures {
    /// Own mobility after the move
    pub own_mobility: f64,
    /// Opponent mobility after the move (0 without an opponent)
    pub opponent_mobility: f64,
    /// Negated Manhattan distance to the centre
    pub center: f64,
    /// Distance to the nearest edge
    pub edge: f64,
    /// 1 when the square shares the opponent's colour
    pub parity: f64,
}

impl MoveFeatures {
    pub fn of(turn: &Turn, to: Square) -> Self {
        let after = turn.after(to);
        let own_mobility = mobility(turn.board, to, &after) as f64;
        let (opponent_mobility, parity) = match turn.opponent {
            Some(opp) => (
                mobility(turn.board, opp, &after) as f64,
                if to.parity() == opp.parity() { 1.0 } else { 0.0 },
            ),
            None => (0.0, 0.0),
        };
        Self {
            own_mobility,
            opponent_mobility,
            center: -(turn.board.manhattan_to_center(to) as f64),
            edge: turn.board.edge_distance(to) as f64,
            parity,
        }
    }

    pub fn score(&self, w: &MetaWeights) -> f64 {
        w.own_mobility * self.own_mobility
            + w.opponent_mobility * self.opponent_mobility
            + w.center * self.center
            + w.edge * self.edge
            + w.parity * self.parity
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaHeuristic {
    pub members: Vec<Heuristic>,
    pub weights: MetaWeights,
}

impl Default for MetaHeuristic {
    fn default() -> Self {
        Self {
            members: Heuristic::CATALOGUE.to_vec(),
            weights: MetaWeights::default(),
        }
    }
}

impl MetaHeuristic {
    pub fn new(members: Vec<Heuristic>, weights: MetaWeights) -> Self {
        Self { members, weights }
    }

    pub fn with_weights(mut self, weights: MetaWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Distinct legal proposals in member order
    pub fn candidates(&self, turn: &Turn, ctx: &mut SelectionContext) -> Vec<Square> {
        let legal = turn.legal_moves();
        let mut proposals = Vec::with_capacity(self.members.len());
        for member in &self.members {
            if let Some(mv) = member.select(turn, ctx) {
                if legal.contains(&mv) && !proposals.contains(&mv) {
                    proposals.push(mv);
                }
            }
        }
        proposals
    }

    pub fn score(&self, turn: &Turn, to: Square) -> f64 {
        MoveFeatures::of(turn, to).score(&self.weights)
    }

    /// Best-scoring proposal, uniform among equal scores.
    ///
    /// Falls back to a random legal move when no member proposes one.
    pub fn choose(&self, turn: &Turn, ctx: &mut SelectionContext) -> Option<Square> {
        let proposals = self.candidates(turn, ctx);
        if proposals.is_empty() {
            return Heuristic::Random.select(turn, ctx);
        }

        let scored: Vec<(Square, f64)> = proposals
            .into_iter()
            .map(|mv| (mv, self.score(turn, mv)))
            .collect();
        let top = scored
            .iter()
            .map(|&(_, s)| s)
            .fold(f64::NEG_INFINITY, f64::max);
        let best: Vec<Square> = scored
            .into_iter()
            .filter(|&(_, s)| s == top)
            .map(|(mv, _)| mv)
            .collect();
        ctx.pick_uniform(&best)
    }
}
