//! Tie-break strategies
//!
//! Applied whenever several candidates are equally good under a
//! heuristic's primary criterion. Exactly one strategy is active per run.
//! The two stateful strategies (`LeastUsed`, `Weighted`) keep their state
//! in a `TieBreakState` that the trial owner resets between trials.

use std::fmt;
use std::str::FromStr;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Square};
use crate::error::Error;
use crate::moves::{legal_moves, mobility, Turn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TieBreak {
    /// First candidate in move-generation order
    First,
    /// Uniform random choice
    #[default]
    Random,
    /// Smallest second-degree mobility
    MinSecondDegree,
    /// Largest second-degree mobility
    MaxSecondDegree,
    /// Closest to the centre (Chebyshev)
    Center,
    /// Farthest from the centre (Chebyshev)
    Edge,
    /// Smallest (row, col)
    Lexicographic,
    /// Least often chosen so far this trial
    LeastUsed,
    /// Random, weighted by 1 / (distance to centre + 1)
    Weighted,
}

impl TieBreak {
    pub const ALL: [TieBreak; 9] = [
        TieBreak::First,
        TieBreak::Random,
        TieBreak::MinSecondDegree,
        TieBreak::MaxSecondDegree,
        TieBreak::Center,
        TieBreak::Edge,
        TieBreak::Lexicographic,
        TieBreak::LeastUsed,
        TieBreak::Weighted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TieBreak::First => "first",
            TieBreak::Random => "random",
            TieBreak::MinSecondDegree => "min-degree",
            TieBreak::MaxSecondDegree => "max-degree",
            TieBreak::Center => "center",
            TieBreak::Edge => "edge",
            TieBreak::Lexicographic => "lex",
            TieBreak::LeastUsed => "least-used",
            TieBreak::Weighted => "weighted",
        }
    }

    /// Pick one of `candidates`. `None` only when `candidates` is empty.
    pub fn choose(
        self,
        turn: &Turn,
        candidates: &[Square],
        rng: &mut ChaCha8Rng,
        state: &mut TieBreakState,
    ) -> Option<Square> {
        match candidates {
            [] => return None,
            [only] => return Some(*only),
            _ => {}
        }

        match self {
            TieBreak::First => candidates.first().copied(),
            TieBreak::Random => candidates.choose(rng).copied(),
            TieBreak::MinSecondDegree => {
                let best = extreme(candidates, |s| second_degree(turn, s, Extreme::Min) as f64, Extreme::Min);
                best.choose(rng).copied()
            }
            TieBreak::MaxSecondDegree => {
                let best = extreme(candidates, |s| second_degree(turn, s, Extreme::Max) as f64, Extreme::Max);
                best.choose(rng).copied()
            }
            TieBreak::Center => {
                let best = extreme(candidates, |s| turn.board.chebyshev_to_center(s) as f64, Extreme::Min);
                best.choose(rng).copied()
            }
            TieBreak::Edge => {
                let best = extreme(candidates, |s| turn.board.chebyshev_to_center(s) as f64, Extreme::Max);
                best.choose(rng).copied()
            }
            TieBreak::Lexicographic => candidates.iter().min().copied(),
            TieBreak::LeastUsed => {
                let best = extreme(candidates, |s| state.frequency(s) as f64, Extreme::Min);
                let choice = best.choose(rng).copied()?;
                state.record_use(choice);
                Some(choice)
            }
            TieBreak::Weighted => {
                let weights: Vec<f64> = candidates
                    .iter()
                    .map(|&s| state.weight(turn.board, s))
                    .collect();
                match WeightedIndex::new(&weights) {
                    Ok(dist) => Some(candidates[dist.sample(rng)]),
                    Err(_) => candidates.choose(rng).copied(),
                }
            }
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TieBreak {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        let tb = match key.as_str() {
            "first" => TieBreak::First,
            "random" => TieBreak::Random,
            "min-degree" | "min-second-degree" => TieBreak::MinSecondDegree,
            "max-degree" | "max-second-degree" => TieBreak::MaxSecondDegree,
            "center" | "centre" | "closest-to-center" => TieBreak::Center,
            "edge" | "farthest-from-center" => TieBreak::Edge,
            "lex" | "lexicographic" => TieBreak::Lexicographic,
            "least-used" | "freq" | "frequency" => TieBreak::LeastUsed,
            "weighted" | "weighted-random" => TieBreak::Weighted,
            _ => return Err(Error::UnknownTieBreak(s.to_string())),
        };
        Ok(tb)
    }
}

impl TryFrom<String> for TieBreak {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<TieBreak> for String {
    fn from(tb: TieBreak) -> String {
        tb.name().to_string()
    }
}

/// Per-trial tie-break state
#[derive(Clone, Debug, Default)]
pub struct TieBreakState {
    frequency: FxHashMap<Square, u32>,
    weights: Option<(u8, FxHashMap<Square, f64>)>,
}

impl TieBreakState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; called at the start of every trial
    pub fn reset(&mut self) {
        self.frequency.clear();
        self.weights = None;
    }

    pub fn frequency(&self, sq: Square) -> u32 {
        self.frequency.get(&sq).copied().unwrap_or(0)
    }

    fn record_use(&mut self, sq: Square) {
        *self.frequency.entry(sq).or_insert(0) += 1;
    }

    /// Static weight 1 / (euclidean distance to centre + 1), memoised per board
    pub fn weight(&mut self, board: &Board, sq: Square) -> f64 {
        let stale = !matches!(&self.weights, Some((size, _)) if *size == board.size());
        if stale {
            let map = board
                .squares()
                .map(|s| (s, 1.0 / (board.euclidean_to_center(s) + 1.0)))
                .collect();
            self.weights = Some((board.size(), map));
        }
        self.weights
            .as_ref()
            .and_then(|(_, map)| map.get(&sq).copied())
            .unwrap_or(0.0)
    }

    pub fn has_weight_map(&self) -> bool {
        self.weights.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Extreme {
    Min,
    Max,
}

/// Candidates whose key equals the min (or max) key, in input order
pub(crate) fn extreme<F>(candidates: &[Square], mut key: F, which: Extreme) -> Vec<Square>
where
    F: FnMut(Square) -> f64,
{
    let keyed: Vec<(Square, f64)> = candidates.iter().map(|&s| (s, key(s))).collect();
    let target = keyed
        .iter()
        .map(|&(_, k)| k)
        .fold(None, |acc: Option<f64>, k| match (acc, which) {
            (None, _) => Some(k),
            (Some(a), Extreme::Min) => Some(a.min(k)),
            (Some(a), Extreme::Max) => Some(a.max(k)),
        });
    match target {
        Some(t) => keyed.into_iter().filter(|&(_, k)| k == t).map(|(s, _)| s).collect(),
        None => Vec::new(),
    }
}

/// Min or max, over the onward moves n of `candidate`, of the mobility from n.
/// 0 when the candidate has no onward move.
fn second_degree(turn: &Turn, candidate: Square, which: Extreme) -> usize {
    let after = turn.after(candidate);
    let degrees = legal_moves(turn.board, candidate, &after)
        .into_iter()
        .map(|n| mobility(turn.board, n, &after.with_move(candidate, n)));
    let folded = match which {
        Extreme::Min => degrees.min(),
        Extreme::Max => degrees.max(),
    };
    folded.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{CrossingRule, Field};
    use rand::SeedableRng;

    fn sq(r: u8, c: u8) -> Square {
        Square::new(r, c)
    }

    #[test]
    fn test_parse_names() {
        for tb in TieBreak::ALL {
            assert_eq!(tb.name().parse::<TieBreak>().unwrap(), tb);
        }
        assert_eq!("freq".parse::<TieBreak>().unwrap(), TieBreak::LeastUsed);
        assert!(matches!("sideways".parse::<TieBreak>(), Err(Error::UnknownTieBreak(_))));
    }

    #[test]
    fn test_deterministic_strategies() {
        let board = Board::default();
        let field = Field::new(CrossingRule::NonCrossing);
        let turn = Turn::new(&board, &field, sq(3, 3), None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut state = TieBreakState::new();
        let cands = [sq(5, 4), sq(1, 2), sq(4, 3)];

        assert_eq!(TieBreak::First.choose(&turn, &cands, &mut rng, &mut state), Some(sq(5, 4)));
        assert_eq!(TieBreak::Lexicographic.choose(&turn, &cands, &mut rng, &mut state), Some(sq(1, 2)));
        assert_eq!(TieBreak::Center.choose(&turn, &cands, &mut rng, &mut state), Some(sq(4, 3)));
        assert_eq!(TieBreak::Edge.choose(&turn, &cands, &mut rng, &mut state), Some(sq(1, 2)));
    }

    #[test]
    fn test_empty_and_single() {
        let board = Board::default();
        let field = Field::new(CrossingRule::NonCrossing);
        let turn = Turn::new(&board, &field, sq(0, 0), None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut state = TieBreakState::new();
        for tb in TieBreak::ALL {
            assert_eq!(tb.choose(&turn, &[], &mut rng, &mut state), None);
            assert_eq!(tb.choose(&turn, &[sq(2, 1)], &mut rng, &mut state), Some(sq(2, 1)));
        }
    }

    #[test]
    fn test_least_used_rotates() {
        let board = Board::default();
        let field = Field::new(CrossingRule::NonCrossing);
        let turn = Turn::new(&board, &field, sq(0, 0), None);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut state = TieBreakState::new();
        let cands = [sq(1, 2), sq(2, 1)];

        let first = TieBreak::LeastUsed.choose(&turn, &cands, &mut rng, &mut state).unwrap();
        let second = TieBreak::LeastUsed.choose(&turn, &cands, &mut rng, &mut state).unwrap();
        assert_ne!(first, second);
        assert_eq!(state.frequency(first), 1);

        state.reset();
        assert_eq!(state.frequency(first), 0);
    }

    #[test]
    fn test_weight_map_memoised_and_reset() {
        let board = Board::default();
        let mut state = TieBreakState::new();
        let centre = state.weight(&board, sq(3, 3));
        let corner = state.weight(&board, sq(0, 0));
        assert!(centre > corner);
        assert!(state.has_weight_map());
        state.reset();
        assert!(!state.has_weight_map());
    }

    #[test]
    fn test_second_degree() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(0, 0)]);
        let turn = Turn::new(&board, &field, sq(0, 0), None);
        let max = second_degree(&turn, sq(2, 1), Extreme::Max);
        let min = second_degree(&turn, sq(2, 1), Extreme::Min);
        assert!(max >= min);
        assert!(max > 0);
    }

    #[test]
    fn test_extreme_keeps_ties_in_order() {
        let cands = [sq(0, 1), sq(0, 2), sq(0, 3)];
        let best = extreme(&cands, |s| (s.col % 2) as f64, Extreme::Max);
        assert_eq!(best, vec![sq(0, 1), sq(0, 3)]);
        assert!(extreme(&[], |_| 0.0, Extreme::Min).is_empty());
    }
}
