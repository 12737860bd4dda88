//! Move-selection heuristics
//!
//! Every heuristic shares one contract: given a `Turn`, return one legal
//! destination, or `None` when the knight has no legal move. Candidates
//! that tie on the primary criterion go to the run's tie-break strategy.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Square};
use crate::error::Error;
use crate::field::Field;
use crate::moves::{legal_moves, mobility, Turn};
use crate::tiebreak::{extreme, Extreme, TieBreak, TieBreakState};

// ============================================================================
// SELECTION CONTEXT
// ============================================================================

/// Random source plus tie-break configuration and state for one run.
///
/// The random source lives for the whole run. The tie-break state belongs
/// to the current trial and is cleared by `begin_trial`.
#[derive(Clone, Debug)]
pub struct SelectionContext {
    rng: ChaCha8Rng,
    tie_break: TieBreak,
    state: TieBreakState,
}

impl SelectionContext {
    pub fn new(tie_break: TieBreak, rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            tie_break,
            state: TieBreakState::new(),
        }
    }

    pub fn seeded(tie_break: TieBreak, seed: u64) -> Self {
        Self::new(tie_break, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn state(&self) -> &TieBreakState {
        &self.state
    }

    /// Reset per-trial state; the random stream continues
    pub fn begin_trial(&mut self) {
        self.state.reset();
    }

    /// Resolve a tie with the configured strategy
    pub fn break_tie(&mut self, turn: &Turn, candidates: &[Square]) -> Option<Square> {
        self.tie_break
            .choose(turn, candidates, &mut self.rng, &mut self.state)
    }

    /// Uniform choice, independent of the tie-break strategy
    pub fn pick_uniform(&mut self, candidates: &[Square]) -> Option<Square> {
        candidates.choose(&mut self.rng).copied()
    }
}

// ============================================================================
// HEURISTICS
// ============================================================================

/// Longest supported lookahead
pub const MAX_LOOKAHEAD_PLIES: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Heuristic {
    /// Maximise own mobility after the move
    MaxMobility,
    /// Minimise own mobility after the move
    Warnsdorff,
    /// Minimise the opponent's mobility after the move
    Blocking,
    /// Minimise Manhattan distance to the centre
    CenterControl,
    /// Minimise Chebyshev distance to the centre
    CenterChebyshev,
    /// Maximise distance to the nearest edge
    EdgeAvoidance,
    /// Fixed-depth minimax over the legal-move tree, leaf = own mobility
    Lookahead { plies: u8 },
    /// Reflect the opponent through the centre, else max-mobility
    Mirror,
    /// Uniform over legal moves
    Random,
    /// Warnsdorff candidates scored by a Warnsdorff reply exchange
    ThreePlyWarnsdorff,
}

impl Heuristic {
    /// The full catalogue, as combined by the default meta-heuristic
    pub const CATALOGUE: [Heuristic; 8] = [
        Heuristic::MaxMobility,
        Heuristic::Warnsdorff,
        Heuristic::Blocking,
        Heuristic::CenterControl,
        Heuristic::EdgeAvoidance,
        Heuristic::Lookahead { plies: 3 },
        Heuristic::Mirror,
        Heuristic::Random,
    ];

    pub fn lookahead(plies: u8) -> Result<Self, Error> {
        if plies == 0 || plies > MAX_LOOKAHEAD_PLIES {
            return Err(Error::InvalidLookaheadDepth(plies));
        }
        Ok(Heuristic::Lookahead { plies })
    }

    pub fn name(&self) -> String {
        match self {
            Heuristic::MaxMobility => "max-mobility".into(),
            Heuristic::Warnsdorff => "warnsdorff".into(),
            Heuristic::Blocking => "blocking".into(),
            Heuristic::CenterControl => "center-control".into(),
            Heuristic::CenterChebyshev => "center-chebyshev".into(),
            Heuristic::EdgeAvoidance => "edge-avoidance".into(),
            Heuristic::Lookahead { plies } => format!("lookahead{}", plies),
            Heuristic::Mirror => "mirror".into(),
            Heuristic::Random => "random".into(),
            Heuristic::ThreePlyWarnsdorff => "three-ply-warnsdorff".into(),
        }
    }

    /// Choose a move, or `None` if the knight is stuck
    pub fn select(&self, turn: &Turn, ctx: &mut SelectionContext) -> Option<Square> {
        let moves = turn.legal_moves();
        if moves.is_empty() {
            return None;
        }

        match *self {
            Heuristic::MaxMobility => max_mobility(turn, &moves, ctx),
            Heuristic::Warnsdorff => {
                let best = extreme(&moves, |m| turn.own_mobility_after(m) as f64, Extreme::Min);
                ctx.break_tie(turn, &best)
            }
            Heuristic::Blocking => {
                if turn.opponent.is_none() {
                    return max_mobility(turn, &moves, ctx);
                }
                let best = extreme(&moves, |m| turn.opponent_mobility_after(m) as f64, Extreme::Min);
                ctx.break_tie(turn, &best)
            }
            Heuristic::CenterControl => {
                let best = extreme(&moves, |m| turn.board.manhattan_to_center(m) as f64, Extreme::Min);
                ctx.break_tie(turn, &best)
            }
            Heuristic::CenterChebyshev => {
                let best = extreme(&moves, |m| turn.board.chebyshev_to_center(m) as f64, Extreme::Min);
                ctx.break_tie(turn, &best)
            }
            Heuristic::EdgeAvoidance => {
                let best = extreme(&moves, |m| turn.board.edge_distance(m) as f64, Extreme::Max);
                ctx.break_tie(turn, &best)
            }
            Heuristic::Lookahead { plies } => {
                let plies = plies.clamp(1, MAX_LOOKAHEAD_PLIES);
                let best = extreme(
                    &moves,
                    |m| {
                        let after = turn.after(m);
                        minimax(turn.board, &after, m, turn.opponent, plies - 1, false) as f64
                    },
                    Extreme::Max,
                );
                ctx.break_tie(turn, &best)
            }
            Heuristic::Mirror => {
                if let Some(opp) = turn.opponent {
                    let target = turn.board.reflect_through_center(opp);
                    if moves.contains(&target) {
                        return Some(target);
                    }
                }
                max_mobility(turn, &moves, ctx)
            }
            Heuristic::Random => ctx.pick_uniform(&moves),
            Heuristic::ThreePlyWarnsdorff => three_ply_warnsdorff(turn, &moves, ctx),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Heuristic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        let h = match key.as_str() {
            "max-mobility" | "maxmobility" | "mobility" => Heuristic::MaxMobility,
            "warnsdorff" | "min-mobility" => Heuristic::Warnsdorff,
            "blocking" | "block" => Heuristic::Blocking,
            "center-control" | "centre-control" | "center" => Heuristic::CenterControl,
            "center-chebyshev" | "centre-chebyshev" => Heuristic::CenterChebyshev,
            "edge-avoidance" | "edge" => Heuristic::EdgeAvoidance,
            "mirror" => Heuristic::Mirror,
            "random" => Heuristic::Random,
            "three-ply-warnsdorff" | "trap" => Heuristic::ThreePlyWarnsdorff,
            other => {
                let depth = other
                    .strip_prefix("lookahead")
                    .map(|d| d.trim_start_matches('-'))
                    .ok_or_else(|| Error::UnknownHeuristic(s.to_string()))?;
                let plies: u8 = depth
                    .parse()
                    .map_err(|_| Error::UnknownHeuristic(s.to_string()))?;
                Heuristic::lookahead(plies)?
            }
        };
        Ok(h)
    }
}

impl TryFrom<String> for Heuristic {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<Heuristic> for String {
    fn from(h: Heuristic) -> String {
        h.name()
    }
}

// ============================================================================
// SELECTORS
// ============================================================================

fn max_mobility(turn: &Turn, moves: &[Square], ctx: &mut SelectionContext) -> Option<Square> {
    let best = extreme(moves, |m| turn.own_mobility_after(m) as f64, Extreme::Max);
    ctx.break_tie(turn, &best)
}

/// Minimax value of a position where `own` has just moved.
///
/// Plies alternate opponent / own. Own plies maximise, opponent plies
/// minimise. An own ply without moves is worth 0; an opponent ply without
/// an opponent or without a reply passes. At depth 0 the value is the
/// knight's own mobility.
fn minimax(
    board: &Board,
    field: &Field,
    own: Square,
    opponent: Option<Square>,
    plies_left: u8,
    own_to_move: bool,
) -> usize {
    if plies_left == 0 {
        return mobility(board, own, field);
    }

    if own_to_move {
        legal_moves(board, own, field)
            .into_iter()
            .map(|m| minimax(board, &field.with_move(own, m), m, opponent, plies_left - 1, false))
            .max()
            .unwrap_or(0)
    } else {
        let replies = match opponent {
            Some(opp) => legal_moves(board, opp, field),
            None => Vec::new(),
        };
        match opponent {
            Some(opp) if !replies.is_empty() => replies
                .into_iter()
                .map(|r| minimax(board, &field.with_move(opp, r), own, Some(r), plies_left - 1, true))
                .min()
                .unwrap_or(0),
            _ => minimax(board, field, own, opponent, plies_left - 1, true),
        }
    }
}

/// Warnsdorff candidates, each scored by letting the opponent reply with
/// Warnsdorff and then answering with Warnsdorff from the candidate.
/// Score is the mobility after that answer (0 if there is none).
fn three_ply_warnsdorff(turn: &Turn, moves: &[Square], ctx: &mut SelectionContext) -> Option<Square> {
    let first_ply = extreme(moves, |m| turn.own_mobility_after(m) as f64, Extreme::Min);

    let mut scored = Vec::with_capacity(first_ply.len());
    for &s1 in &first_ply {
        let after_own = turn.after(s1);

        let (after_reply, opponent_now) = match turn.opponent {
            Some(opp) => {
                let reply_turn = Turn::new(turn.board, &after_own, opp, Some(s1));
                match Heuristic::Warnsdorff.select(&reply_turn, ctx) {
                    Some(r) => (after_own.with_move(opp, r), Some(r)),
                    None => (after_own.clone(), Some(opp)),
                }
            }
            None => (after_own.clone(), None),
        };

        let answer_turn = Turn::new(turn.board, &after_reply, s1, opponent_now);
        let score = match Heuristic::Warnsdorff.select(&answer_turn, ctx) {
            Some(s3) => mobility(turn.board, s3, &after_reply.with_move(s1, s3)),
            None => 0,
        };
        scored.push((s1, score));
    }

    let top = scored.iter().map(|&(_, s)| s).max()?;
    let best: Vec<Square> = scored
        .into_iter()
        .filter(|&(_, s)| s == top)
        .map(|(m, _)| m)
        .collect();
    ctx.break_tie(turn, &best)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CrossingRule;
    use crate::moves::is_legal;

    fn sq(r: u8, c: u8) -> Square {
        Square::new(r, c)
    }

    fn all_heuristics() -> Vec<Heuristic> {
        let mut hs = Heuristic::CATALOGUE.to_vec();
        hs.push(Heuristic::Lookahead { plies: 2 });
        hs.push(Heuristic::CenterChebyshev);
        hs.push(Heuristic::ThreePlyWarnsdorff);
        hs
    }

    #[test]
    fn test_stuck_knight_returns_none() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(0, 0), sq(1, 2), sq(2, 1)]);
        let turn = Turn::new(&board, &field, sq(0, 0), Some(sq(7, 7)));
        let mut ctx = SelectionContext::seeded(TieBreak::Random, 1);
        for h in all_heuristics() {
            assert_eq!(h.select(&turn, &mut ctx), None, "{}", h);
        }
    }

    #[test]
    fn test_every_heuristic_returns_legal_move() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(2, 2), sq(5, 5)])
            .with_move(sq(2, 2), sq(3, 4));
        let turn = Turn::new(&board, &field, sq(5, 5), Some(sq(3, 4)));
        for tb in TieBreak::ALL {
            let mut ctx = SelectionContext::seeded(tb, 7);
            for h in all_heuristics() {
                let mv = h.select(&turn, &mut ctx).expect("has moves");
                assert!(is_legal(&board, sq(5, 5), mv, &field), "{} / {} chose {}", h, tb, mv);
            }
        }
    }

    #[test]
    fn test_seeded_selection_is_repeatable() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(3, 3), sq(4, 4)]);
        let turn = Turn::new(&board, &field, sq(3, 3), Some(sq(4, 4)));
        for h in all_heuristics() {
            let a = h.select(&turn, &mut SelectionContext::seeded(TieBreak::Random, 123));
            let b = h.select(&turn, &mut SelectionContext::seeded(TieBreak::Random, 123));
            assert_eq!(a, b, "{}", h);
        }
    }

    #[test]
    fn test_max_mobility_and_warnsdorff_from_corner() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(0, 0)]);
        let turn = Turn::new(&board, &field, sq(0, 0), None);
        let mut ctx = SelectionContext::seeded(TieBreak::First, 0);
        // (1,2) and (2,1) are symmetric, so both reach five squares
        assert_eq!(Heuristic::MaxMobility.select(&turn, &mut ctx), Some(sq(1, 2)));
        assert_eq!(Heuristic::Warnsdorff.select(&turn, &mut ctx), Some(sq(1, 2)));
    }

    #[test]
    fn test_max_mobility_prefers_open_square() {
        let board = Board::default();
        // Crowd (1,2)'s neighbourhood
        let blocked = [sq(0, 0), sq(0, 4), sq(2, 4), sq(3, 3), sq(3, 1)];
        let field = Field::with_starts(CrossingRule::NonCrossing, &blocked);
        let turn = Turn::new(&board, &field, sq(0, 0), None);
        let mut ctx = SelectionContext::seeded(TieBreak::Random, 3);
        assert_eq!(Heuristic::MaxMobility.select(&turn, &mut ctx), Some(sq(2, 1)));
        assert_eq!(Heuristic::Warnsdorff.select(&turn, &mut ctx), Some(sq(1, 2)));
    }

    #[test]
    fn test_center_and_edge() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(1, 1)]);
        let turn = Turn::new(&board, &field, sq(1, 1), None);
        let mut ctx = SelectionContext::seeded(TieBreak::First, 0);
        // Targets: (2,3) (3,2) (0,3) (3,0); the first two are closest to centre
        assert_eq!(Heuristic::CenterControl.select(&turn, &mut ctx), Some(sq(2, 3)));
        assert_eq!(Heuristic::EdgeAvoidance.select(&turn, &mut ctx), Some(sq(2, 3)));
    }

    #[test]
    fn test_center_metrics_disagree_near_rim() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(0, 1)]);
        let turn = Turn::new(&board, &field, sq(0, 1), None);
        let mut ctx = SelectionContext::seeded(TieBreak::First, 0);
        // Targets: (1,3) (2,2) (2,0). Manhattan ties (1,3) with (2,2);
        // Chebyshev has (2,2) alone
        assert_eq!(Heuristic::CenterControl.select(&turn, &mut ctx), Some(sq(1, 3)));
        assert_eq!(Heuristic::CenterChebyshev.select(&turn, &mut ctx), Some(sq(2, 2)));
        assert_eq!("center-chebyshev".parse::<Heuristic>().unwrap(), Heuristic::CenterChebyshev);
    }

    #[test]
    fn test_mirror_takes_reflection() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(4, 4), sq(1, 2)]);
        // Reflection of (1,2) is (6,5), a knight move from (4,4)
        let turn = Turn::new(&board, &field, sq(4, 4), Some(sq(1, 2)));
        let mut ctx = SelectionContext::seeded(TieBreak::Random, 0);
        assert_eq!(Heuristic::Mirror.select(&turn, &mut ctx), Some(sq(6, 5)));
    }

    #[test]
    fn test_blocking_minimises_opponent() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(2, 2), sq(0, 0)]);
        // Opponent in the corner can only go to (1,2) or (2,1)
        let turn = Turn::new(&board, &field, sq(2, 2), Some(sq(0, 0)));
        let mut ctx = SelectionContext::seeded(TieBreak::First, 0);
        let mv = Heuristic::Blocking.select(&turn, &mut ctx).unwrap();
        let opp_after = mobility(&board, sq(0, 0), &field.with_move(sq(2, 2), mv));
        for other in turn.legal_moves() {
            let alt = mobility(&board, sq(0, 0), &field.with_move(sq(2, 2), other));
            assert!(opp_after <= alt);
        }
        assert!(opp_after < 2);
    }

    #[test]
    fn test_lookahead_without_opponent_is_self_search() {
        let board = Board::default();
        let field = Field::with_starts(CrossingRule::NonCrossing, &[sq(0, 0)]);
        let one = minimax(&board, &field.with_move(sq(0, 0), sq(2, 1)), sq(2, 1), None, 0, false);
        assert_eq!(one, mobility(&board, sq(2, 1), &field.with_move(sq(0, 0), sq(2, 1))));
        let passing = minimax(&board, &field.with_move(sq(0, 0), sq(2, 1)), sq(2, 1), None, 1, false);
        assert_eq!(passing, one);
    }

    #[test]
    fn test_parse_heuristics() {
        for h in all_heuristics() {
            assert_eq!(h.name().parse::<Heuristic>().unwrap(), h);
        }
        assert_eq!("lookahead-2".parse::<Heuristic>().unwrap(), Heuristic::Lookahead { plies: 2 });
        assert_eq!("Min_Mobility".parse::<Heuristic>().unwrap(), Heuristic::Warnsdorff);
        assert!(matches!("lookahead9".parse::<Heuristic>(), Err(Error::InvalidLookaheadDepth(9))));
        assert!(matches!("greedy".parse::<Heuristic>(), Err(Error::UnknownHeuristic(_))));
    }

    #[test]
    fn test_heuristic_serde_as_string() {
        let json = serde_json::to_string(&Heuristic::Lookahead { plies: 3 }).unwrap();
        assert_eq!(json, "\"lookahead3\"");
        let back: Heuristic = serde_json::from_str("\"blocking\"").unwrap();
        assert_eq!(back, Heuristic::Blocking);
    }
}
