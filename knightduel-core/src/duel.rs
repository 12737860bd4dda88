//! Duel engine
//!
//! Drives two knights over a shared field until neither can move.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Square};
use crate::error::{Error, Result};
use crate::field::{CrossingRule, Field};
use crate::heuristics::SelectionContext;
use crate::moves::{is_legal, Turn};
use crate::policy::Policy;

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Knight {
    First = 0,
    Second = 1,
}

impl Knight {
    pub const BOTH: [Knight; 2] = [Knight::First, Knight::Second];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn other(self) -> Self {
        match self {
            Knight::First => Knight::Second,
            Knight::Second => Knight::First,
        }
    }
}

impl fmt::Display for Knight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Knight::First => f.write_str("knight 1"),
            Knight::Second => f.write_str("knight 2"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelPhase {
    Active,
    /// Knight 1 is stuck, knight 2 still moves
    Stuck1,
    /// Knight 2 is stuck, knight 1 still moves
    Stuck2,
    Terminated,
}

/// How the two knights take their moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnModel {
    /// Knight 1 moves, then knight 2 against the updated field
    #[default]
    Alternating,
    /// Both choose against the pre-tick field; knight 1 applies first and
    /// knight 2's move is dropped for the tick if no longer legal
    Simultaneous,
}

impl TurnModel {
    pub fn name(self) -> &'static str {
        match self {
            TurnModel::Alternating => "alternating",
            TurnModel::Simultaneous => "simultaneous",
        }
    }
}

impl fmt::Display for TurnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TurnModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alternating" | "alternate" => Ok(TurnModel::Alternating),
            "simultaneous" | "sim" => Ok(TurnModel::Simultaneous),
            _ => Err(Error::UnknownTurnModel(s.to_string())),
        }
    }
}

/// Duel classification by path length
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuelResult {
    Knight1,
    Knight2,
    Draw,
}

impl DuelResult {
    pub fn from_lengths(first: u32, second: u32) -> Self {
        use std::cmp::Ordering;
        match first.cmp(&second) {
            Ordering::Greater => DuelResult::Knight1,
            Ordering::Less => DuelResult::Knight2,
            Ordering::Equal => DuelResult::Draw,
        }
    }
}

/// Record of one finished duel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub paths: [Vec<Square>; 2],
    /// Moves per knight (path length minus the start square)
    pub moves: [u32; 2],
    pub result: DuelResult,
    pub turn_model: TurnModel,
}

impl DuelOutcome {
    pub fn longest(&self) -> u32 {
        self.moves[0].max(self.moves[1])
    }
}

// ============================================================================
// DUEL
// ============================================================================

#[derive(Clone, Debug)]
pub struct Duel {
    board: Board,
    field: Field,
    paths: [Vec<Square>; 2],
    stuck: [bool; 2],
    turn_model: TurnModel,
}

impl Duel {
    pub fn new(board: Board, start1: Square, start2: Square, rule: CrossingRule) -> Result<Self> {
        board.check(start1)?;
        board.check(start2)?;
        if start1 == start2 {
            return Err(Error::SameStart(start1));
        }
        Ok(Self {
            board,
            field: Field::with_starts(rule, &[start1, start2]),
            paths: [vec![start1], vec![start2]],
            stuck: [false, false],
            turn_model: TurnModel::default(),
        })
    }

    pub fn with_turn_model(mut self, turn_model: TurnModel) -> Self {
        self.turn_model = turn_model;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn turn_model(&self) -> TurnModel {
        self.turn_model
    }

    pub fn path(&self, knight: Knight) -> &[Square] {
        &self.paths[knight.index()]
    }

    pub fn position(&self, knight: Knight) -> Square {
        let path = &self.paths[knight.index()];
        path[path.len() - 1]
    }

    pub fn moves(&self, knight: Knight) -> u32 {
        (self.paths[knight.index()].len() - 1) as u32
    }

    pub fn is_stuck(&self, knight: Knight) -> bool {
        self.stuck[knight.index()]
    }

    pub fn phase(&self) -> DuelPhase {
        match self.stuck {
            [false, false] => DuelPhase::Active,
            [true, false] => DuelPhase::Stuck1,
            [false, true] => DuelPhase::Stuck2,
            [true, true] => DuelPhase::Terminated,
        }
    }

    /// The view a knight's policy sees
    pub fn turn(&self, knight: Knight) -> Turn<'_> {
        Turn::new(
            &self.board,
            &self.field,
            self.position(knight),
            Some(self.position(knight.other())),
        )
    }

    /// Advance one round (alternating) or one tick (simultaneous)
    pub fn step(&mut self, policies: [&Policy; 2], ctx: &mut SelectionContext) -> DuelPhase {
        match self.turn_model {
            TurnModel::Alternating => {
                for knight in Knight::BOTH {
                    if self.is_stuck(knight) {
                        continue;
                    }
                    let choice = policies[knight.index()].select(&self.turn(knight), ctx);
                    match choice {
                        Some(to) => self.apply(knight, to),
                        None => self.mark_stuck(knight),
                    }
                }
            }
            TurnModel::Simultaneous => {
                let mut choices = [None, None];
                for knight in Knight::BOTH {
                    if !self.is_stuck(knight) {
                        choices[knight.index()] = policies[knight.index()].select(&self.turn(knight), ctx);
                    }
                }

                for knight in Knight::BOTH {
                    if self.is_stuck(knight) {
                        continue;
                    }
                    match choices[knight.index()] {
                        Some(to) => {
                            let from = self.position(knight);
                            if is_legal(&self.board, from, to, &self.field) {
                                self.apply(knight, to);
                            } else {
                                tracing::trace!("{} move {} -> {} dropped this tick", knight, from, to);
                            }
                        }
                        None => self.mark_stuck(knight),
                    }
                }
            }
        }
        self.phase()
    }

    /// Play to termination
    pub fn run(mut self, policies: [&Policy; 2], ctx: &mut SelectionContext) -> DuelOutcome {
        while self.phase() != DuelPhase::Terminated {
            self.step(policies, ctx);
        }
        self.into_outcome()
    }

    pub fn into_outcome(self) -> DuelOutcome {
        let moves = [self.moves(Knight::First), self.moves(Knight::Second)];
        DuelOutcome {
            result: DuelResult::from_lengths(moves[0], moves[1]),
            moves,
            paths: self.paths,
            turn_model: self.turn_model,
        }
    }

    fn apply(&mut self, knight: Knight, to: Square) {
        let from = self.position(knight);
        debug_assert!(is_legal(&self.board, from, to, &self.field), "{} played illegal {} -> {}", knight, from, to);
        self.field.record_move(from, to);
        self.paths[knight.index()].push(to);
        debug_assert!(self.moves(knight) as usize <= self.board.area());
        tracing::trace!("{} {} -> {}", knight, from, to);
    }

    fn mark_stuck(&mut self, knight: Knight) {
        self.stuck[knight.index()] = true;
        tracing::trace!("{} stuck after {} moves", knight, self.moves(knight));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::segments_from_path;
    use crate::heuristics::Heuristic;
    use crate::meta::MetaHeuristic;
    use crate::tiebreak::TieBreak;

    fn sq(r: u8, c: u8) -> Square {
        Square::new(r, c)
    }

    fn policy(h: Heuristic) -> Policy {
        Policy::Heuristic(h)
    }

    #[test]
    fn test_new_rejects_bad_starts() {
        let board = Board::default();
        assert!(matches!(
            Duel::new(board, sq(0, 0), sq(8, 0), CrossingRule::NonCrossing),
            Err(Error::StartOutOfBounds { .. })
        ));
        assert_eq!(
            Duel::new(board, sq(2, 2), sq(2, 2), CrossingRule::NonCrossing).unwrap_err(),
            Error::SameStart(sq(2, 2))
        );
        let single = Board::new(1).unwrap();
        assert!(Duel::new(single, sq(0, 0), sq(0, 0), CrossingRule::NonCrossing).is_err());
    }

    #[test]
    fn test_degenerate_board_terminates_immediately() {
        let board = Board::new(2).unwrap();
        let p = policy(Heuristic::MaxMobility);
        let mut ctx = SelectionContext::seeded(TieBreak::Random, 0);
        let duel = Duel::new(board, sq(0, 0), sq(1, 1), CrossingRule::NonCrossing).unwrap();
        let outcome = duel.run([&p, &p], &mut ctx);
        assert_eq!(outcome.moves, [0, 0]);
        assert_eq!(outcome.result, DuelResult::Draw);
        assert_eq!(outcome.paths, [vec![sq(0, 0)], vec![sq(1, 1)]]);
    }

    #[test]
    fn test_phases() {
        let board = Board::default();
        let p = policy(Heuristic::Random);
        let mut ctx = SelectionContext::seeded(TieBreak::Random, 0);
        // Knight 1 boxed into the corner from the start
        let mut duel = Duel::new(board, sq(0, 0), sq(4, 4), CrossingRule::NonCrossing).unwrap();
        duel.field = Field::with_starts(CrossingRule::NonCrossing, &[sq(0, 0), sq(4, 4), sq(1, 2), sq(2, 1)]);
        assert_eq!(duel.phase(), DuelPhase::Active);
        assert_eq!(duel.step([&p, &p], &mut ctx), DuelPhase::Stuck1);
        assert_eq!(duel.moves(Knight::Second), 1);
        while duel.phase() != DuelPhase::Terminated {
            assert!(duel.is_stuck(Knight::First));
            duel.step([&p, &p], &mut ctx);
        }
        assert_eq!(duel.moves(Knight::First), 0);
    }

    #[test]
    fn test_paths_are_valid_under_both_models() {
        let board = Board::default();
        let policies = [policy(Heuristic::MaxMobility), policy(Heuristic::Random)];
        for model in [TurnModel::Alternating, TurnModel::Simultaneous] {
            let mut ctx = SelectionContext::seeded(TieBreak::Random, 42);
            for trial in 0..25u8 {
                ctx.begin_trial();
                let start2 = sq(7 - trial % 4, 7 - trial % 3);
                let duel = Duel::new(board, sq(trial % 4, trial % 5), start2, CrossingRule::NonCrossing)
                    .unwrap()
                    .with_turn_model(model);
                let outcome = duel.run([&policies[0], &policies[1]], &mut ctx);

                let mut seen = std::collections::HashSet::new();
                for path in &outcome.paths {
                    for &s in path {
                        assert!(seen.insert(s), "{} visited twice", s);
                    }
                }
                let mut segments = segments_from_path(&outcome.paths[0]);
                segments.extend(segments_from_path(&outcome.paths[1]));
                for (i, a) in segments.iter().enumerate() {
                    for b in &segments[i + 1..] {
                        assert!(!a.crosses(b), "{:?} crosses {:?}", a, b);
                    }
                }
                for m in outcome.moves {
                    assert!(m as usize <= board.area());
                }
                assert_eq!(outcome.turn_model, model);
            }
        }
    }

    #[test]
    fn test_seeded_duel_is_repeatable() {
        let board = Board::default();
        let a = Policy::Meta(MetaHeuristic::default());
        let b = policy(Heuristic::Random);
        let play = || {
            let mut ctx = SelectionContext::seeded(TieBreak::LeastUsed, 2024);
            Duel::new(board, sq(1, 1), sq(6, 5), CrossingRule::NonCrossing)
                .unwrap()
                .run([&a, &b], &mut ctx)
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_free_rule_allows_longer_paths() {
        let board = Board::default();
        let p = policy(Heuristic::Warnsdorff);
        let mut ctx = SelectionContext::seeded(TieBreak::First, 0);
        let free = Duel::new(board, sq(0, 0), sq(7, 7), CrossingRule::Free)
            .unwrap()
            .run([&p, &p], &mut ctx);
        assert!(free.moves[0] + free.moves[1] + 2 <= board.area() as u32);
        assert!(free.paths.iter().all(|path| !path.is_empty()));
    }

    #[test]
    fn test_simultaneous_drop_does_not_stick() {
        // Both knights' only move is (2,1): knight 1 gets it, knight 2 is dropped
        let board = Board::default();
        let p = policy(Heuristic::MaxMobility);
        let mut ctx = SelectionContext::seeded(TieBreak::First, 0);
        let mut duel = Duel::new(board, sq(0, 0), sq(3, 3), CrossingRule::NonCrossing)
            .unwrap()
            .with_turn_model(TurnModel::Simultaneous);
        let occupied = [
            sq(0, 0), sq(3, 3), sq(1, 2), sq(4, 5), sq(5, 4), sq(2, 5), sq(1, 4), sq(4, 1), sq(5, 2),
        ];
        duel.field = Field::with_starts(CrossingRule::NonCrossing, &occupied);
        assert_eq!(duel.turn(Knight::First).legal_moves(), vec![sq(2, 1)]);
        assert_eq!(duel.turn(Knight::Second).legal_moves(), vec![sq(2, 1)]);

        let phase = duel.step([&p, &p], &mut ctx);
        assert_eq!(duel.position(Knight::First), sq(2, 1));
        assert_eq!(duel.position(Knight::Second), sq(3, 3));
        assert_eq!(phase, DuelPhase::Active);
        assert!(!duel.is_stuck(Knight::Second));

        assert_eq!(duel.step([&p, &p], &mut ctx), DuelPhase::Stuck2);
    }

    #[test]
    fn test_result_from_lengths() {
        assert_eq!(DuelResult::from_lengths(5, 3), DuelResult::Knight1);
        assert_eq!(DuelResult::from_lengths(3, 5), DuelResult::Knight2);
        assert_eq!(DuelResult::from_lengths(4, 4), DuelResult::Draw);
    }

    #[test]
    fn test_turn_model_parse() {
        assert_eq!("simultaneous".parse::<TurnModel>().unwrap(), TurnModel::Simultaneous);
        assert_eq!("Alternating".parse::<TurnModel>().unwrap(), TurnModel::Alternating);
        assert!(matches!("both".parse::<TurnModel>(), Err(Error::UnknownTurnModel(_))));
    }
}
