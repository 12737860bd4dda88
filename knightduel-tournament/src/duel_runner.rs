//! Duel runner - executes single duels
//!
//! Level 3 - Step-level implementation

use knightduel_core::{
    Board, CrossingRule, Duel, DuelOutcome, Policy, Result, SelectionContext, Square, TurnModel,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ExperimentConfig;

/// Seeded generator, or an entropy-seeded one when no seed is given
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Plays duels for one experiment, drawing every random number from the
/// run's single generator
pub struct DuelRunner {
    board: Board,
    policies: [Policy; 2],
    turn_model: TurnModel,
    crossing_rule: CrossingRule,
    starts: Option<(Square, Square)>,
    ctx: SelectionContext,
}

impl DuelRunner {
    /// Validate `config` and seed the run's generator
    pub fn new(config: &ExperimentConfig) -> Result<Self> {
        let board = config.validate()?;
        if config.seed.is_none() {
            tracing::warn!("No seed given: trial sequence is nondeterministic");
        }
        Ok(Self {
            board,
            policies: config.policies(),
            turn_model: config.turn_model,
            crossing_rule: config.crossing_rule,
            starts: config.starts,
            ctx: SelectionContext::new(config.tie_break, create_rng(config.seed)),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn policies(&self) -> &[Policy; 2] {
        &self.policies
    }

    /// Swap one knight's policy, keeping the generator where it is
    pub fn set_policy(&mut self, index: usize, policy: Policy) {
        self.policies[index] = policy;
    }

    pub fn context_mut(&mut self) -> &mut SelectionContext {
        &mut self.ctx
    }

    /// Two distinct uniform squares, by rejection sampling
    pub fn random_starts(&mut self) -> (Square, Square) {
        let n = self.board.size();
        let rng = self.ctx.rng_mut();
        let first = Square::new(rng.gen_range(0..n), rng.gen_range(0..n));
        loop {
            let second = Square::new(rng.gen_range(0..n), rng.gen_range(0..n));
            if second != first {
                return (first, second);
            }
        }
    }

    /// Play one trial: fresh tie-break state, then a duel to termination
    pub fn play_duel(&mut self) -> Result<DuelOutcome> {
        self.ctx.begin_trial();
        let (start1, start2) = match self.starts {
            Some(pair) => pair,
            None => self.random_starts(),
        };
        let duel = Duel::new(self.board, start1, start2, self.crossing_rule)?
            .with_turn_model(self.turn_model);
        let [p1, p2] = &self.policies;
        Ok(duel.run([p1, p2], &mut self.ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knightduel_core::{is_legal, Field, Heuristic, TieBreak, Turn};

    fn config(seed: u64) -> ExperimentConfig {
        ExperimentConfig::default().with_seed(seed).with_trials(10)
    }

    #[test]
    fn test_create_rng_with_seed() {
        let mut a = create_rng(Some(5));
        let mut b = create_rng(Some(5));
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn test_random_starts_are_distinct_and_on_board() {
        let mut runner = DuelRunner::new(&config(1).with_board_size(2)).unwrap();
        for _ in 0..200 {
            let (a, b) = runner.random_starts();
            assert_ne!(a, b);
            assert!(runner.board().contains(a) && runner.board().contains(b));
        }
    }

    #[test]
    fn test_scripted_starts_are_used() {
        let cfg = config(3).with_starts(Square::new(0, 0), Square::new(7, 7));
        let mut runner = DuelRunner::new(&cfg).unwrap();
        let outcome = runner.play_duel().unwrap();
        assert_eq!(outcome.paths[0][0], Square::new(0, 0));
        assert_eq!(outcome.paths[1][0], Square::new(7, 7));
    }

    #[test]
    fn test_paths_are_legal_knight_walks() {
        let mut runner = DuelRunner::new(&config(11)).unwrap();
        let board = *runner.board();
        for _ in 0..10 {
            let outcome = runner.play_duel().unwrap();
            // Replay the moves alternately against a fresh field
            let mut field = Field::with_starts(CrossingRule::NonCrossing, &[outcome.paths[0][0], outcome.paths[1][0]]);
            let longest = outcome.longest() as usize;
            for i in 0..longest {
                for path in &outcome.paths {
                    if let (Some(&from), Some(&to)) = (path.get(i), path.get(i + 1)) {
                        assert!(is_legal(&board, from, to, &field));
                        field.record_move(from, to);
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let run = || {
            let mut runner = DuelRunner::new(&config(99)).unwrap();
            (0..5).map(|_| runner.play_duel().unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_each_trial_starts_with_fresh_tie_break_state() {
        let (a, b) = (Square::new(0, 0), Square::new(7, 7));
        let cfg = ExperimentConfig::new(Heuristic::MaxMobility.into(), Heuristic::MaxMobility.into())
            .with_tie_break(TieBreak::LeastUsed)
            .with_starts(a, b)
            .with_seed(21);
        let mut runner = DuelRunner::new(&cfg).unwrap();
        let board = *runner.board();
        runner.play_duel().unwrap();

        // Skew the usage counter towards the top half of the board
        let field = Field::new(cfg.crossing_rule);
        let turn = Turn::new(&board, &field, a, None);
        let ctx = runner.context_mut();
        for sq in board.squares().filter(|s| s.row < 4) {
            for _ in 0..5 {
                ctx.break_tie(&turn, &[sq, sq]);
            }
        }
        assert!(ctx.state().frequency(Square::new(2, 1)) >= 5);

        let mut fresh = SelectionContext::new(cfg.tie_break, ctx.rng_mut().clone());
        let [p1, p2] = cfg.policies();
        let expected = Duel::new(board, a, b, cfg.crossing_rule)
            .unwrap()
            .with_turn_model(cfg.turn_model)
            .run([&p1, &p2], &mut fresh);

        assert_eq!(runner.play_duel().unwrap(), expected);
    }

    #[test]
    fn test_weight_map_cleared_between_trials() {
        let cfg = config(4).with_tie_break(TieBreak::Weighted);
        let mut runner = DuelRunner::new(&cfg).unwrap();
        let board = *runner.board();
        let ctx = runner.context_mut();
        let field = Field::new(cfg.crossing_rule);
        let turn = Turn::new(&board, &field, Square::new(0, 0), None);
        ctx.break_tie(&turn, &[Square::new(1, 2), Square::new(2, 1)]);
        assert!(ctx.state().has_weight_map());

        ctx.begin_trial();
        assert!(!ctx.state().has_weight_map());
        assert_eq!(ctx.state().frequency(Square::new(1, 2)), 0);
    }

    #[test]
    fn test_set_policy() {
        let mut runner = DuelRunner::new(&config(0)).unwrap();
        runner.set_policy(1, Heuristic::Blocking.into());
        assert_eq!(runner.policies()[1], Policy::Heuristic(Heuristic::Blocking));
    }
}
