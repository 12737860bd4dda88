//! Statistics over many duels
//!
//! Level 4 - Utilities

use std::collections::BTreeMap;

use knightduel_core::{DuelOutcome, DuelResult, Knight};
use serde::Serialize;

/// Win/draw counts for one value of the longer path length
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LengthBucket {
    pub knight1_wins: u32,
    pub knight2_wins: u32,
    pub draws: u32,
}

impl LengthBucket {
    pub fn total(&self) -> u32 {
        self.knight1_wins + self.knight2_wins + self.draws
    }

    fn add(&mut self, result: DuelResult) {
        match result {
            DuelResult::Knight1 => self.knight1_wins += 1,
            DuelResult::Knight2 => self.knight2_wins += 1,
            DuelResult::Draw => self.draws += 1,
        }
    }

    fn merge(&mut self, other: &LengthBucket) {
        self.knight1_wins += other.knight1_wins;
        self.knight2_wins += other.knight2_wins;
        self.draws += other.draws;
    }
}

/// Move totals of the duels that ended with one result
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub count: u32,
    /// Summed moves per knight
    pub moves: [u64; 2],
}

impl CategoryTotals {
    /// Average moves of `knight` within this category
    pub fn avg_moves(&self, knight: Knight) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.moves[knight.index()] as f64 / self.count as f64
        }
    }

    fn merge(&mut self, other: &CategoryTotals) {
        self.count += other.count;
        self.moves[0] += other.moves[0];
        self.moves[1] += other.moves[1];
    }
}

/// Aggregate of a batch of trials
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrialStats {
    pub trials: u32,
    pub knight1_wins: u32,
    pub knight2_wins: u32,
    pub draws: u32,
    /// Summed moves per knight
    pub total_moves: [u64; 2],
    /// Path length -> number of trials, per knight
    pub histograms: [BTreeMap<u32, u32>; 2],
    /// Longer of the two path lengths -> outcome counts
    pub by_longest: BTreeMap<u32, LengthBucket>,
    pub knight1_won: CategoryTotals,
    pub knight2_won: CategoryTotals,
    pub drawn: CategoryTotals,
}

impl TrialStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &DuelOutcome) {
        self.trials += 1;
        for knight in Knight::BOTH {
            let moves = outcome.moves[knight.index()];
            self.total_moves[knight.index()] += moves as u64;
            *self.histograms[knight.index()].entry(moves).or_insert(0) += 1;
        }
        self.by_longest
            .entry(outcome.longest())
            .or_default()
            .add(outcome.result);

        let category = match outcome.result {
            DuelResult::Knight1 => {
                self.knight1_wins += 1;
                &mut self.knight1_won
            }
            DuelResult::Knight2 => {
                self.knight2_wins += 1;
                &mut self.knight2_won
            }
            DuelResult::Draw => {
                self.draws += 1;
                &mut self.drawn
            }
        };
        category.count += 1;
        category.moves[0] += outcome.moves[0] as u64;
        category.moves[1] += outcome.moves[1] as u64;
    }

    /// Combine two batches
    pub fn combine(&self, other: &TrialStats) -> TrialStats {
        let mut merged = self.clone();
        merged.trials += other.trials;
        merged.knight1_wins += other.knight1_wins;
        merged.knight2_wins += other.knight2_wins;
        merged.draws += other.draws;
        for i in 0..2 {
            merged.total_moves[i] += other.total_moves[i];
            for (&len, &count) in &other.histograms[i] {
                *merged.histograms[i].entry(len).or_insert(0) += count;
            }
        }
        for (&len, bucket) in &other.by_longest {
            merged.by_longest.entry(len).or_default().merge(bucket);
        }
        merged.knight1_won.merge(&other.knight1_won);
        merged.knight2_won.merge(&other.knight2_won);
        merged.drawn.merge(&other.drawn);
        merged
    }

    fn rate(&self, count: u32) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            count as f64 / self.trials as f64
        }
    }

    pub fn knight1_win_rate(&self) -> f64 {
        self.rate(self.knight1_wins)
    }

    pub fn knight2_win_rate(&self) -> f64 {
        self.rate(self.knight2_wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    /// Average path length (moves) of `knight`
    pub fn avg_moves(&self, knight: Knight) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_moves[knight.index()] as f64 / self.trials as f64
        }
    }

    pub fn category(&self, result: DuelResult) -> &CategoryTotals {
        match result {
            DuelResult::Knight1 => &self.knight1_won,
            DuelResult::Knight2 => &self.knight2_won,
            DuelResult::Draw => &self.drawn,
        }
    }

    pub fn histogram(&self, knight: Knight) -> &BTreeMap<u32, u32> {
        &self.histograms[knight.index()]
    }
}
