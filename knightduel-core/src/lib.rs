//! KNIGHTDUEL Core - Non-crossing knight duel engine
//!
//! This crate provides the core simulation logic:
//! - Board geometry and knight offsets
//! - Path segments and the crossing test
//! - Legal move generation under the non-crossing rule
//! - Move-selection heuristics and tie-break strategies
//! - The weighted meta-heuristic
//! - The duel state machine

pub mod board;
pub mod square_set;
pub mod geometry;
pub mod field;
pub mod moves;
pub mod tiebreak;
pub mod heuristics;
pub mod meta;
pub mod policy;
pub mod duel;
pub mod error;

// Re-exports for convenient access
pub use board::{Board, Square, KNIGHT_OFFSETS, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
pub use square_set::SquareSet;
pub use geometry::{segments_cross, crosses_any, segments_from_path, Segment};
pub use field::{CrossingRule, Field};
pub use moves::{legal_moves, mobility, is_legal, Turn};
pub use tiebreak::{TieBreak, TieBreakState};
pub use heuristics::{Heuristic, SelectionContext};
pub use meta::{MetaHeuristic, MetaWeights, MoveFeatures};
pub use policy::Policy;
pub use duel::{Duel, DuelOutcome, DuelPhase, DuelResult, Knight, TurnModel};
pub use error::{Error, Result};
