//! Configuration errors
//!
//! Running out of legal moves is never an error: selectors return `None`.
//! Everything here is raised while an experiment is being set up.

use crate::board::{Square, MAX_BOARD_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("board size {0} is too small (need at least {1})")]
    BoardTooSmall(u8, u8),

    #[error("board size {0} exceeds the maximum of {}", MAX_BOARD_SIZE)]
    BoardTooLarge(u8),

    #[error("square {square} is outside a {size}x{size} board")]
    StartOutOfBounds { square: Square, size: u8 },

    #[error("both knights cannot start on {0}")]
    SameStart(Square),

    #[error("blockade start {0} lies on the centre column and mirrors onto itself")]
    SelfMirroringStart(Square),

    #[error("unknown heuristic: {0}")]
    UnknownHeuristic(String),

    #[error("unknown tie-break strategy: {0}")]
    UnknownTieBreak(String),

    #[error("unknown turn model: {0}")]
    UnknownTurnModel(String),

    #[error("lookahead depth {0} is out of range (1-4 plies)")]
    InvalidLookaheadDepth(u8),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("experiment must run at least one trial")]
    NoTrials,

    #[error("blockade script is empty")]
    EmptyScript,
}

pub type Result<T> = std::result::Result<T, Error>;
