//! Board model error types

use thiserror::Error;

use crate::position::Color;

/// Structural reasons a position string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedPosition {
    #[error("empty position string")]
    Empty,

    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),

    #[error("rank {rank} spans {files} files, expected 8")]
    RankLength { rank: usize, files: usize },

    #[error("rank {0} splits an empty run across adjacent digits")]
    AdjacentDigits(usize),

    #[error("unknown piece character '{0}'")]
    UnknownPiece(char),

    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: usize },

    #[error("invalid {name} field `{value}`")]
    Field { name: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("malformed position: {0}")]
    MalformedPosition(#[from] MalformedPosition),

    #[error("cannot resolve move `{token}`: {reason}")]
    UnresolvableMove { token: String, reason: String },

    #[error("invalid square `{0}`")]
    InvalidSquare(String),
}

impl BoardError {
    pub(crate) fn unresolvable(token: &str, reason: impl Into<String>) -> Self {
        BoardError::UnresolvableMove {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
