//! Analyzer error types

use thiserror::Error;

use crate::clients::ArchiveError;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Game archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
