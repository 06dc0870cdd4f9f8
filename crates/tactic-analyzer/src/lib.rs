//! Missed-tactic analysis over annotated game archives.

pub use chess_core;

pub mod blunders;
pub mod classifier;
pub mod clients;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reconstruct;
pub mod summary;

pub use blunders::BlunderRecord;
pub use classifier::{Classification, ClassificationRecord, Classifier, TacticType};
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use pipeline::{analyze_games, analyze_tactics, TacticReport};
pub use reconstruct::{ReconstructOptions, TacticRecord};
pub use summary::TacticSummary;
