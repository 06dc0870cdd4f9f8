//! Analyzer configuration from environment variables

use std::env;

use crate::error::AnalyzerError;
use crate::reconstruct::{ReconstructOptions, DEFAULT_PREVIEW_PLIES};

pub const DEFAULT_LICHESS_BASE_URL: &str = "https://lichess.org";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Game archive host (overridable for local mirrors)
    pub lichess_base_url: String,

    /// Most recent games fetched per run
    pub max_games: usize,

    /// Comma-separated Lichess perf types to include
    pub perf_types: String,

    /// Preview length for non-mate tactic lines; `None` keeps full lines
    pub preview_plies: Option<usize>,

    /// Timeout for the archive request in seconds
    pub archive_timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lichess_base_url: DEFAULT_LICHESS_BASE_URL.to_string(),
            max_games: 50,
            perf_types: "blitz,rapid,classical".to_string(),
            preview_plies: Some(DEFAULT_PREVIEW_PLIES),
            archive_timeout_secs: 120,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AnalyzerError> {
        let defaults = Self::default();

        let lichess_base_url = lookup("LICHESS_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.lichess_base_url);

        let max_games = lookup("TACTIC_MAX_GAMES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_games);
        if max_games == 0 {
            return Err(AnalyzerError::Config(
                "TACTIC_MAX_GAMES must be at least 1".to_string(),
            ));
        }

        let perf_types = lookup("TACTIC_PERF_TYPES").unwrap_or(defaults.perf_types);

        // 0 disables truncation
        let preview_plies = match lookup("TACTIC_PREVIEW_PLIES").and_then(|v| v.parse::<usize>().ok()) {
            Some(0) => None,
            Some(n) => Some(n),
            None => defaults.preview_plies,
        };

        let archive_timeout_secs = lookup("ARCHIVE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.archive_timeout_secs);

        Ok(Self {
            lichess_base_url,
            max_games,
            perf_types,
            preview_plies,
            archive_timeout_secs,
        })
    }

    pub fn reconstruct_options(&self) -> ReconstructOptions {
        ReconstructOptions {
            preview_plies: self.preview_plies,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AnalyzerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.preview_plies, Some(6));
    }

    #[test]
    fn test_overrides() {
        let config = AnalyzerConfig::from_lookup(lookup(&[
            ("LICHESS_BASE_URL", "http://localhost:9663/"),
            ("TACTIC_MAX_GAMES", "10"),
            ("TACTIC_PREVIEW_PLIES", "0"),
            ("ARCHIVE_TIMEOUT_SECS", "bogus"),
        ]))
        .unwrap();
        assert_eq!(config.lichess_base_url, "http://localhost:9663");
        assert_eq!(config.max_games, 10);
        assert_eq!(config.preview_plies, None);
        assert_eq!(config.archive_timeout_secs, 120);
        assert_eq!(config.reconstruct_options().preview_plies, None);
    }

    #[test]
    fn test_zero_games_rejected() {
        let err = AnalyzerConfig::from_lookup(lookup(&[("TACTIC_MAX_GAMES", "0")])).unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }
}
