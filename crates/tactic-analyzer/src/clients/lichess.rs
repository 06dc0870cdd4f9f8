use std::time::Duration;

use chess_core::{Evaluation, GameRecord, Judgment, PlyAnnotation};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::GameArchive;
use crate::config::AnalyzerConfig;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("HTTP {0}")]
    Status(StatusCode),
}

pub struct LichessClient {
    client: Client,
    base_url: String,
    perf_types: String,
}

impl LichessClient {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ArchiveError> {
        let client = Client::builder()
            .user_agent("TacticTrainer/1.0")
            .timeout(Duration::from_secs(config.archive_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.lichess_base_url.clone(),
            perf_types: config.perf_types.clone(),
        })
    }

    /// Fetch the user's most recent analysed games.
    pub async fn fetch_user_games(
        &self,
        username: &str,
        max_games: usize,
    ) -> Result<Vec<GameRecord>, ArchiveError> {
        let url = format!("{}/api/games/user/{}", self.base_url, username);

        let params = [
            ("max", max_games.to_string()),
            ("analysed", "true".to_string()),
            ("evals", "true".to_string()),
            ("moves", "true".to_string()),
            ("perfType", self.perf_types.clone()),
        ];

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .header("Accept", "application/x-ndjson")
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ArchiveError::UserNotFound(username.to_string()));
        }

        if !resp.status().is_success() {
            return Err(ArchiveError::Status(resp.status()));
        }

        let text = resp.text().await?;
        let games = parse_ndjson(&text);
        tracing::debug!(username, count = games.len(), "Fetched Lichess games");
        Ok(games)
    }
}

impl GameArchive for LichessClient {
    async fn fetch_games(
        &self,
        identity: &str,
        max_games: usize,
    ) -> Result<Vec<GameRecord>, ArchiveError> {
        self.fetch_user_games(identity, max_games).await
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LichessGame {
    id: String,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    initial_fen: Option<String>,
    #[serde(default)]
    players: LichessPlayers,
    #[serde(default)]
    moves: String,
    #[serde(default)]
    analysis: Vec<LichessPly>,
}

#[derive(Deserialize, Default)]
struct LichessPlayers {
    #[serde(default)]
    white: LichessPlayer,
    #[serde(default)]
    black: LichessPlayer,
}

#[derive(Deserialize, Default)]
struct LichessPlayer {
    #[serde(default)]
    user: Option<LichessUser>,
}

#[derive(Deserialize)]
struct LichessUser {
    name: String,
}

#[derive(Deserialize)]
struct LichessPly {
    #[serde(default)]
    eval: Option<i32>,
    #[serde(default)]
    mate: Option<i32>,
    #[serde(default)]
    variation: Option<String>,
    #[serde(default)]
    judgment: Option<LichessJudgment>,
}

#[derive(Deserialize)]
struct LichessJudgment {
    name: String,
}

impl LichessGame {
    /// Only standard-rules games can be replayed
    fn is_standard(&self) -> bool {
        matches!(
            self.variant.as_deref(),
            None | Some("standard") | Some("fromPosition")
        )
    }

    fn into_record(self) -> GameRecord {
        let analysis = self
            .analysis
            .into_iter()
            .map(|ply| PlyAnnotation {
                eval: ply
                    .mate
                    .map(Evaluation::Mate)
                    .or(ply.eval.map(Evaluation::Centipawns)),
                judgment: ply.judgment.and_then(|j| Judgment::from_name(&j.name)),
                variation: ply.variation,
            })
            .collect();

        GameRecord {
            id: self.id,
            white: self.players.white.user.map(|u| u.name),
            black: self.players.black.user.map(|u| u.name),
            initial_fen: self.initial_fen,
            moves: self.moves.split_whitespace().map(String::from).collect(),
            analysis,
        }
    }
}

/// Parse a Lichess NDJSON export. Malformed lines and non-standard variants are skipped.
pub fn parse_ndjson(text: &str) -> Vec<GameRecord> {
    let mut results = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<LichessGame>(line) {
            Ok(game) if game.is_standard() => results.push(game.into_record()),
            Ok(game) => {
                tracing::debug!(game_id = %game.id, variant = ?game.variant, "Skipping variant game");
            }
            Err(e) => {
                tracing::warn!("Failed to parse Lichess game JSON: {e}");
            }
        }
    }

    results
}
