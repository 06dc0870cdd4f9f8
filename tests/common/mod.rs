#![allow(dead_code)]

use chess_core::{Evaluation, GameRecord, Judgment, PlyAnnotation};
use tactic_analyzer::clients::{ArchiveError, GameArchive};

pub const PLAYER: &str = "alice";

/// In-memory archive serving a fixed set of games.
pub struct FakeArchive {
    pub games: Vec<GameRecord>,
}

impl GameArchive for FakeArchive {
    async fn fetch_games(
        &self,
        _identity: &str,
        max_games: usize,
    ) -> Result<Vec<GameRecord>, ArchiveError> {
        Ok(self.games.iter().take(max_games).cloned().collect())
    }
}

/// Archive that never finds the user.
pub struct MissingUserArchive;

impl GameArchive for MissingUserArchive {
    async fn fetch_games(
        &self,
        identity: &str,
        _max_games: usize,
    ) -> Result<Vec<GameRecord>, ArchiveError> {
        Err(ArchiveError::UserNotFound(identity.to_string()))
    }
}

/// Game with no annotations beyond empty plies.
pub fn game(id: &str, white: &str, black: &str, moves: &[&str]) -> GameRecord {
    GameRecord {
        id: id.to_string(),
        white: Some(white.to_string()),
        black: Some(black.to_string()),
        initial_fen: None,
        moves: moves.iter().map(|s| s.to_string()).collect(),
        analysis: vec![PlyAnnotation::default(); moves.len()],
    }
}

pub fn blunder(eval: Evaluation, variation: &str) -> PlyAnnotation {
    PlyAnnotation {
        eval: Some(eval),
        judgment: Some(Judgment::Blunder),
        variation: Some(variation.to_string()),
    }
}

/// Alice (White) misses Qxf7# after 3...Nf6??
pub fn scholars_mate_missed() -> GameRecord {
    let mut g = game(
        "scholar1",
        PLAYER,
        "bob",
        &["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "d3"],
    );
    g.analysis[5] = blunder(Evaluation::Mate(1), "Qxf7#");
    g.analysis[6] = blunder(Evaluation::Centipawns(-300), "Qxf7#");
    g
}

/// Alice (Black) misses the knight fork Nc2+ after 1. h3??
pub fn knight_fork_missed() -> GameRecord {
    let mut g = game("fork1", "bob", PLAYER, &["h3", "h6"]);
    g.initial_fen = Some("4k3/7p/8/8/3n4/8/7P/R3K3 w - - 0 1".to_string());
    g.analysis[0] = blunder(Evaluation::Centipawns(-450), "Kd2");
    g.analysis[1] = blunder(Evaluation::Centipawns(20), "Nc2+ Kd2 Nxa1");
    g
}

/// Bob (Black) moves first from a set-up position; Alice (White) misses Ra8+ after 2...g5??
pub fn black_first_check_missed() -> GameRecord {
    let mut g = game("setup1", PLAYER, "bob", &["h6", "Kf1", "g5", "Kg2"]);
    g.initial_fen = Some("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1".to_string());
    g.analysis[2] = blunder(Evaluation::Centipawns(400), "Kh7");
    g.analysis[3] = blunder(Evaluation::Centipawns(0), "Ra8+ Kh7");
    g
}

/// Only Bob's blunder is flagged; Alice's reply is fine.
pub fn isolated_blunder() -> GameRecord {
    let mut g = game("iso1", PLAYER, "bob", &["e4", "e5", "Nf3", "f6", "Nxe5"]);
    g.analysis[3] = blunder(Evaluation::Centipawns(150), "Nc6");
    g
}
