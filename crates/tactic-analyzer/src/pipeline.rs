//! Pipeline orchestration: archive -> locator -> reconstructor -> classifier.

use chess_core::GameRecord;
use serde::{Deserialize, Serialize};

use crate::blunders::{locate, BlunderRecord};
use crate::classifier::{ClassificationRecord, Classifier};
use crate::clients::GameArchive;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::reconstruct::{reconstruct_with, ReconstructOptions, Replay, TacticRecord};
use crate::summary::TacticSummary;

/// Full output of one run. `tactics[i]` and `classifications[i]` describe `blunders[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticReport {
    pub identity: String,
    pub blunders: Vec<BlunderRecord>,
    pub tactics: Vec<TacticRecord>,
    pub classifications: Vec<ClassificationRecord>,
    /// Blunders located, including those later skipped
    pub blunder_count: usize,
    /// Located blunders dropped because their game could not be replayed
    pub skipped: usize,
    pub summary: TacticSummary,
}

impl TacticReport {
    pub fn to_json(&self) -> Result<String, AnalyzerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fetch the player's games and classify every missed tactic.
pub async fn analyze_tactics<A: GameArchive>(
    archive: &A,
    identity: &str,
    config: &AnalyzerConfig,
) -> Result<TacticReport, AnalyzerError> {
    let games = archive.fetch_games(identity, config.max_games).await?;
    tracing::info!(identity, games = games.len(), "Fetched games");

    Ok(analyze_games(&games, identity, &config.reconstruct_options()))
}

/// Run the pipeline over games already in hand. Never fails on a bad game.
pub fn analyze_games(
    games: &[GameRecord],
    identity: &str,
    options: &ReconstructOptions,
) -> TacticReport {
    let mut blunders = Vec::new();
    let mut tactics = Vec::new();
    let mut blunder_count = 0;
    let mut skipped = 0;

    for game in games {
        let located = locate(game, identity);
        if located.is_empty() {
            continue;
        }
        blunder_count += located.len();

        let mut replay = match Replay::new(game) {
            Ok(replay) => replay,
            Err(e) => {
                tracing::warn!(game_id = %game.id, "Skipping game: {e}");
                skipped += located.len();
                continue;
            }
        };

        let total = located.len();
        for (n, blunder) in located.into_iter().enumerate() {
            match reconstruct_with(&mut replay, &blunder, options) {
                Ok(tactic) => {
                    blunders.push(blunder);
                    tactics.push(tactic);
                }
                Err(e) => {
                    tracing::warn!(
                        game_id = %game.id,
                        ply = blunder.ply_index,
                        "Stopping replay: {e}"
                    );
                    skipped += total - n;
                    break;
                }
            }
        }
    }

    let classifications = Classifier::classify_all(&tactics);
    let summary = TacticSummary::from_classifications(&classifications);

    tracing::info!(
        identity,
        located = blunder_count,
        classified = classifications.len(),
        skipped,
        "Tactic analysis complete"
    );

    TacticReport {
        identity: identity.to_string(),
        blunders,
        tactics,
        classifications,
        blunder_count,
        skipped,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use chess_core::{Evaluation, Judgment, PlyAnnotation};

    use super::*;
    use crate::classifier::TacticType;

    fn blunder_ply(eval: Evaluation, variation: &str) -> PlyAnnotation {
        PlyAnnotation {
            eval: Some(eval),
            judgment: Some(Judgment::Blunder),
            variation: Some(variation.to_string()),
        }
    }

    fn game(id: &str, moves: &[&str]) -> GameRecord {
        GameRecord {
            id: id.into(),
            white: Some("alice".into()),
            black: Some("bob".into()),
            initial_fen: None,
            moves: moves.iter().map(|s| s.to_string()).collect(),
            analysis: vec![PlyAnnotation::default(); moves.len()],
        }
    }

    /// Two double-blunders for White: after 2...Nf6?? and after 3...Nh5??
    fn two_blunder_game(id: &str) -> GameRecord {
        let mut g = game(id, &["e4", "e5", "Nf3", "Nf6", "Nc3", "Nh5", "a3", "a6"]);
        g.analysis[3] = blunder_ply(Evaluation::Centipawns(250), "Nxe4");
        g.analysis[4] = blunder_ply(Evaluation::Centipawns(-10), "Nxe5");
        g.analysis[5] = blunder_ply(Evaluation::Centipawns(300), "Nxe5");
        g.analysis[6] = blunder_ply(Evaluation::Centipawns(0), "Nxe5 d6");
        g
    }

    #[test]
    fn test_analyze_games_aligns_records() {
        let games = vec![game("quiet", &["e4", "e5"]), two_blunder_game("g2")];
        let report = analyze_games(&games, "alice", &ReconstructOptions::default());

        assert_eq!(report.blunder_count, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.tactics.len(), 2);
        assert_eq!(report.classifications.len(), 2);
        for (i, classification) in report.classifications.iter().enumerate() {
            assert_eq!(classification.source_index, i);
            assert_eq!(classification.game_id, report.blunders[i].game_id);
            assert_eq!(report.tactics[i].ply_index, report.blunders[i].ply_index);
        }
        assert_eq!(report.tactics[1].moves, vec!["Nh5", "Nxe5", "d6"]);
        assert_eq!(
            report.classifications[1].classification.tactic_type,
            TacticType::Sacrifice
        );
    }

    #[test]
    fn test_unresolvable_move_drops_rest_of_game() {
        let mut broken = two_blunder_game("broken");
        broken.moves[4] = "Bc5".into();
        let games = vec![broken, two_blunder_game("ok")];
        let report = analyze_games(&games, "alice", &ReconstructOptions::default());

        // First blunder (ply 3) replays fine; the second needs ply 4
        assert_eq!(report.blunder_count, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.blunders.len(), 3);
        assert_eq!(report.tactics.len(), 3);
        assert_eq!(report.classifications.len(), 3);
        assert_eq!(report.blunders[0].game_id, "broken");
        assert_eq!(report.blunders[1].game_id, "ok");
    }

    #[test]
    fn test_malformed_start_position_skips_game() {
        let mut g = two_blunder_game("bad-fen");
        g.initial_fen = Some("8/8/8/8/8/8/8/8 w - - 0 1".into());
        let report = analyze_games(&[g], "alice", &ReconstructOptions::default());
        assert_eq!(report.blunder_count, 0);
        assert_eq!(report.skipped, 0);
        assert!(report.blunders.is_empty());
        assert_eq!(report.summary.total, 0);
    }

    #[test]
    fn test_report_serializes() {
        let report = analyze_games(&[two_blunder_game("g")], "alice", &ReconstructOptions::default());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"tactic_type\""));
        assert!(json.contains("\"identity\": \"alice\""));
    }
}
