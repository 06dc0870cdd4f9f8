//! Integration tests: run the full tactic pipeline over in-memory archives
//! and a recorded Lichess export.

mod common;

use std::collections::BTreeSet;

use chess_core::{Color, Evaluation, PieceType, Square};
use common::*;
use tactic_analyzer::classifier::Classifier;
use tactic_analyzer::clients::lichess::parse_ndjson;
use tactic_analyzer::clients::ArchiveError;
use tactic_analyzer::{
    analyze_games, analyze_tactics, AnalyzerConfig, AnalyzerError, ReconstructOptions, TacticType,
};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn archive() -> FakeArchive {
    FakeArchive {
        games: vec![scholars_mate_missed(), isolated_blunder(), knight_fork_missed()],
    }
}

#[tokio::test]
async fn test_missed_mate_and_fork() {
    let report = analyze_tactics(&archive(), PLAYER, &AnalyzerConfig::default())
        .await
        .unwrap();

    assert_eq!(report.identity, PLAYER);
    assert_eq!(report.blunder_count, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.blunders.len(), 2);

    let mate = &report.tactics[0];
    assert_eq!(mate.game_id, "scholar1");
    assert_eq!(mate.moves, vec!["Nf6", "Qxf7#"]);
    assert_eq!(mate.result, "1-0");
    assert_eq!(mate.termination, Some(Evaluation::Mate(1)));

    let c = &report.classifications[0].classification;
    assert_eq!(c.tactic_type, TacticType::MateInOne);
    assert_eq!(c.confidence, 0.7);
    assert_eq!(c.key_squares, BTreeSet::from([sq("f7"), sq("e8")]));
    assert_eq!(
        c.implicated_pieces,
        BTreeSet::from([PieceType::Queen, PieceType::King])
    );

    let fork = &report.tactics[1];
    assert_eq!(fork.game_id, "fork1");
    assert_eq!(fork.fen, "4k3/7p/8/8/3n4/8/7P/R3K3 w - - 0 1");
    assert_eq!(fork.moves, vec!["h3", "Nc2+", "Kd2", "Nxa1"]);
    assert_eq!(fork.result, "0-1");
    assert_eq!(report.blunders[1].player_color, Color::Black);

    let c = &report.classifications[1].classification;
    assert_eq!(c.tactic_type, TacticType::Fork);
    assert_eq!(c.confidence, 0.8);
    assert_eq!(c.key_squares, BTreeSet::from([sq("c2"), sq("e1")]));

    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.most_missed, Some(TacticType::Fork));
}

#[tokio::test]
async fn test_max_games_limits_fetch() {
    let config = AnalyzerConfig {
        max_games: 1,
        ..AnalyzerConfig::default()
    };
    let report = analyze_tactics(&archive(), PLAYER, &config).await.unwrap();
    assert_eq!(report.blunder_count, 1);
    assert_eq!(report.tactics[0].game_id, "scholar1");
}

#[tokio::test]
async fn test_archive_failure_fails_run() {
    let err = analyze_tactics(&MissingUserArchive, "ghost", &AnalyzerConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AnalyzerError::Archive(ArchiveError::UserNotFound(_))
    ));
}

#[test]
fn test_isolated_blunder_yields_no_records() {
    let report = analyze_games(&[isolated_blunder()], PLAYER, &ReconstructOptions::default());
    assert_eq!(report.blunder_count, 0);
    assert!(report.blunders.is_empty());
    assert!(report.tactics.is_empty());
    assert!(report.classifications.is_empty());
}

#[test]
fn test_unresolvable_move_is_skipped() {
    let mut broken = scholars_mate_missed();
    broken.id = "broken".to_string();
    broken.moves[2] = "Bc5".to_string();

    let games = vec![broken, knight_fork_missed()];
    let report = analyze_games(&games, PLAYER, &ReconstructOptions::default());

    assert_eq!(report.blunder_count, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.blunders.len(), 1);
    assert_eq!(report.tactics.len(), 1);
    assert_eq!(report.classifications.len(), 1);
    assert_eq!(report.classifications[0].game_id, "fork1");
}

#[test]
fn test_black_to_move_start_uses_player_plies() {
    let report = analyze_games(
        &[black_first_check_missed()],
        PLAYER,
        &ReconstructOptions::default(),
    );

    assert_eq!(report.blunder_count, 1);
    let blunder = &report.blunders[0];
    assert_eq!(blunder.ply_index, 2);
    assert_eq!(blunder.player_color, Color::White);
    assert!(blunder.side_to_move_was_player);

    let tactic = &report.tactics[0];
    assert_eq!(tactic.fen, "6k1/5pp1/7p/8/8/8/8/R4K2 b - - 1 2");
    assert_eq!(tactic.moves, vec!["g5", "Ra8+", "Kh7"]);
    assert_eq!(tactic.result, "1-0");

    let c = &report.classifications[0].classification;
    assert_eq!(c.tactic_type, TacticType::DiscoveredAttack);
    assert_eq!(c.key_squares, BTreeSet::from([sq("a8"), sq("g8")]));
}

#[test]
fn test_index_alignment() {
    let games = vec![knight_fork_missed(), scholars_mate_missed(), knight_fork_missed()];
    let report = analyze_games(&games, PLAYER, &ReconstructOptions::default());

    assert_eq!(report.blunders.len(), 3);
    for (i, record) in report.classifications.iter().enumerate() {
        assert_eq!(record.source_index, i);
        assert_eq!(record.game_id, report.blunders[i].game_id);
        assert_eq!(report.tactics[i].game_id, report.blunders[i].game_id);
        assert_eq!(report.tactics[i].ply_index, report.blunders[i].ply_index);
    }
}

#[test]
fn test_classification_is_idempotent() {
    let report = analyze_games(
        &[scholars_mate_missed(), knight_fork_missed()],
        PLAYER,
        &ReconstructOptions::default(),
    );
    for (tactic, record) in report.tactics.iter().zip(&report.classifications) {
        assert_eq!(Classifier::classify(tactic), record.classification);
    }
    let again = analyze_games(
        &[scholars_mate_missed(), knight_fork_missed()],
        PLAYER,
        &ReconstructOptions::default(),
    );
    assert_eq!(again, report);
}

#[test]
fn test_lichess_export_fixture() {
    let text = include_str!("fixtures/lichess_games.ndjson");
    let games = parse_ndjson(text);
    assert_eq!(games.len(), 2, "crazyhouse game should be skipped");

    let report = analyze_games(&games, PLAYER, &ReconstructOptions::default());
    assert_eq!(report.blunder_count, 2);
    assert_eq!(report.skipped, 0);

    let types: Vec<TacticType> = report
        .classifications
        .iter()
        .map(|c| c.classification.tactic_type)
        .collect();
    assert_eq!(types, vec![TacticType::MateInOne, TacticType::Fork]);

    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["classifications"][0]["tactic_type"], "mate_in_one");
    assert_eq!(value["classifications"][1]["key_squares"][0], "c2");
    assert_eq!(value["tactics"][0]["termination"]["mate"], 1);
}
