//! Heuristic tactic classification of a missed move.
//!
//! The decision tree looks only at the missed move's descriptor and the board
//! after the opponent's mistake. It does no line-of-sight or double-attack
//! verification, so every label carries a confidence rather than a proof.

use std::collections::BTreeSet;
use std::fmt;

use chess_core::{MoveDescriptor, PieceType, Position, Square};
use serde::{Deserialize, Serialize};

use crate::reconstruct::TacticRecord;

/// Closed tactic taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticType {
    Fork,
    Pin,
    Skewer,
    DiscoveredAttack,
    DoubleAttack,
    Sacrifice,
    Deflection,
    Decoy,
    Interference,
    Clearance,
    Zugzwang,
    BackRank,
    SmotheredMate,
    MateInOne,
    MateInTwo,
    MateThreat,
    HangingPiece,
    TrappedPiece,
    RemovalOfDefender,
    Attraction,
    Unknown,
}

impl TacticType {
    pub const ALL: [TacticType; 21] = [
        TacticType::Fork,
        TacticType::Pin,
        TacticType::Skewer,
        TacticType::DiscoveredAttack,
        TacticType::DoubleAttack,
        TacticType::Sacrifice,
        TacticType::Deflection,
        TacticType::Decoy,
        TacticType::Interference,
        TacticType::Clearance,
        TacticType::Zugzwang,
        TacticType::BackRank,
        TacticType::SmotheredMate,
        TacticType::MateInOne,
        TacticType::MateInTwo,
        TacticType::MateThreat,
        TacticType::HangingPiece,
        TacticType::TrappedPiece,
        TacticType::RemovalOfDefender,
        TacticType::Attraction,
        TacticType::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TacticType::Fork => "fork",
            TacticType::Pin => "pin",
            TacticType::Skewer => "skewer",
            TacticType::DiscoveredAttack => "discovered_attack",
            TacticType::DoubleAttack => "double_attack",
            TacticType::Sacrifice => "sacrifice",
            TacticType::Deflection => "deflection",
            TacticType::Decoy => "decoy",
            TacticType::Interference => "interference",
            TacticType::Clearance => "clearance",
            TacticType::Zugzwang => "zugzwang",
            TacticType::BackRank => "back_rank",
            TacticType::SmotheredMate => "smothered_mate",
            TacticType::MateInOne => "mate_in_one",
            TacticType::MateInTwo => "mate_in_two",
            TacticType::MateThreat => "mate_threat",
            TacticType::HangingPiece => "hanging_piece",
            TacticType::TrappedPiece => "trapped_piece",
            TacticType::RemovalOfDefender => "removal_of_defender",
            TacticType::Attraction => "attraction",
            TacticType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TacticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub tactic_type: TacticType,
    pub confidence: f64,
    pub description: String,
    pub key_squares: BTreeSet<Square>,
    pub implicated_pieces: BTreeSet<PieceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Index of the blunder/tactic this classification describes
    pub source_index: usize,
    pub game_id: String,
    #[serde(flatten)]
    pub classification: Classification,
}

pub struct Classifier;

impl Classifier {
    /// Classify the missed move (`moves[1]`) of a reconstructed tactic.
    pub fn classify(tactic: &TacticRecord) -> Classification {
        let Some(token) = tactic.missed_move() else {
            return Classification {
                tactic_type: TacticType::Unknown,
                confidence: 0.1,
                description: "No missed continuation recorded".to_string(),
                key_squares: BTreeSet::new(),
                implicated_pieces: BTreeSet::new(),
            };
        };

        let descriptor = MoveDescriptor::parse(token);
        let board = tactic.position_after_opponent().ok();
        let mover = tactic.player_color;
        let destination = descriptor.destination_for(mover);
        let piece = descriptor.piece;

        let mut key_squares: BTreeSet<Square> = destination.into_iter().collect();
        let mut implicated_pieces = BTreeSet::from([piece]);
        let target = destination
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "an unclear square".to_string());

        let (tactic_type, confidence, description) = if descriptor.is_mate || descriptor.is_check {
            implicated_pieces.insert(PieceType::King);
            if let Some(king) = board.as_ref().and_then(|b| b.king_square(!mover)) {
                key_squares.insert(king);
            }

            if descriptor.is_mate {
                let on_back_rank = destination
                    .is_some_and(|sq| sq.rank() == (!mover).back_rank());
                match piece {
                    PieceType::Knight => (
                        TacticType::SmotheredMate,
                        0.8,
                        format!("Knight mates on {target}; the king is smothered by its own pieces"),
                    ),
                    PieceType::Rook | PieceType::Queen if on_back_rank => (
                        TacticType::BackRank,
                        0.8,
                        format!("{} mates on the back rank at {target}", capitalize(piece.name())),
                    ),
                    _ => (
                        TacticType::MateInOne,
                        0.7,
                        format!("{} delivers mate on {target}", capitalize(piece.name())),
                    ),
                }
            } else {
                match piece {
                    PieceType::Knight => (
                        TacticType::Fork,
                        0.8,
                        format!("Knight check on {target} attacks the king and another piece"),
                    ),
                    PieceType::Bishop | PieceType::Rook | PieceType::Queen => (
                        TacticType::DiscoveredAttack,
                        0.7,
                        format!(
                            "{} check on {target} opens a line against the king",
                            capitalize(piece.name())
                        ),
                    ),
                    _ => (
                        TacticType::MateThreat,
                        0.6,
                        format!("{} check on {target} exposes the king", capitalize(piece.name())),
                    ),
                }
            }
        } else if descriptor.is_capture {
            match captured_piece(board.as_ref(), &descriptor, destination) {
                Some(victim) => {
                    implicated_pieces.insert(victim);
                    if piece.value() > victim.value() {
                        (
                            TacticType::Sacrifice,
                            0.7,
                            format!(
                                "{} gives itself up for the {} on {target}",
                                capitalize(piece.name()),
                                victim.name()
                            ),
                        )
                    } else {
                        (
                            TacticType::RemovalOfDefender,
                            0.6,
                            format!(
                                "{} removes the {} on {target}",
                                capitalize(piece.name()),
                                victim.name()
                            ),
                        )
                    }
                }
                None => (
                    TacticType::RemovalOfDefender,
                    0.5,
                    format!("{} captures on {target}", capitalize(piece.name())),
                ),
            }
        } else {
            match piece {
                // Pin and skewer look identical without line-of-sight analysis
                PieceType::Bishop | PieceType::Rook | PieceType::Queen => (
                    TacticType::Pin,
                    0.6,
                    format!("{} on {target} pins a piece along its line", capitalize(piece.name())),
                ),
                PieceType::Knight => (
                    TacticType::Fork,
                    0.7,
                    format!("Knight on {target} attacks two pieces at once"),
                ),
                _ => (
                    TacticType::Unknown,
                    0.3,
                    format!("Quiet {} move to {target}", piece.name()),
                ),
            }
        };

        Classification {
            tactic_type,
            confidence,
            description,
            key_squares,
            implicated_pieces,
        }
    }

    /// Classify a batch, keeping each result aligned with its source index.
    pub fn classify_all(tactics: &[TacticRecord]) -> Vec<ClassificationRecord> {
        tactics
            .iter()
            .enumerate()
            .map(|(source_index, tactic)| ClassificationRecord {
                source_index,
                game_id: tactic.game_id.clone(),
                classification: Self::classify(tactic),
            })
            .collect()
    }
}

/// Piece standing on the capture square; an empty en-passant target counts as a pawn.
fn captured_piece(
    board: Option<&Position>,
    descriptor: &MoveDescriptor,
    destination: Option<Square>,
) -> Option<PieceType> {
    let board = board?;
    let destination = destination?;
    match board.piece_at(destination) {
        Some(victim) if victim.color != board.side_to_move() => Some(victim.kind),
        Some(_) => None,
        None if descriptor.piece == PieceType::Pawn
            && board.en_passant() == Some(destination) =>
        {
            Some(PieceType::Pawn)
        }
        None => None,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
