//! Blunder locator: finds plies where the player failed to punish an
//! opponent blunder.

use chess_core::{Color, Evaluation, GameRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlunderRecord {
    pub game_id: String,
    /// Ply of the opponent's move where the tactic begins; the player's
    /// flagged ply is `ply_index + 1`.
    pub ply_index: usize,
    pub player_color: Color,
    /// Evaluation after the player's flagged ply
    pub evaluation: Option<Evaluation>,
    /// Evaluator's best line for the player at the flagged ply
    pub suggested_variation: Vec<String>,
    pub side_to_move_was_player: bool,
}

impl BlunderRecord {
    pub fn flagged_ply(&self) -> usize {
        self.ply_index + 1
    }
}

/// Locate double-confirmed blunders for `identity` in one game.
///
/// A player ply qualifies only when it and the opponent ply before it are
/// both judged `Blunder`. Unannotated games and games the player did not
/// take part in yield nothing.
pub fn locate(game: &GameRecord, identity: &str) -> Vec<BlunderRecord> {
    if !game.is_annotated() {
        tracing::debug!(game_id = %game.id, "Game has no annotations");
        return Vec::new();
    }

    let Some(player_color) = game.player_color(identity) else {
        tracing::debug!(game_id = %game.id, identity, "Player not found in game");
        return Vec::new();
    };

    let first_mover = match game.start_position() {
        Ok(start) => start.side_to_move(),
        Err(e) => {
            tracing::warn!(game_id = %game.id, "Skipping game: {e}");
            return Vec::new();
        }
    };

    // The player's plies are the even ones when they move first
    let first_ply = if first_mover == player_color { 2 } else { 1 };
    let end = game.analysis.len().min(game.moves.len());

    let mut records = Vec::new();
    for ply in (first_ply..end).step_by(2) {
        let current = &game.analysis[ply];
        if !current.is_blunder() || !game.analysis[ply - 1].is_blunder() {
            continue;
        }

        let ply_index = ply - 1;
        let suggested_variation = current
            .variation
            .as_deref()
            .map(chess_core::pgn::extract_moves)
            .unwrap_or_default();

        let mover = if ply % 2 == 0 { first_mover } else { !first_mover };

        tracing::debug!(game_id = %game.id, ply, "Located missed punishment");
        records.push(BlunderRecord {
            game_id: game.id.clone(),
            ply_index,
            player_color,
            evaluation: current.eval,
            suggested_variation,
            side_to_move_was_player: mover == player_color,
        });
    }

    records
}
