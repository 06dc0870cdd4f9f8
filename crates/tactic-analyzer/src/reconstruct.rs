//! Tactic reconstruction: replays a game to the opponent's mistake and
//! assembles the missed line.

use chess_core::pgn::tactic_pgn;
use chess_core::{BoardError, Color, Evaluation, GameRecord, Position};
use serde::{Deserialize, Serialize};

use crate::blunders::BlunderRecord;

pub const DEFAULT_PREVIEW_PLIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Truncate non-mate lines to this many plies; `None` keeps the full line
    pub preview_plies: Option<usize>,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            preview_plies: Some(DEFAULT_PREVIEW_PLIES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticRecord {
    pub game_id: String,
    pub ply_index: usize,
    /// Position before the opponent's move at `ply_index`
    pub fen: String,
    /// Opponent's actual move followed by the player's missed continuation
    pub moves: Vec<String>,
    pub result: String,
    pub player_color: Color,
    /// Evaluation after the opponent's move
    pub termination: Option<Evaluation>,
    pub pgn: String,
}

impl TacticRecord {
    pub fn opponent_move(&self) -> Option<&str> {
        self.moves.first().map(String::as_str)
    }

    pub fn missed_move(&self) -> Option<&str> {
        self.moves.get(1).map(String::as_str)
    }

    pub fn ends_in_mate(&self) -> bool {
        self.termination.is_some_and(Evaluation::is_mate)
    }

    /// Board after the opponent's move, when the line can be replayed
    pub fn position_after_opponent(&self) -> Result<Position, BoardError> {
        let start = Position::from_fen(&self.fen)?;
        match self.opponent_move() {
            Some(token) => start.apply_move(token),
            None => Ok(start),
        }
    }
}

/// Incremental replay cursor over one game's moves.
///
/// Advancing forward reuses the current board; asking for an earlier ply
/// restarts from the initial position.
pub struct Replay<'a> {
    game: &'a GameRecord,
    start: Position,
    current: Position,
    ply: usize,
}

impl<'a> Replay<'a> {
    pub fn new(game: &'a GameRecord) -> Result<Self, BoardError> {
        let start = game.start_position()?;
        Ok(Self {
            game,
            current: start.clone(),
            start,
            ply: 0,
        })
    }

    /// Number of plies applied so far
    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn position(&self) -> &Position {
        &self.current
    }

    /// Apply moves until `ply` moves have been played.
    pub fn advance_to(&mut self, ply: usize) -> Result<&Position, BoardError> {
        if ply < self.ply {
            self.current = self.start.clone();
            self.ply = 0;
        }

        while self.ply < ply {
            let token = self.game.moves.get(self.ply).ok_or_else(|| {
                BoardError::UnresolvableMove {
                    token: String::new(),
                    reason: format!("game ends after {} plies", self.game.moves.len()),
                }
            })?;
            self.current = self.current.apply_move(token)?;
            self.ply += 1;
        }

        Ok(&self.current)
    }
}

pub fn reconstruct(
    game: &GameRecord,
    blunder: &BlunderRecord,
    options: &ReconstructOptions,
) -> Result<TacticRecord, BoardError> {
    let mut replay = Replay::new(game)?;
    reconstruct_with(&mut replay, blunder, options)
}

/// Reconstruct using an existing cursor, so several blunders from one game
/// share a single replay.
pub fn reconstruct_with(
    replay: &mut Replay<'_>,
    blunder: &BlunderRecord,
    options: &ReconstructOptions,
) -> Result<TacticRecord, BoardError> {
    let game = replay.game;
    let fen = replay.advance_to(blunder.ply_index)?.to_fen();

    let opponent_move = game.moves.get(blunder.ply_index).ok_or_else(|| {
        BoardError::UnresolvableMove {
            token: String::new(),
            reason: format!("no move at ply {}", blunder.ply_index),
        }
    })?;

    let mut moves = Vec::with_capacity(blunder.suggested_variation.len() + 1);
    moves.push(opponent_move.clone());
    moves.extend(blunder.suggested_variation.iter().cloned());

    let termination = game
        .analysis
        .get(blunder.ply_index)
        .and_then(|annotation| annotation.eval);

    if let Some(limit) = options.preview_plies {
        if !termination.is_some_and(Evaluation::is_mate) {
            moves.truncate(limit);
        }
    }

    let result = match blunder.player_color {
        Color::White => "1-0",
        Color::Black => "0-1",
    }
    .to_string();

    let pgn = tactic_pgn(&game.id, &fen, &moves, &result);

    Ok(TacticRecord {
        game_id: game.id.clone(),
        ply_index: blunder.ply_index,
        fen,
        moves,
        result,
        player_color: blunder.player_color,
        termination,
        pgn,
    })
}
