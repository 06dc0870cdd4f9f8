//! PGN utilities: lightweight regex-based SAN tokenizer and tactic PGN rendering.

use std::sync::OnceLock;

use regex::Regex;

use crate::position::{Color, Position};

fn san_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O[+#]?|O-O[+#]?")
            .expect("SAN token pattern is valid")
    })
}

/// Extract SAN moves from movetext, dropping move numbers, comments and variations.
pub fn extract_moves(movetext: &str) -> Vec<String> {
    static STRIP: OnceLock<[Regex; 2]> = OnceLock::new();
    let [comments, variations] = STRIP.get_or_init(|| {
        [
            Regex::new(r"\{[^}]*\}").expect("comment pattern is valid"),
            Regex::new(r"\([^)]*\)").expect("variation pattern is valid"),
        ]
    });

    let no_comments = comments.replace_all(movetext, "");
    let no_variations = variations.replace_all(&no_comments, "");

    san_token_re()
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Render a tactic line as a standalone PGN starting from `fen`.
///
/// Move numbers follow the FEN's fullmove counter and side to move; an
/// unparseable FEN falls back to numbering from 1. with White to move.
pub fn tactic_pgn(game_id: &str, fen: &str, moves: &[String], result: &str) -> String {
    let (mut number, mut side) = Position::from_fen(fen)
        .map(|pos| (pos.fullmove_number(), pos.side_to_move()))
        .unwrap_or((1, Color::White));

    let mut movetext = String::new();
    for (i, mv) in moves.iter().enumerate() {
        if !movetext.is_empty() {
            movetext.push(' ');
        }
        match side {
            Color::White => movetext.push_str(&format!("{number}. ")),
            Color::Black if i == 0 => movetext.push_str(&format!("{number}... ")),
            Color::Black => {}
        }
        movetext.push_str(mv);
        if side == Color::Black {
            number += 1;
        }
        side = !side;
    }
    if !movetext.is_empty() {
        movetext.push(' ');
    }
    movetext.push_str(result);

    format!(
        "[Event \"Missed tactic\"]\n\
         [Site \"{game_id}\"]\n\
         [Result \"{result}\"]\n\
         [SetUp \"1\"]\n\
         [FEN \"{fen}\"]\n\
         \n\
         {movetext}\n"
    )
}
