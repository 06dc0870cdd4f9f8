use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::position::{Color, Position};

/// Engine score after a ply, from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Centipawns(i32),
    /// Signed distance to mate in moves (positive = White mates)
    Mate(i32),
}

impl Evaluation {
    pub fn is_mate(self) -> bool {
        matches!(self, Evaluation::Mate(_))
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{cp}"),
            Evaluation::Mate(n) => write!(f, "mate:{n}"),
        }
    }
}

/// Evaluator's move-quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgment {
    Inaccuracy,
    Mistake,
    /// The severe-swing label the blunder locator keys on
    Blunder,
}

impl Judgment {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Inaccuracy" => Some(Judgment::Inaccuracy),
            "Mistake" => Some(Judgment::Mistake),
            "Blunder" => Some(Judgment::Blunder),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyAnnotation {
    pub eval: Option<Evaluation>,
    pub judgment: Option<Judgment>,
    /// Evaluator's best line from the position before this ply (SAN, space separated)
    pub variation: Option<String>,
}

impl PlyAnnotation {
    pub fn is_blunder(&self) -> bool {
        self.judgment == Some(Judgment::Blunder)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub white: Option<String>,
    pub black: Option<String>,
    /// Set for games that did not start from the standard position
    pub initial_fen: Option<String>,
    pub moves: Vec<String>, // SAN notation
    pub analysis: Vec<PlyAnnotation>,
}

impl GameRecord {
    /// Which side `identity` played, matched case-insensitively
    pub fn player_color(&self, identity: &str) -> Option<Color> {
        let matches = |name: &Option<String>| {
            name.as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(identity))
        };
        if matches(&self.white) {
            Some(Color::White)
        } else if matches(&self.black) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_annotated(&self) -> bool {
        !self.analysis.is_empty()
    }

    pub fn start_position(&self) -> Result<Position, BoardError> {
        match &self.initial_fen {
            Some(fen) => Position::from_fen(fen),
            None => Ok(Position::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_color_is_case_insensitive() {
        let game = GameRecord {
            id: "abc".into(),
            white: Some("Magnus".into()),
            black: Some("hikaru".into()),
            ..Default::default()
        };
        assert_eq!(game.player_color("magnus"), Some(Color::White));
        assert_eq!(game.player_color("HIKARU"), Some(Color::Black));
        assert_eq!(game.player_color("someone"), None);
    }

    #[test]
    fn test_start_position() {
        let game = GameRecord::default();
        assert_eq!(game.start_position().unwrap(), Position::default());

        let game = GameRecord {
            initial_fen: Some("4k3/8/8/8/8/8/8/4K2K w - - 0 1".into()),
            ..Default::default()
        };
        assert!(matches!(game.start_position(), Err(BoardError::MalformedPosition(_))));
    }

    #[test]
    fn test_evaluation_display() {
        assert_eq!(Evaluation::Centipawns(-142).to_string(), "-142");
        assert_eq!(Evaluation::Mate(3).to_string(), "mate:3");
        assert!(Evaluation::Mate(-1).is_mate());
        assert_eq!(Judgment::from_name("Blunder"), Some(Judgment::Blunder));
        assert_eq!(Judgment::from_name("Good"), None);
    }
}
