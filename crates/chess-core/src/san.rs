//! Move descriptor parsing for single SAN tokens.
//!
//! Parsing never fails: malformed tokens yield a descriptor with empty
//! optional fields, and downstream consumers treat the missing detail as
//! lower confidence.

use serde::{Deserialize, Serialize};

use crate::position::{Color, PieceType, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub piece: PieceType,
    pub origin_file: Option<u8>,
    pub origin_rank: Option<u8>,
    /// `None` for castling (see `king_destination`) and unparseable tokens
    pub destination: Option<Square>,
    pub castle: Option<CastlingSide>,
    pub is_capture: bool,
    pub is_check: bool,
    pub is_mate: bool,
    pub promotion: Option<PieceType>,
}

impl MoveDescriptor {
    pub fn parse(token: &str) -> Self {
        let mut body = token.trim();
        let mut is_check = false;
        let mut is_mate = false;

        // Check/mate suffixes and annotation glyphs, in any order
        while let Some(last) = body.chars().last() {
            match last {
                '#' => {
                    is_mate = true;
                    is_check = true;
                }
                '+' => is_check = true,
                '!' | '?' => {}
                _ => break,
            }
            body = &body[..body.len() - 1];
        }

        let mut descriptor = Self {
            piece: PieceType::Pawn,
            origin_file: None,
            origin_rank: None,
            destination: None,
            castle: None,
            is_capture: body.contains('x'),
            is_check,
            is_mate,
            promotion: None,
        };

        let castle = match body {
            "O-O" | "0-0" => Some(CastlingSide::Kingside),
            "O-O-O" | "0-0-0" => Some(CastlingSide::Queenside),
            _ => None,
        };
        if castle.is_some() {
            descriptor.piece = PieceType::King;
            descriptor.castle = castle;
            return descriptor;
        }

        let (body, promotion) = split_promotion(body);
        descriptor.promotion = promotion;

        let chars: Vec<char> = body.chars().filter(|&c| c != 'x').collect();
        let split = chars.len().saturating_sub(2);
        let destination = match &chars[split..] {
            [file, rank] => Square::from_chars(*file, *rank),
            _ => None,
        };
        descriptor.destination = destination;
        let prefix = if destination.is_some() {
            &chars[..split]
        } else {
            &chars[..]
        };

        let mut rest = prefix;
        if let Some((&first, tail)) = prefix.split_first() {
            if let Some(piece) = piece_letter(first) {
                descriptor.piece = piece;
                rest = tail;
            }
        }
        for &c in rest {
            match c {
                'a'..='h' => descriptor.origin_file = Some(c as u8 - b'a'),
                '1'..='8' => descriptor.origin_rank = Some(c as u8 - b'1'),
                _ => {}
            }
        }

        descriptor
    }

    /// Fixed king target for castling tokens, on the mover's back rank
    pub fn king_destination(&self, color: Color) -> Option<Square> {
        let file = match self.castle? {
            CastlingSide::Kingside => 6,
            CastlingSide::Queenside => 2,
        };
        Square::new(file, color.back_rank())
    }

    /// Destination square, resolving castling for the given mover color
    pub fn destination_for(&self, color: Color) -> Option<Square> {
        self.destination.or_else(|| self.king_destination(color))
    }

    pub fn is_quiet(&self) -> bool {
        !self.is_capture && !self.is_check && !self.is_mate
    }
}

/// Uppercase SAN piece letters only; lowercase letters are files.
fn piece_letter(c: char) -> Option<PieceType> {
    match c {
        'N' => Some(PieceType::Knight),
        'B' => Some(PieceType::Bishop),
        'R' => Some(PieceType::Rook),
        'Q' => Some(PieceType::Queen),
        'K' => Some(PieceType::King),
        _ => None,
    }
}

/// Split `e8=Q` or `e8Q` into body and promotion piece.
fn split_promotion(body: &str) -> (&str, Option<PieceType>) {
    if let Some((head, promo)) = body.split_once('=') {
        let piece = promo.chars().next().and_then(piece_letter);
        return (head, piece);
    }
    let mut chars = body.chars().rev();
    if let (Some(last), Some(prev)) = (chars.next(), chars.next()) {
        if prev.is_ascii_digit() && last != 'K' {
            if let Some(piece) = piece_letter(last) {
                return (&body[..body.len() - 1], Some(piece));
            }
        }
    }
    (body, None)
}
