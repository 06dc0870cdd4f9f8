//! Board model: an 8x8 occupant grid parsed from a FEN-like string.
//!
//! The grid is stored in FEN order (row 0 = rank 8). Squares use chess
//! coordinates (file 0 = a, rank 0 = rank 1) and are mapped onto the grid
//! internally. A `Position` is never mutated once built; `apply_move`
//! produces the next one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shakmaty::{fen::Fen, san::SanPlus, CastlingMode, Chess, Role};

use crate::error::{BoardError, MalformedPosition};
use crate::san::{CastlingSide, MoveDescriptor};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Rank index (0 = rank 1) of this color's home rank
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Case-insensitive piece letter (`p n b r q k`)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// Material value in pawns. The king counts as zero.
    pub fn value(self) -> u8 {
        match self {
            PieceType::Pawn => 1,
            PieceType::Knight | PieceType::Bishop => 3,
            PieceType::Rook => 5,
            PieceType::Queen => 9,
            PieceType::King => 0,
        }
    }

    /// Is this a ray (sliding) piece type?
    pub fn is_ray_piece(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceType::Pawn => "pawn",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Rook => "rook",
            PieceType::Queen => "queen",
            PieceType::King => "king",
        }
    }

    fn from_role(role: Role) -> Self {
        match role {
            Role::Pawn => PieceType::Pawn,
            Role::Knight => PieceType::Knight,
            Role::Bishop => PieceType::Bishop,
            Role::Rook => PieceType::Rook,
            Role::Queen => PieceType::Queen,
            Role::King => PieceType::King,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    pub fn new(color: Color, kind: PieceType) -> Self {
        Self { color, kind }
    }

    /// Uppercase = white, lowercase = black
    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = PieceType::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self { color, kind })
    }

    pub fn to_fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.to_char().to_ascii_uppercase(),
            Color::Black => self.kind.to_char(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Build from algebraic characters, e.g. `('e', '4')`
    pub fn from_chars(file: char, rank: char) -> Option<Self> {
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Self {
            file: file as u8 - b'a',
            rank: rank as u8 - b'1',
        })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    fn row(self) -> usize {
        7 - self.rank as usize
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Square::from_chars(file, rank),
            _ => None,
        }
        .ok_or_else(|| BoardError::InvalidSquare(s.to_string()))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    /// Drop rights lost by a king move or by anything leaving/entering a rook corner
    fn revoke(&mut self, mover: Piece, from: Square, to: Square) {
        if mover.kind == PieceType::King {
            match mover.color {
                Color::White => {
                    self.white_kingside = false;
                    self.white_queenside = false;
                }
                Color::Black => {
                    self.black_kingside = false;
                    self.black_queenside = false;
                }
            }
        }
        for sq in [from, to] {
            match (sq.file, sq.rank) {
                (0, 0) => self.white_queenside = false,
                (7, 0) => self.white_kingside = false,
                (0, 7) => self.black_queenside = false,
                (7, 7) => self.black_kingside = false,
                _ => {}
            }
        }
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(4);
        if self.white_kingside {
            out.push('K');
        }
        if self.white_queenside {
            out.push('Q');
        }
        if self.black_kingside {
            out.push('k');
        }
        if self.black_queenside {
            out.push('q');
        }
        if out.is_empty() {
            out.push('-');
        }
        f.write_str(&out)
    }
}

impl FromStr for CastlingRights {
    type Err = MalformedPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rights = CastlingRights::default();
        if s == "-" {
            return Ok(rights);
        }
        for c in s.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => {
                    return Err(MalformedPosition::Field {
                        name: "castling",
                        value: s.to_string(),
                    })
                }
            }
        }
        Ok(rights)
    }
}

type Grid = [[Option<Piece>; 8]; 8];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    grid: Grid,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        let mut grid: Grid = [[None; 8]; 8];
        let back = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (file, kind) in back.into_iter().enumerate() {
            grid[0][file] = Some(Piece::new(Color::Black, kind));
            grid[1][file] = Some(Piece::new(Color::Black, PieceType::Pawn));
            grid[6][file] = Some(Piece::new(Color::White, PieceType::Pawn));
            grid[7][file] = Some(Piece::new(Color::White, kind));
        }
        Self {
            grid,
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl Position {
    /// Parse a FEN-like string. Only the board field is required; missing
    /// trailing fields default to `w - - 0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(MalformedPosition::Empty)?;
        let grid = parse_placement(placement)?;

        let side_to_move = match fields.next() {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(field_error("side to move", other)),
        };
        let castling = match fields.next() {
            None => CastlingRights::default(),
            Some(s) => s.parse()?,
        };
        let en_passant = match fields.next() {
            None | Some("-") => None,
            Some(s) => Some(
                s.parse::<Square>()
                    .map_err(|_| field_error("en passant", s))?,
            ),
        };
        let halfmove_clock = parse_counter(fields.next(), 0, "halfmove clock")?;
        let fullmove_number = parse_counter(fields.next(), 1, "fullmove number")?;

        let position = Self {
            grid,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        };
        position.check_kings()?;
        Ok(position)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.grid[square.row()][square.file as usize]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.squares()
            .find(|&sq| self.piece_at(sq) == Some(Piece::new(color, PieceType::King)))
    }

    /// All 64 squares, a1 to h8
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }

    /// The piece-placement field, e.g. `rnbqkbnr/pppppppp/8/...`
    pub fn board_fen(&self) -> String {
        let mut out = String::with_capacity(71);
        for (row, cells) in self.grid.iter().enumerate() {
            if row > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for cell in cells {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }

    pub fn to_fen(&self) -> String {
        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let en_passant = self
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            self.board_fen(),
            side,
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Advance by one ply.
    ///
    /// The origin square is resolved by the rules library; this model only
    /// relocates pieces and updates the bookkeeping fields. Tokens that do
    /// not resolve to exactly one origin/destination pair fail with
    /// `UnresolvableMove`.
    pub fn apply_move(&self, token: &str) -> Result<Self, BoardError> {
        let descriptor = MoveDescriptor::parse(token);
        let resolved = self.resolve(token, &descriptor)?;
        let (from, to) = (resolved.from, resolved.to);

        let mover = self
            .piece_at(from)
            .ok_or_else(|| BoardError::unresolvable(token, format!("no piece on {from}")))?;
        if mover.color != self.side_to_move {
            return Err(BoardError::unresolvable(
                token,
                format!("piece on {from} does not belong to {}", self.side_to_move),
            ));
        }
        let captured = self.piece_at(to);

        let mut next = self.clone();
        next.set(from, None);

        let mut is_capture = captured.is_some();
        if let Some(side) = descriptor.castle {
            let rank = mover.color.back_rank();
            let (rook_file, rook_dest_file) = match side {
                CastlingSide::Kingside => (7, 5),
                CastlingSide::Queenside => (0, 3),
            };
            let rook_from = Square { file: rook_file, rank };
            let rook = Piece::new(mover.color, PieceType::Rook);
            if next.piece_at(rook_from) != Some(rook) {
                return Err(BoardError::unresolvable(
                    token,
                    format!("no castling rook on {rook_from}"),
                ));
            }
            next.set(rook_from, None);
            next.set(Square { file: rook_dest_file, rank }, Some(rook));
            next.set(to, Some(mover));
        } else {
            if resolved.en_passant {
                // captured pawn sits beside the origin, on the destination file
                next.set(Square { file: to.file, rank: from.rank }, None);
                is_capture = true;
            }
            let placed = match resolved.promotion {
                Some(kind) => Piece::new(mover.color, kind),
                None => mover,
            };
            next.set(to, Some(placed));
        }

        next.castling.revoke(mover, from, to);
        next.en_passant = (mover.kind == PieceType::Pawn && from.rank.abs_diff(to.rank) == 2)
            .then(|| Square {
                file: from.file,
                rank: (from.rank + to.rank) / 2,
            });
        next.halfmove_clock = if mover.kind == PieceType::Pawn || is_capture {
            0
        } else {
            self.halfmove_clock + 1
        };
        if mover.color == Color::Black {
            next.fullmove_number += 1;
        }
        next.side_to_move = !self.side_to_move;
        Ok(next)
    }

    /// Ask the rules library which piece the token moves, then cross-check
    /// the answer against the token's own descriptor.
    fn resolve(&self, token: &str, descriptor: &MoveDescriptor) -> Result<ResolvedMove, BoardError> {
        let setup: Fen = self
            .to_fen()
            .parse()
            .map_err(|e| BoardError::unresolvable(token, format!("rules library rejected FEN: {e}")))?;
        let chess: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| BoardError::unresolvable(token, format!("illegal position: {e}")))?;
        let san: SanPlus = token
            .trim()
            .parse()
            .map_err(|e| BoardError::unresolvable(token, format!("not SAN: {e}")))?;
        let mv = san
            .san
            .to_move(&chess)
            .map_err(|e| BoardError::unresolvable(token, e.to_string()))?;

        let from = mv
            .from()
            .ok_or_else(|| BoardError::unresolvable(token, "move has no origin square"))?;
        let from = library_square(token, from)?;

        let to = match (mv.castling_side(), descriptor.castle) {
            (Some(_), Some(_)) => descriptor
                .king_destination(self.side_to_move)
                .ok_or_else(|| BoardError::unresolvable(token, "no king destination"))?,
            (None, None) => {
                let to = library_square(token, mv.to())?;
                if descriptor.destination != Some(to) {
                    return Err(BoardError::unresolvable(
                        token,
                        format!("destination does not match resolved square {to}"),
                    ));
                }
                to
            }
            _ => {
                return Err(BoardError::unresolvable(
                    token,
                    "castling notation disagrees with resolved move",
                ))
            }
        };

        let promotion = mv.promotion().map(PieceType::from_role);
        if promotion != descriptor.promotion {
            return Err(BoardError::unresolvable(token, "promotion piece is ambiguous"));
        }

        Ok(ResolvedMove {
            from,
            to,
            promotion,
            en_passant: mv.is_en_passant(),
        })
    }

    fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.grid[square.row()][square.file as usize] = piece;
    }

    fn check_kings(&self) -> Result<(), MalformedPosition> {
        for color in [Color::White, Color::Black] {
            let count = self
                .grid
                .iter()
                .flatten()
                .filter(|cell| **cell == Some(Piece::new(color, PieceType::King)))
                .count();
            if count != 1 {
                return Err(MalformedPosition::KingCount { color, count });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl FromStr for Position {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

struct ResolvedMove {
    from: Square,
    to: Square,
    promotion: Option<PieceType>,
    en_passant: bool,
}

fn library_square(token: &str, square: shakmaty::Square) -> Result<Square, BoardError> {
    square
        .to_string()
        .parse()
        .map_err(|_| BoardError::unresolvable(token, format!("unexpected square {square}")))
}

fn parse_placement(placement: &str) -> Result<Grid, MalformedPosition> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(MalformedPosition::RankCount(ranks.len()));
    }

    let mut grid: Grid = [[None; 8]; 8];
    for (row, rank_str) in ranks.iter().enumerate() {
        let rank = 8 - row;
        let mut file = 0usize;
        let mut prev_digit = false;
        for c in rank_str.chars() {
            match c {
                '1'..='8' => {
                    // "44" would not survive board_fen, which writes "8"
                    if prev_digit {
                        return Err(MalformedPosition::AdjacentDigits(rank));
                    }
                    prev_digit = true;
                    file += c as usize - '0' as usize;
                }
                _ => {
                    prev_digit = false;
                    let piece = Piece::from_fen_char(c).ok_or(MalformedPosition::UnknownPiece(c))?;
                    if file >= 8 {
                        return Err(MalformedPosition::RankLength {
                            rank,
                            files: file + 1,
                        });
                    }
                    grid[row][file] = Some(piece);
                    file += 1;
                }
            }
        }
        if file != 8 {
            return Err(MalformedPosition::RankLength { rank, files: file });
        }
    }
    Ok(grid)
}

fn parse_counter(field: Option<&str>, default: u32, name: &'static str) -> Result<u32, MalformedPosition> {
    match field {
        None => Ok(default),
        Some(s) => s.parse().map_err(|_| MalformedPosition::Field {
            name,
            value: s.to_string(),
        }),
    }
}

fn field_error(name: &'static str, value: &str) -> BoardError {
    MalformedPosition::Field {
        name,
        value: value.to_string(),
    }
    .into()
}
