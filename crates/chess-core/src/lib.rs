//! Board model, SAN move descriptors and annotated game records.

pub mod error;
pub mod game_data;
pub mod pgn;
pub mod position;
pub mod san;

pub use error::{BoardError, MalformedPosition};
pub use game_data::{Evaluation, GameRecord, Judgment, PlyAnnotation};
pub use position::{Color, Piece, PieceType, Position, Square, STANDARD_START_FEN};
pub use san::{CastlingSide, MoveDescriptor};
