//! Game archive collaborators

pub mod lichess;

use std::future::Future;

use chess_core::GameRecord;

pub use lichess::{ArchiveError, LichessClient};

/// Source of a player's annotated historical games.
pub trait GameArchive {
    fn fetch_games(
        &self,
        identity: &str,
        max_games: usize,
    ) -> impl Future<Output = Result<Vec<GameRecord>, ArchiveError>> + Send;
}
