pub mod export;
pub mod memory;
pub mod sqlite;

pub use export::export_csv;
pub use memory::MemoryScoreStore;
pub use sqlite::SqliteScoreStore;

use crate::error::StoreResult;
use crate::score::{HighScores, ScoreRecord};

/// Persistence for finalized score records.
///
/// Records are append-only and keep insertion order.
pub trait ScoreStore {
    fn record(&mut self, score: &ScoreRecord) -> StoreResult<()>;

    /// Record with the highest WPM. The earliest one wins a tie.
    fn personal_best(&self) -> StoreResult<Option<ScoreRecord>>;

    /// Up to `n` records, most recent first
    fn recent(&self, n: usize) -> StoreResult<Vec<ScoreRecord>>;

    /// Total number of records ever kept
    fn count(&self) -> StoreResult<usize>;

    /// Delete every record. Irreversible.
    fn clear(&mut self) -> StoreResult<()>;

    fn summary(&self, recent_limit: usize) -> StoreResult<HighScores> {
        Ok(HighScores {
            personal_best: self.personal_best()?,
            recent_scores: self.recent(recent_limit)?,
            total_games_played: self.count()?,
        })
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn record(&mut self, score: &ScoreRecord) -> StoreResult<()> {
        (**self).record(score)
    }

    fn personal_best(&self) -> StoreResult<Option<ScoreRecord>> {
        (**self).personal_best()
    }

    fn recent(&self, n: usize) -> StoreResult<Vec<ScoreRecord>> {
        (**self).recent(n)
    }

    fn count(&self) -> StoreResult<usize> {
        (**self).count()
    }

    fn clear(&mut self) -> StoreResult<()> {
        (**self).clear()
    }
}
