use super::ScoreStore;
use crate::error::StoreResult;
use crate::score::ScoreRecord;

/// Score history kept in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    records: Vec<ScoreRecord>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }
}

impl ScoreStore for MemoryScoreStore {
    fn record(&mut self, score: &ScoreRecord) -> StoreResult<()> {
        self.records.push(score.clone());
        Ok(())
    }

    fn personal_best(&self) -> StoreResult<Option<ScoreRecord>> {
        let best = self.records.iter().fold(None::<&ScoreRecord>, |best, r| match best {
            Some(b) if b.wpm >= r.wpm => Some(b),
            _ => Some(r),
        });
        Ok(best.cloned())
    }

    fn recent(&self, n: usize) -> StoreResult<Vec<ScoreRecord>> {
        Ok(self.records.iter().rev().take(n).cloned().collect())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.records.len())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn score(wpm: u32, secs: i64, preview: &str) -> ScoreRecord {
        ScoreRecord {
            wpm,
            accuracy: 100,
            words_completed: 5,
            text_length: 5,
            timestamp: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs),
            text_preview: preview.to_string(),
        }
    }

    #[test]
    fn empty_store_has_no_best() {
        let store = MemoryScoreStore::new();
        assert_eq!(store.personal_best().unwrap(), None);
        assert!(store.recent(5).unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn personal_best_is_max_wpm() {
        let mut store = MemoryScoreStore::new();
        store.record(&score(80, 1, "a")).unwrap();
        store.record(&score(95, 2, "b")).unwrap();
        store.record(&score(60, 3, "c")).unwrap();

        assert_eq!(store.personal_best().unwrap().unwrap().text_preview, "b");
    }

    #[test]
    fn personal_best_tie_keeps_earliest() {
        let mut store = MemoryScoreStore::new();
        store.record(&score(70, 1, "first")).unwrap();
        store.record(&score(70, 2, "second")).unwrap();

        assert_eq!(
            store.personal_best().unwrap().unwrap().text_preview,
            "first"
        );
    }

    #[test]
    fn recent_is_most_recent_first_and_bounded() {
        let mut store = MemoryScoreStore::new();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            store.record(&score(50, i as i64, name)).unwrap();
        }

        let recent: Vec<String> = store
            .recent(3)
            .unwrap()
            .into_iter()
            .map(|r| r.text_preview)
            .collect();
        assert_eq!(recent, ["d", "c", "b"]);
        assert_eq!(store.recent(10).unwrap().len(), 4);
        assert!(store.recent(0).unwrap().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let mut store = MemoryScoreStore::new();
        store.record(&score(50, 1, "a")).unwrap();
        store.clear().unwrap();

        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.personal_best().unwrap(), None);
    }

    #[test]
    fn summary_collects_history() {
        let mut store = MemoryScoreStore::new();
        store.record(&score(80, 1, "a")).unwrap();
        store.record(&score(95, 2, "b")).unwrap();

        let summary = store.summary(1).unwrap();
        assert_eq!(summary.total_games_played, 2);
        assert_eq!(summary.recent_scores.len(), 1);
        assert_eq!(summary.personal_best.map(|s| s.wpm), Some(95));
    }
}
