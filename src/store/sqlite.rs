use super::ScoreStore;
use crate::error::{StoreError, StoreResult};
use crate::score::ScoreRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS scores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        wpm INTEGER NOT NULL,
        accuracy INTEGER NOT NULL,
        words_completed INTEGER NOT NULL,
        text_length INTEGER NOT NULL,
        timestamp TEXT NOT NULL,
        text_preview TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_scores_wpm ON scores(wpm);
"#;

const SELECT_COLUMNS: &str =
    "SELECT wpm, accuracy, words_completed, text_length, timestamp, text_preview FROM scores";

/// Score history in a local SQLite database
#[derive(Debug)]
pub struct SqliteScoreStore {
    conn: Connection,
}

impl SqliteScoreStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        tracing::debug!("opened score database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Every record in insertion order
    pub fn all(&self) -> StoreResult<Vec<ScoreRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], read_row)?;
        collect_records(rows)
    }
}

/// Raw column values; conversion happens outside rusqlite's row closure.
type RawRow = (i64, i64, i64, i64, String, String);

fn read_row(row: &Row) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_record(raw: RawRow) -> StoreResult<ScoreRecord> {
    let (wpm, accuracy, words_completed, text_length, timestamp, text_preview) = raw;
    let parsed = DateTime::parse_from_rfc3339(&timestamp).map_err(|source| {
        StoreError::Timestamp {
            value: timestamp.clone(),
            source,
        }
    })?;

    Ok(ScoreRecord {
        wpm: u32::try_from(wpm).unwrap_or_default(),
        accuracy: u8::try_from(accuracy.clamp(0, 100)).unwrap_or_default(),
        words_completed: usize::try_from(words_completed).unwrap_or_default(),
        text_length: usize::try_from(text_length).unwrap_or_default(),
        timestamp: parsed.with_timezone(&Utc),
        text_preview,
    })
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn collect_records<I>(rows: I) -> StoreResult<Vec<ScoreRecord>>
where
    I: Iterator<Item = rusqlite::Result<RawRow>>,
{
    let mut records = Vec::new();
    for row in rows {
        records.push(into_record(row?)?);
    }
    Ok(records)
}

impl ScoreStore for SqliteScoreStore {
    fn record(&mut self, score: &ScoreRecord) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO scores
            (wpm, accuracy, words_completed, text_length, timestamp, text_preview)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                score.wpm,
                score.accuracy,
                to_i64(score.words_completed),
                to_i64(score.text_length),
                score.timestamp_iso(),
                score.text_preview,
            ],
        )?;
        Ok(())
    }

    fn personal_best(&self) -> StoreResult<Option<ScoreRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} ORDER BY wpm DESC, id ASC LIMIT 1"),
                [],
                read_row,
            )
            .optional()?;
        raw.map(into_record).transpose()
    }

    fn recent(&self, n: usize) -> StoreResult<Vec<ScoreRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"))?;
        let rows = stmt.query_map([to_i64(n)], read_row)?;
        collect_records(rows)
    }

    fn count(&self) -> StoreResult<usize> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))?;
        Ok(usize::try_from(total).unwrap_or_default())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM scores", [])?;
        Ok(())
    }
}
