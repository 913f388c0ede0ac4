use thiserror::Error;

/// Errors raised while setting up a typing session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The source text yielded no words.
    #[error("passage contains no words")]
    InvalidPassage,
}

/// Errors surfaced by score persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A stored timestamp could not be parsed back into RFC 3339.
    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
