use crate::error::StoreResult;
use crate::score::ScoreRecord;
use std::io::Write;

const HEADER: [&str; 6] = [
    "wpm",
    "accuracy",
    "wordsCompleted",
    "textLength",
    "timestamp",
    "textPreview",
];

/// Write `records` as CSV with a header row, even when there are none.
pub fn export_csv<W: Write>(records: &[ScoreRecord], writer: W) -> StoreResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn writes_header_and_rows() {
        let records = vec![ScoreRecord {
            wpm: 90,
            accuracy: 100,
            words_completed: 3,
            text_length: 3,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            text_preview: "the quick fox...".to_string(),
        }];

        let mut out = Vec::new();
        export_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("wpm,accuracy,wordsCompleted,textLength,timestamp,textPreview")
        );
        assert_eq!(
            lines.next(),
            Some("90,100,3,3,1970-01-01T00:00:00Z,the quick fox...")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_history_writes_header_only() {
        let mut out = Vec::new();
        export_csv(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "wpm,accuracy,wordsCompleted,textLength,timestamp,textPreview\n"
        );
    }
}
