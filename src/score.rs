use crate::util::mean;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Accuracy reported for a completed run. Errors are not tracked per keystroke.
pub const COMPLETED_ACCURACY: u8 = 100;

/// Finalized summary of one completed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub wpm: u32,
    pub accuracy: u8,
    pub words_completed: usize,
    pub text_length: usize,
    pub timestamp: DateTime<Utc>,
    pub text_preview: String,
}

impl ScoreRecord {
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Words per minute between `started_at` and `completed_at`, rounded.
///
/// Returns 0 when the session never started or no time elapsed.
pub fn compute_wpm(
    words_completed: usize,
    started_at: Option<DateTime<Utc>>,
    completed_at: DateTime<Utc>,
) -> u32 {
    let Some(started_at) = started_at else {
        return 0;
    };

    let elapsed_ms = (completed_at - started_at).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0;
    }

    let elapsed_minutes = elapsed_ms as f64 / 60_000.0;
    (words_completed as f64 / elapsed_minutes).round() as u32
}

/// Share of the passage typed so far, as a percentage in `[0, 100]`.
pub fn completion_ratio(words_completed: usize, text_length: usize) -> u8 {
    if text_length == 0 {
        return 0;
    }
    let ratio = words_completed.min(text_length) as f64 / text_length as f64;
    (ratio * 100.0).round() as u8
}

/// Personal best and recent history, as shown on the scores screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScores {
    pub personal_best: Option<ScoreRecord>,
    /// Most recent first
    pub recent_scores: Vec<ScoreRecord>,
    pub total_games_played: usize,
}

impl HighScores {
    /// Mean WPM over the recent games, rounded. 0 with no history.
    pub fn average_wpm(&self) -> u32 {
        let wpms: Vec<f64> = self.recent_scores.iter().map(|s| s.wpm as f64).collect();
        mean(&wpms).map_or(0, |avg| avg.round() as u32)
    }

    pub fn last_game(&self) -> Option<&ScoreRecord> {
        self.recent_scores.first()
    }

    /// The game played before the most recent one
    pub fn previous_game(&self) -> Option<&ScoreRecord> {
        self.recent_scores.get(1)
    }

    pub fn is_personal_best(&self, record: &ScoreRecord) -> bool {
        self.personal_best
            .as_ref()
            .is_some_and(|best| best.wpm == record.wpm)
    }

    pub fn is_empty(&self) -> bool {
        self.total_games_played == 0
    }
}
