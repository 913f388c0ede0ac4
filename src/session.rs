use crate::clock::Clock;
use crate::error::SessionError;
use crate::passage::Passage;
use crate::score::{compute_wpm, completion_ratio, ScoreRecord, COMPLETED_ACCURACY};
use crate::store::ScoreStore;
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;

/// Classification of the in-progress input against the target word
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum MatchState {
    Neutral,
    Matching,
    Mismatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    NotStarted,
    InProgress,
    Completed,
}

/// Outcome attached to a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub score: ScoreRecord,
    /// No earlier record existed, or this run beat it outright.
    pub new_personal_best: bool,
}

/// Snapshot of one typing attempt.
///
/// Transitions never mutate a state in place; [`TypingEngine::apply_input`]
/// returns the successor, so earlier snapshots stay inspectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    passage: Arc<Passage>,
    current_index: usize,
    input: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    completion: Option<Completion>,
}

impl SessionState {
    pub fn new(passage: Passage) -> Self {
        Self {
            passage: Arc::new(passage),
            current_index: 0,
            input: String::new(),
            started_at: None,
            completed_at: None,
            completion: None,
        }
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn words(&self) -> &[String] {
        self.passage.words()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Word being typed, `None` once the session is over
    pub fn current_word(&self) -> Option<&str> {
        self.passage.word(self.current_index)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn score(&self) -> Option<&ScoreRecord> {
        self.completion.as_ref().map(|c| &c.score)
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn words_completed(&self) -> usize {
        self.current_index
    }

    pub fn phase(&self) -> Phase {
        match (self.started_at, self.completed_at) {
            (_, Some(_)) => Phase::Completed,
            (Some(_), None) => Phase::InProgress,
            (None, None) => Phase::NotStarted,
        }
    }

    pub fn match_state(&self) -> MatchState {
        match self.current_word() {
            Some(_) if self.input.is_empty() => MatchState::Neutral,
            Some(target) if target.starts_with(self.input.as_str()) => MatchState::Matching,
            Some(_) => MatchState::Mismatched,
            None => MatchState::Neutral,
        }
    }

    /// 1-based position of the active word and the passage length
    pub fn progress(&self) -> (usize, usize) {
        let total = self.passage.len();
        ((self.current_index + 1).min(total), total)
    }

    /// Accuracy for display: the finalized value once complete, otherwise
    /// the share of words typed so far.
    pub fn accuracy(&self) -> u8 {
        match &self.completion {
            Some(c) => c.score.accuracy,
            None if self.current_index == 0 => 100,
            None => completion_ratio(self.current_index, self.passage.len()),
        }
    }

    pub fn wpm(&self) -> u32 {
        self.score().map_or(0, |s| s.wpm)
    }

    fn finalize(&self, completed_at: DateTime<Utc>) -> ScoreRecord {
        ScoreRecord {
            wpm: compute_wpm(self.current_index, self.started_at, completed_at),
            accuracy: COMPLETED_ACCURACY,
            words_completed: self.current_index,
            text_length: self.passage.len(),
            timestamp: completed_at,
            text_preview: self.passage.preview(),
        }
    }
}

/// Drives session transitions and hands finished runs to the score store.
///
/// The engine keeps no session state of its own.
#[derive(Debug)]
pub struct TypingEngine<S: ScoreStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: ScoreStore, C: Clock> TypingEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start a fresh session over `source`.
    pub fn select_passage(&self, source: &str) -> Result<SessionState, SessionError> {
        let passage = Passage::parse(source)?;
        tracing::debug!("selected passage of {} words", passage.len());
        Ok(SessionState::new(passage))
    }

    /// Feed the full current contents of the input field.
    ///
    /// A finished session ignores input and is returned unchanged.
    pub fn apply_input(&mut self, state: &SessionState, raw: &str) -> SessionState {
        if state.has_finished() {
            return state.clone();
        }

        let mut next = state.clone();
        let typed = raw.trim();
        // stored scores keep millisecond precision
        let now = self.clock.now().trunc_subsecs(3);

        if next.started_at.is_none() {
            next.started_at = Some(now);
        }

        if next.current_word() != Some(typed) {
            next.input = typed.to_string();
            return next;
        }

        next.current_index += 1;
        next.input.clear();

        if next.current_index < next.passage.len() {
            tracing::debug!(
                "word {}/{} completed",
                next.current_index,
                next.passage.len()
            );
            return next;
        }

        next.completed_at = Some(now);
        let score = next.finalize(now);
        let new_personal_best = self.is_new_personal_best(&score);

        if let Err(e) = self.store.record(&score) {
            tracing::error!("failed to record score: {e}");
        }

        tracing::info!(
            wpm = score.wpm,
            words = score.words_completed,
            new_personal_best,
            "session completed"
        );

        next.completion = Some(Completion {
            score,
            new_personal_best,
        });
        next
    }

    fn is_new_personal_best(&self, score: &ScoreRecord) -> bool {
        match self.store.personal_best() {
            Ok(best) => best.map_or(true, |b| score.wpm > b.wpm),
            Err(e) => {
                tracing::warn!("unable to read personal best: {e}");
                false
            }
        }
    }
}
