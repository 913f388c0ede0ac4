use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::clock::Clock;
use crate::error::{SessionError, StoreResult};
use crate::passage::PassageProvider;
use crate::runtime::AppEvent;
use crate::score::HighScores;
use crate::session::{SessionState, TypingEngine};
use crate::store::ScoreStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// What the event loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Redraw,
    Quit,
}

/// Presentation state: the input field, the active session and cached scores
pub struct App<C: Clock> {
    engine: TypingEngine<Box<dyn ScoreStore>, C>,
    provider: Box<dyn PassageProvider>,
    session: SessionState,
    field: String,
    high_scores: HighScores,
    recent_limit: usize,
    pub state: AppState,
}

impl<C: Clock> App<C> {
    pub fn new(
        store: Box<dyn ScoreStore>,
        clock: C,
        mut provider: Box<dyn PassageProvider>,
        recent_limit: usize,
    ) -> Result<Self, SessionError> {
        let engine = TypingEngine::new(store, clock);
        let session = engine.select_passage(&provider.next_passage())?;

        let mut app = Self {
            engine,
            provider,
            session,
            field: String::new(),
            high_scores: HighScores::default(),
            recent_limit,
            state: AppState::Typing,
        };
        app.refresh_high_scores();
        Ok(app)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Text currently shown in the input field
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn clock(&self) -> &C {
        self.engine.clock()
    }

    /// Whole seconds since the first keystroke; frozen once the run is over
    pub fn elapsed_secs(&self) -> u64 {
        let Some(started_at) = self.session.started_at() else {
            return 0;
        };
        let end = self
            .session
            .completed_at()
            .unwrap_or_else(|| self.engine.clock().now());
        u64::try_from((end - started_at).num_seconds()).unwrap_or_default()
    }

    pub fn type_char(&mut self, c: char) {
        self.field.push(c);
        self.submit();
    }

    pub fn paste(&mut self, text: &str) {
        self.field.push_str(text);
        self.submit();
    }

    pub fn backspace(&mut self) {
        if self.field.pop().is_some() {
            self.submit();
        }
    }

    /// Route the whole field through the engine, mirroring its trimmed input back.
    fn submit(&mut self) {
        if self.state != AppState::Typing {
            return;
        }

        let next = self.engine.apply_input(&self.session, &self.field);
        self.field = next.input().to_string();
        self.session = next;

        if self.session.has_finished() {
            self.refresh_high_scores();
            self.state = AppState::Results;
        }
    }

    /// Abandon the current run and start one over a new passage.
    pub fn new_game(&mut self) -> Result<(), SessionError> {
        let source = self.provider.next_passage();
        self.start(&source)
    }

    /// Abandon the current run and type the same passage again.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        let source = self.session.passage().text();
        self.start(&source)
    }

    fn start(&mut self, source: &str) -> Result<(), SessionError> {
        self.session = self.engine.select_passage(source)?;
        self.field.clear();
        self.state = AppState::Typing;
        Ok(())
    }

    pub fn clear_scores(&mut self) -> StoreResult<()> {
        self.engine.store_mut().clear()?;
        self.high_scores = HighScores::default();
        Ok(())
    }

    fn refresh_high_scores(&mut self) {
        match self.engine.store().summary(self.recent_limit) {
            Ok(scores) => self.high_scores = scores,
            Err(e) => tracing::warn!("unable to load score history: {e}"),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Paste(text) => {
                self.paste(&text);
                Flow::Redraw
            }
            AppEvent::Resize => Flow::Redraw,
            AppEvent::Tick if self.state == AppState::Typing && self.session.has_started() => {
                Flow::Redraw
            }
            AppEvent::Tick => Flow::Continue,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        let switched = match (self.state, key.code) {
            (AppState::Typing, KeyCode::Char(c))
                if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() =>
            {
                self.type_char(c);
                Ok(())
            }
            (AppState::Typing, KeyCode::Backspace) => {
                self.backspace();
                Ok(())
            }
            (_, KeyCode::Left) | (AppState::Results, KeyCode::Char('r')) => self.restart(),
            (_, KeyCode::Right) | (AppState::Results, KeyCode::Char('n') | KeyCode::Enter) => {
                self.new_game()
            }
            _ => return Flow::Continue,
        };

        if let Err(e) = switched {
            tracing::warn!("unable to start a new session: {e}");
        }
        Flow::Redraw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::passage::FixedPassage;
    use crate::store::MemoryScoreStore;

    fn app(text: &str) -> App<ManualClock> {
        App::new(
            Box::new(MemoryScoreStore::new()),
            ManualClock::default(),
            Box::new(FixedPassage(text.to_string())),
            10,
        )
        .unwrap()
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn blank_passage_is_rejected() {
        let result = App::new(
            Box::new(MemoryScoreStore::new()),
            ManualClock::default(),
            Box::new(FixedPassage(" ".to_string())),
            10,
        );
        assert!(matches!(result, Err(SessionError::InvalidPassage)));
    }

    #[test]
    fn field_clears_after_each_word() {
        let mut app = app("ab cd");
        app.type_char('a');
        assert_eq!(app.field(), "a");
        app.type_char('b');
        assert_eq!(app.field(), "");
        assert_eq!(app.session().current_index(), 1);
    }

    #[test]
    fn leading_space_is_dropped() {
        let mut app = app("ab cd");
        app.type_char(' ');
        assert_eq!(app.field(), "");
        assert!(app.session().has_started());
    }

    #[test]
    fn backspace_recovers_from_mismatch() {
        let mut app = app("cat");
        app.type_char('c');
        app.type_char('x');
        assert_eq!(
            app.session().match_state(),
            crate::session::MatchState::Mismatched
        );
        app.backspace();
        assert_eq!(app.field(), "c");
        assert_eq!(
            app.session().match_state(),
            crate::session::MatchState::Matching
        );
    }

    #[test]
    fn finishing_switches_to_results_and_refreshes_scores() {
        let mut app = app("hi");
        app.type_char('h');
        app.clock().advance_millis(1000);
        app.type_char('i');

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.high_scores().total_games_played, 1);
        assert_eq!(app.high_scores().personal_best.as_ref().map(|s| s.wpm), Some(60));
        assert_eq!(app.elapsed_secs(), 1);
    }

    #[test]
    fn results_keys_restart_and_quit() {
        let mut app = app("go");
        app.paste("go");
        assert_eq!(app.state, AppState::Results);

        // typing on the results screen does nothing
        assert_eq!(app.handle_event(key(KeyCode::Char('x'))), Flow::Continue);

        assert_eq!(app.handle_event(key(KeyCode::Char('r'))), Flow::Redraw);
        assert_eq!(app.state, AppState::Typing);
        assert!(!app.session().has_started());

        assert_eq!(app.handle_event(key(KeyCode::Esc)), Flow::Quit);
    }

    #[test]
    fn abandoning_a_run_records_nothing() {
        let mut app = app("one two");
        app.paste("one");
        assert_eq!(app.handle_event(key(KeyCode::Right)), Flow::Redraw);
        assert_eq!(app.session().current_index(), 0);
        assert_eq!(app.high_scores().total_games_played, 0);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = app("one");
        let ev = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(ev), Flow::Quit);
    }

    #[test]
    fn modified_chars_are_not_typed() {
        let mut app = app("Wo");
        let ctrl_w = AppEvent::Key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        let alt_x = AppEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        assert_eq!(app.handle_event(ctrl_w), Flow::Continue);
        assert_eq!(app.handle_event(alt_x), Flow::Continue);
        assert_eq!(app.field(), "");
        assert!(!app.session().has_started());

        let shift_w = AppEvent::Key(KeyEvent::new(KeyCode::Char('W'), KeyModifiers::SHIFT));
        assert_eq!(app.handle_event(shift_w), Flow::Redraw);
        assert_eq!(app.field(), "W");
    }

    #[test]
    fn clear_scores_resets_summary() {
        let mut app = app("x");
        app.type_char('x');
        assert_eq!(app.high_scores().total_games_played, 1);
        app.clear_scores().unwrap();
        assert!(app.high_scores().is_empty());
    }
}
