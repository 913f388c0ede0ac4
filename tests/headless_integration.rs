use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use folio::app::{App, AppState, Flow};
use folio::clock::ManualClock;
use folio::passage::FixedPassage;
use folio::runtime::{AppEvent, Runner, TestEventSource};
use folio::store::MemoryScoreStore;

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn app(prompt: &str) -> App<ManualClock> {
    App::new(
        Box::new(MemoryScoreStore::new()),
        ManualClock::default(),
        Box::new(FixedPassage(prompt.to_string())),
        10,
    )
    .unwrap()
}

// Headless run through the runtime without a TTY: every keystroke is routed
// through the input field into the engine until the passage is done.
#[test]
fn headless_typing_flow_completes() {
    let mut app = app("the quick fox");

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        Duration::from_millis(5),
    );

    for c in "thequickfox".chars() {
        tx.send(key(c)).unwrap();
    }

    for _ in 0..100u32 {
        let event = runner.step();
        if matches!(event, AppEvent::Key(_)) {
            app.clock().advance_millis(100);
        }
        app.handle_event(event);
        if app.state == AppState::Results {
            break;
        }
    }

    assert_eq!(app.state, AppState::Results);
    let session = app.session();
    assert!(session.has_finished());
    assert_eq!(session.words_completed(), 3);

    // first keystroke at 100ms, last at 1100ms: 3 words in one second
    assert_eq!(session.wpm(), 180);
    assert_eq!(session.accuracy(), 100);
    assert_eq!(app.high_scores().total_games_played, 1);
}

#[test]
fn headless_typo_then_correction() {
    let mut app = app("cat dog");

    for c in "cx".chars() {
        app.handle_event(key(c));
    }
    assert_eq!(app.field(), "cx");
    assert_eq!(app.session().match_state(), folio::MatchState::Mismatched);

    let backspace = AppEvent::Key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
    assert_eq!(app.handle_event(backspace), Flow::Redraw);
    for c in "at".chars() {
        app.handle_event(key(c));
    }

    assert_eq!(app.session().current_index(), 1);
    assert_eq!(app.field(), "");
    assert_eq!(app.session().current_word(), Some("dog"));
}

#[test]
fn headless_paste_completes_word() {
    let mut app = app("hello world");
    app.handle_event(AppEvent::Paste("hello".into()));
    assert_eq!(app.session().current_index(), 1);
}

#[test]
fn ticks_only_redraw_a_running_session() {
    let mut app = app("hello");
    assert_eq!(app.handle_event(AppEvent::Tick), Flow::Continue);

    app.handle_event(key('h'));
    assert_eq!(app.handle_event(AppEvent::Tick), Flow::Redraw);

    app.handle_event(AppEvent::Paste("ello".into()));
    assert_eq!(app.state, AppState::Results);
    assert_eq!(app.handle_event(AppEvent::Tick), Flow::Continue);
}
