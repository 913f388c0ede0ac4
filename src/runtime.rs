use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Input consumed by the front-end loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    Tick,
}

/// Source of terminal events
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                // release/repeat events would double every keystroke on some terminals
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(CtEvent::Paste(text)) => AppEvent::Paste(text),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("terminal event stream failed: {e}");
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for headless tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the front end one event at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    tick_rate: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, tick_rate: Duration) -> Self {
        Self {
            event_source,
            tick_rate,
        }
    }

    /// Next event, or `Tick` if nothing arrives within the tick interval
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.tick_rate) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            Duration::from_millis(1),
        );

        assert_eq!(runner.step(), AppEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        tx.send(AppEvent::Key(key)).unwrap();
        tx.send(AppEvent::Paste("word".into())).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            Duration::from_millis(10),
        );

        assert_eq!(runner.step(), AppEvent::Key(key));
        assert_eq!(runner.step(), AppEvent::Paste("word".into()));
    }

    #[test]
    fn disconnected_source_ticks() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let runner = Runner::new(
            TestEventSource::new(rx),
            Duration::from_millis(1),
        );

        assert_eq!(runner.step(), AppEvent::Tick);
    }
}
