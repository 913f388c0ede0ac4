// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod passage;
pub mod runtime;
pub mod score;
pub mod session;
pub mod store;
pub mod util;

pub use error::{SessionError, StoreError};
pub use score::{HighScores, ScoreRecord};
pub use session::{MatchState, Phase, SessionState, TypingEngine};
pub use store::ScoreStore;
