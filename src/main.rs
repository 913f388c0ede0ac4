mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use folio::{
    app::{App, Flow},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    passage::{FixedPassage, LiteratureCorpus, PassageProvider},
    runtime::{CrosstermEventSource, Runner},
    store::{export_csv, MemoryScoreStore, SqliteScoreStore},
    util::fit_width,
    HighScores, ScoreStore,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{File, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use time_humanize::{Accuracy, HumanTime, Tense};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 250;
const PREVIEW_COLUMNS: usize = 40;

/// minimal typing tui over literature passages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a literature passage word by word. Each word advances as soon as it matches; the finished run is scored in words per minute and kept in a local history with your personal best."
)]
pub struct Cli {
    /// custom passage to type instead of a random excerpt
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// print personal best and recent games, then exit
    #[clap(long)]
    scores: bool,

    /// delete the whole score history, then exit
    #[clap(long)]
    clear_scores: bool,

    /// write the score history as csv to this file, then exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// score database to use
    #[clap(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// config file to read
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config_store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = config_store.load();

    let db_path = cli.db.clone().or_else(|| config.resolved_db_path());

    if cli.scores || cli.clear_scores || cli.export.is_some() {
        let Some(path) = db_path else {
            return Err("no score database location available".into());
        };
        let mut store = SqliteScoreStore::open(path)?;
        return run_offline(&cli, &config, &mut store);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = open_store(db_path);
    let provider: Box<dyn PassageProvider> = match cli.prompt {
        Some(prompt) => Box::new(FixedPassage(prompt)),
        None => Box::new(LiteratureCorpus::with_extra(config.passages.clone())),
    };
    let mut app = match App::new(store, SystemClock, provider, config.recent_scores_limit) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e).exit();
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Logs go to a file so they never tear the alternate screen.
fn init_logging() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(log_path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = log_path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn open_store(db_path: Option<PathBuf>) -> Box<dyn ScoreStore> {
    match db_path.map(SqliteScoreStore::open) {
        Some(Ok(store)) => Box::new(store),
        Some(Err(e)) => {
            tracing::warn!("score database unavailable, keeping scores in memory: {e}");
            Box::new(MemoryScoreStore::new())
        }
        None => Box::new(MemoryScoreStore::new()),
    }
}

fn run_offline(
    cli: &Cli,
    config: &Config,
    store: &mut SqliteScoreStore,
) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &cli.export {
        let records = store.all()?;
        export_csv(&records, File::create(path)?)?;
        println!("exported {} scores to {}", records.len(), path.display());
    }

    if cli.clear_scores {
        store.clear()?;
        println!("cleared all scores");
    }

    if cli.scores {
        print!("{}", format_scores(&store.summary(config.recent_scores_limit)?));
    }

    Ok(())
}

fn format_scores(scores: &HighScores) -> String {
    if scores.is_empty() {
        return "No scores yet. Play a game to start tracking your progress!\n".to_string();
    }

    let mut out = String::new();
    if let Some(best) = &scores.personal_best {
        out.push_str(&format!(
            "Personal best: {} WPM ({} words, {})\n  \"{}\"\n",
            best.wpm,
            best.words_completed,
            humanize_age(best.timestamp),
            fit_width(&best.text_preview, PREVIEW_COLUMNS)
        ));
    }

    out.push_str(&format!(
        "Games played: {}\nAverage WPM: {}\nLast game: {} WPM\n",
        scores.total_games_played,
        scores.average_wpm(),
        scores.last_game().map_or(0, |s| s.wpm)
    ));

    out.push_str("\nRecent games\n");
    for score in &scores.recent_scores {
        let marker = if scores.is_personal_best(score) {
            "  BEST"
        } else {
            ""
        };
        out.push_str(&format!(
            "{:>4} WPM  {:>3} words  {:<width$}  {}{}\n",
            score.wpm,
            score.words_completed,
            fit_width(&score.text_preview, PREVIEW_COLUMNS),
            humanize_age(score.timestamp),
            marker,
            width = PREVIEW_COLUMNS
        ));
    }
    out
}

fn humanize_age(at: chrono::DateTime<chrono::Utc>) -> String {
    let age = (chrono::Utc::now() - at).to_std().unwrap_or_default();
    HumanTime::from(age).to_text_en(Accuracy::Rough, Tense::Past)
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<SystemClock>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| f.render_widget(ui::AppView(&*app), f.area()))?;

    loop {
        match app.handle_event(runner.step()) {
            Flow::Quit => break,
            Flow::Redraw => {
                terminal.draw(|f| f.render_widget(ui::AppView(&*app), f.area()))?;
            }
            Flow::Continue => {}
        }
    }

    Ok(())
}
