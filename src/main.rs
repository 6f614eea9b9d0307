mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use directories::ProjectDirs;
use keyrank::{
    app::{App, Flow},
    config::{Config, ConfigStore, FileConfigStore},
    rank::RANKS,
    runtime::{CrosstermEventSource, Runner},
    texts::{Difficulty, TextCorpus},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{debug, error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::ui::AppView;

/// How long the event loop waits before redrawing without input
const POLL_INTERVAL_MS: u64 = 250;

/// typing practice with live metrics, xp levels, ranks and achievements
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice typing against sample texts. Every finished test earns XP, levels you up through the ranks, and counts towards achievements and daily challenges."
)]
pub struct Cli {
    /// difficulty of the sample texts (defaults to the saved config)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// custom text to type instead of a sample
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// milliseconds between live wpm refreshes
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    /// persist the given difficulty and tick rate as the new defaults
    #[clap(long)]
    save_config: bool,

    /// print a sample text for the chosen difficulty and exit
    #[clap(long)]
    print_text: bool,

    /// print the rank table and exit
    #[clap(long)]
    ranks: bool,
}

impl Cli {
    /// Command line values take precedence over the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty.to_string();
        }
        if let Some(tick_rate_ms) = self.tick_rate_ms {
            config.tick_rate_ms = tick_rate_ms;
        }
        config
    }
}

fn log_dir() -> PathBuf {
    ProjectDirs::from("", "", "keyrank")
        .map(|pd| pd.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn setup_logging() {
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir(), "keyrank.log");

    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .init();

    debug!("Logging initialized");
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.ranks {
        for rank in RANKS {
            println!("{:>3}  {} {:<12} {}", rank.min_level, rank.icon, rank.name, rank.color);
        }
        return Ok(());
    }

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    let corpus = TextCorpus::embedded()?;

    if cli.print_text {
        println!("{}", corpus.select_random(config.difficulty())?);
        return Ok(());
    }

    setup_logging();
    info!("Starting keyrank");

    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "Config saved");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let events = CrosstermEventSource::new();
    let runner = Runner::new(events, Duration::from_millis(POLL_INTERVAL_MS));
    let mut app = App::new(config, corpus, cli.prompt.clone(), runner.sender())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!("Application error: {}", e);
    }
    info!(
        tests = app.progress().total_tests,
        level = app.progress().level(),
        "Exiting"
    );
    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(AppView(app), f.area()))?;

        let Some(event) = runner.step() else {
            continue;
        };
        if app.handle_event(event)? == Flow::Quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from(["keyrank", "-d", "advanced", "--tick-rate-ms", "50"]);
        let config = cli.apply_to(Config::default());

        assert_eq!(config.difficulty(), Difficulty::Advanced);
        assert_eq!(config.tick_rate_ms, 50);
    }

    #[test]
    fn config_kept_without_flags() {
        let cli = Cli::parse_from(["keyrank"]);
        let stored = Config {
            difficulty: "intermediate".into(),
            tick_rate_ms: 200,
        };
        assert_eq!(cli.apply_to(stored.clone()), stored);
    }

    #[test]
    fn unknown_difficulty_flag_is_rejected() {
        assert!(Cli::try_parse_from(["keyrank", "-d", "expert"]).is_err());
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
