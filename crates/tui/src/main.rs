mod app;
mod terminal;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::{prelude::*, EnvFilter};

use numconv_core::{
    config::{self, AppConfig},
    provider::{load_words, GameRegistry},
    scores::{ScoreStore, APP_DIR_NAME},
    Difficulty,
};

use crate::{app::QuizApp, terminal::TerminalConsole};

#[derive(Parser)]
#[command(
    name = "numconv",
    version,
    about = "Timed drills on binary, decimal and hexadecimal numbers"
)]
struct Cli {
    /// Keep the high-score file next to the executable
    #[arg(long)]
    debug: bool,

    /// High-score file to use instead of the default location
    #[arg(long)]
    score_file: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the difficulty prompt: novice|intermediate|expert|master (or n|i|e|m)
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Seed for reproducible questions
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config_path = match cli.config {
        Some(path) => path,
        None => config::ensure_default_config()?,
    };
    let mut config = AppConfig::load_from(&config_path)?;
    if cli.difficulty.is_some() {
        config.difficulty = cli.difficulty;
    }
    if cli.score_file.is_some() {
        config.score_file = cli.score_file;
    }

    let registry = GameRegistry::standard(load_words(config.words_file.as_deref()))?;
    let store = ScoreStore::new(config.score_path(cli.debug), registry.ids());
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut app = QuizApp::new(registry, store, config, TerminalConsole::new(), rng);
    app.run()
}

fn init_logging() -> Result<()> {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("numconv.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal is the game board, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
