//! smash - Bug Smasher on the command line
//!
//! Wires together:
//! - Configuration loading
//! - Store initialization
//! - Core engine
//! - One-shot subcommands and the interactive session

mod commands;
mod lookup;
mod render;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use smash_api::{Difficulty, EntityKind};
use smash_config::load_config_or_default;
use smash_core::{Engine, Feedback};
use smash_store::{SqliteStore, Store};
use smash_util::{default_config_path, SystemClock, DATABASE_FILENAME};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

/// smash - Smash your tasks before the bugs take over
#[derive(Parser, Debug)]
#[command(name = "smash", version)]
#[command(about = "Smash your tasks and habits before the bugs take over", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/smash/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set SMASH_DATA_DIR env var)
    #[arg(short, long, env = "SMASH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Rings the terminal bell on every smash; twice for a boss
struct TerminalBell;

impl Feedback for TerminalBell {
    fn smashed(&self, _kind: EntityKind, difficulty: Difficulty) {
        let bell = if difficulty == Difficulty::Boss { "\x07\x07" } else { "\x07" };
        let mut out = std::io::stdout();
        let _ = out.write_all(bell.as_bytes());
        let _ = out.flush();
    }
}

fn open_engine(args: &Args) -> Result<Engine> {
    let config = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    info!(
        config_path = %args.config.display(),
        undo_window_secs = config.rules.undo_window.as_secs(),
        reward_policy = ?config.rules.reward_policy,
        "Configuration loaded"
    );

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| config.service.data_dir.clone());

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(DATABASE_FILENAME);
    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );

    info!(db_path = %db_path.display(), "Store initialized");

    let engine = Engine::load(config.rules, store, Arc::new(SystemClock))
        .with_context(|| format!("Failed to load saved state from {:?}", db_path))?;

    Ok(engine.with_feedback(Arc::new(TerminalBell)))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so command output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "smash starting");

    if smash_util::is_mock_time_active() {
        warn!(
            now = %smash_util::format_datetime_full(&smash_util::now()),
            "Mock time is active"
        );
    }

    let mut engine = open_engine(&args)?;

    // Opening the app is when today's habits show up
    let spawned = engine.spawn_due_habits_today();
    if !spawned.is_empty() {
        render::events(&engine, &spawned);
    }

    match args.command {
        Command::Session => session::run(&mut engine),
        command => commands::execute(&mut engine, command),
    }
}
