//! Tengen: a heuristic Go-playing bot.
//!
//! The decision core normally drives an external rules engine; this
//! binary wires it to the built-in simulation engine instead.
//!
//! ## Usage
//!
//! - `tengen` - Play a single demo game
//! - `tengen demo` - Same as above
//! - `tengen play --games 5 --size 9` - Run a full session

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tengen::config::BotConfig;
use tengen::orchestrator::{Orchestrator, SessionProgress};
use tengen::session::SessionManager;
use tengen::sim::SimEngine;
use tengen::status::LogSink;

/// Tengen: a heuristic Go move-decision engine
#[derive(Parser)]
#[command(name = "tengen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session of games against the built-in engine
    Play {
        /// Number of games to play
        #[arg(long)]
        games: Option<u32>,
        /// Board size (NxN)
        #[arg(long)]
        size: Option<usize>,
        /// Seed for the built-in opponent, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play one game and print the final board
    Demo,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::default(),
    };

    match cli.command {
        Some(Commands::Play { games, size, seed }) => {
            if let Some(games) = games {
                config.max_games = games;
            }
            if let Some(size) = size {
                config.board_size = size;
            }
            run_session(config, seed)
        }
        Some(Commands::Demo) | None => run_demo(config),
    }
}

fn run_session(config: BotConfig, seed: Option<u64>) -> anyhow::Result<()> {
    let engine = match seed {
        Some(seed) => SimEngine::with_seed(config.board_size, config.komi, seed),
        None => SimEngine::new(config.board_size, config.komi),
    };
    let mut manager = SessionManager::new(engine, config, LogSink)?;
    let summary = manager.run()?;
    println!(
        "session: {} wins / {} losses over {} games ({} aborted)",
        summary.wins, summary.losses, summary.games, summary.aborted
    );
    Ok(())
}

fn run_demo(config: BotConfig) -> anyhow::Result<()> {
    config.validate()?;
    let mut engine = SimEngine::new(config.board_size, config.komi);
    let mut orchestrator = Orchestrator::new(&config);
    let progress = SessionProgress {
        games_played: 0,
        games_total: 1,
    };
    let (outcome, session) = orchestrator.run_game(&mut engine, "demo", progress, &mut LogSink)?;
    println!("{}", engine.board());
    println!(
        "{:?} against {} after {} moves (score {:+.1})",
        outcome, session.opponent, session.move_count, session.score_diff
    );
    Ok(())
}
