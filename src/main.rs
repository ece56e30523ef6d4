//! Goban-Relay: follow a Go game from board captures.
//!
//! ## Usage
//!
//! - `goban-relay replay <file>` - Feed text snapshots, print records as JSON lines
//! - `goban-relay simulate` - Track a random, lossily sampled game

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use goban_relay::config::Settings;
use goban_relay::relay::{JsonLinesPublisher, Relay};
use goban_relay::simulate::{random_game, sample};
use goban_relay::snapshot::parse_stream;

/// Goban-Relay: follow a Go game from periodic board captures
#[derive(Parser)]
#[command(name = "goban-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (JSON); defaults are used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed blank-line-separated snapshots from a file
    Replay {
        file: PathBuf,
        /// Chat-style variation request to apply after the replay (repeatable)
        #[arg(long = "variation")]
        variations: Vec<String>,
    },
    /// Play a random game, sample it with gaps and track the samples
    Simulate {
        #[arg(long, default_value_t = 120)]
        moves: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Largest number of moves between two samples
        #[arg(long, default_value_t = 2)]
        max_gap: usize,
        /// Print every published record as a JSON line
        #[arg(long)]
        emit: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Replay { file, variations } => replay(settings, file, &variations),
        Commands::Simulate {
            moves,
            seed,
            max_gap,
            emit,
        } => simulate(settings, moves, seed, max_gap, emit),
    }
}

fn replay(settings: Settings, file: PathBuf, variations: &[String]) -> Result<()> {
    let text = fs::read_to_string(&file)
        .with_context(|| format!("reading snapshots from {}", file.display()))?;
    let snapshots =
        parse_stream(&text).with_context(|| format!("parsing {}", file.display()))?;

    let relay = Relay::new(settings, JsonLinesPublisher::new(io::stdout()));
    let summary = relay.observe_all(&snapshots)?;
    info!(?summary, "replay finished");

    for request in variations {
        if relay.handle_chat(request, "cli")?.is_none() {
            info!(%request, "not a variation request");
        }
    }
    Ok(())
}

fn simulate(settings: Settings, moves: usize, seed: u64, max_gap: usize, emit: bool) -> Result<()> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let game = random_game(&mut rng, moves);
    let samples = sample(&mut rng, &game, max_gap);
    info!(moves = game.len(), samples = samples.len(), "simulated game");

    let out: Box<dyn io::Write> = if emit {
        Box::new(io::stdout())
    } else {
        Box::new(io::sink())
    };
    let relay = Relay::new(settings, JsonLinesPublisher::new(out));
    let summary = relay.observe_all(&samples)?;

    let (tracked, record) = relay.inspect(|g| (g.move_count(), g.sgf()))?;
    println!("moves played:  {}", game.len());
    println!("samples:       {}", summary.samples);
    println!("moves tracked: {}", summary.moves);
    println!("resyncs:       {}", summary.resyncs);
    println!("record moves:  {tracked}");
    println!("{record}");
    Ok(())
}
