//! Conquest CLI - run, serve and play conquest games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Conquest - a two-player territorial conquest engine
#[derive(Parser, Debug)]
#[command(name = "conquest")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info", global = true)]
    log_level: log::LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the engine against file-backed mailboxes in a directory
    Serve {
        /// Directory holding `Calls/` and `Logs/`
        #[arg(required = true)]
        dir: PathBuf,

        /// World definition (default: the built-in classic world)
        #[arg(short, long)]
        world: Option<PathBuf>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum turns (default: 150)
        #[arg(short = 't', long, default_value = "150")]
        max_turns: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Play one side with the random agent against file-backed mailboxes
    Agent {
        /// Directory holding `Calls/` and `Logs/`
        #[arg(required = true)]
        dir: PathBuf,

        /// Player number (1 or 2)
        #[arg(short, long)]
        player: u8,

        /// Agent seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Give up after this many seconds without a new state
        #[arg(long)]
        idle_timeout: Option<u64>,
    },

    /// Run many in-process games between random agents
    Selfplay {
        /// Number of games to run (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// World definition (default: the built-in classic world)
        #[arg(short, long)]
        world: Option<PathBuf>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum turns per game (default: 150)
        #[arg(short = 't', long, default_value = "150")]
        max_turns: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a world definition
    Validate {
        /// World definition file
        #[arg(required = true)]
        world: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp(None)
        .init();

    let result = match args.command {
        Commands::Serve {
            dir,
            world,
            seed,
            max_turns,
            format,
        } => cli::serve::execute(&dir, world.as_deref(), seed, max_turns, format),

        Commands::Agent {
            dir,
            player,
            seed,
            idle_timeout,
        } => cli::agent::execute(&dir, player, seed, idle_timeout),

        Commands::Selfplay {
            games,
            seed,
            world,
            threads,
            max_turns,
            format,
            progress,
        } => cli::selfplay::execute(&cli::selfplay::SelfplayOptions {
            games,
            seed,
            world,
            threads,
            max_turns,
            format,
            progress,
        }),

        Commands::Validate { world } => cli::validate::execute(&world),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
