//! Self-play command implementation.

use std::path::PathBuf;
use std::time::Instant;

use conquest::error::RunError;
use conquest::runner::{RunnerConfig, play_local};
use conquest::{EngineConfig, GameEngine, GameResult, RandomAgent, World};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use rayon::prelude::*;

use super::output::{JsonSelfplayResult, SelfplayStats, format_selfplay_text};
use super::{CliError, OutputFormat, load_world, seed_or_clock};

/// Options of the self-play command.
#[derive(Debug)]
pub(crate) struct SelfplayOptions {
    /// Number of games.
    pub(crate) games: u64,
    /// Seed of the first game.
    pub(crate) seed: Option<u64>,
    /// World definition path.
    pub(crate) world: Option<PathBuf>,
    /// Thread pool size.
    pub(crate) threads: Option<usize>,
    /// Turn bound per game.
    pub(crate) max_turns: u32,
    /// Output format.
    pub(crate) format: OutputFormat,
    /// Whether to draw a progress bar.
    pub(crate) progress: bool,
}

/// Play one game between two random agents seeded from `seed`.
fn play_one(world: &World, seed: u64, config: RunnerConfig) -> Result<GameResult, RunError> {
    let engine_config = EngineConfig {
        seed,
        ..EngineConfig::default()
    };
    let engine = GameEngine::new(world.clone(), engine_config)?;
    let mut one = RandomAgent::new(seed.wrapping_mul(2));
    let mut two = RandomAgent::new(seed.wrapping_mul(2).wrapping_add(1));
    play_local(engine, &mut [&mut one, &mut two], config)
}

/// Execute the self-play command.
///
/// # Errors
///
/// Returns an error if the world is invalid or output fails.
pub(crate) fn execute(options: &SelfplayOptions) -> Result<(), CliError> {
    let world = load_world(options.world.as_deref())?;

    // Set thread pool size if specified
    if let Some(num_threads) = options.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed_or_clock(options.seed);
    let config = RunnerConfig {
        max_turns: options.max_turns,
        ..RunnerConfig::default()
    };

    let pb = if options.progress {
        let pb = ProgressBar::new(options.games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates its own stats; they are merged at the end
    let stats = (0..options.games)
        .into_par_iter()
        .fold(SelfplayStats::default, |mut local, i| {
            let game_seed = base_seed.wrapping_add(i);
            match play_one(&world, game_seed, config) {
                Ok(result) => local.add_result(&result),
                Err(e) => {
                    warn!("game with seed {game_seed} abandoned: {e}");
                    local.add_stalled();
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(SelfplayStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    match options.format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_selfplay_text(&stats));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonSelfplayResult::from_stats(&stats))?;
            println!("{json}");
        }
    }

    Ok(())
}
