//! Serve command implementation.

use std::path::Path;

use conquest::runner::{GameRunner, RunnerConfig};
use conquest::{EngineConfig, FileMailbox, GameEngine};
use log::info;

use super::output::format_game_text;
use super::{CliError, OutputFormat, load_world, seed_or_clock};

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if the world is invalid or the mailbox fails.
pub(crate) fn execute(
    dir: &Path,
    world: Option<&Path>,
    seed: Option<u64>,
    max_turns: u32,
    format: OutputFormat,
) -> Result<(), CliError> {
    let world = load_world(world)?;
    let config = EngineConfig {
        seed: seed_or_clock(seed),
        ..EngineConfig::default()
    };
    let engine = GameEngine::new(world, config)?;

    let mailbox = FileMailbox::create(dir)?;
    info!("serving game (seed {}) under {}", config.seed, dir.display());

    let runner_config = RunnerConfig {
        max_turns,
        ..RunnerConfig::default()
    };
    let result = GameRunner::new(engine, mailbox, runner_config).run()?;

    match format {
        OutputFormat::Text => print!("{}", format_game_text(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}
