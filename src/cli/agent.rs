//! Agent command implementation.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use conquest::agent::{AgentConfig, AgentExit};
use conquest::{AgentClient, FileMailbox, PlayerId, RandomAgent};

use super::{CliError, seed_or_clock};

/// Execute the agent command.
///
/// # Errors
///
/// Returns an error if the player number is invalid or the mailbox fails.
pub(crate) fn execute(
    dir: &Path,
    player: u8,
    seed: Option<u64>,
    idle_timeout: Option<u64>,
) -> Result<(), CliError> {
    let player = PlayerId::try_from(player).map_err(|e| CliError::new(e.to_string()))?;
    let mut agent = RandomAgent::new(seed_or_clock(seed));
    let mut client = AgentClient::connect(player, FileMailbox::new(dir))?;

    let config = AgentConfig {
        idle_timeout: idle_timeout.map(Duration::from_secs),
        ..AgentConfig::default()
    };
    let stop = AtomicBool::new(false);

    match client.run(&mut agent, config, &stop)? {
        AgentExit::Finished(state) => {
            println!("{player} finished as {state} after {} commands", client.submitted());
        }
        AgentExit::Stopped | AgentExit::TimedOut => {
            println!("{player} stopped waiting after {} commands", client.submitted());
        }
    }

    Ok(())
}
