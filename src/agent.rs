//! Agent side of the synchronization protocol.
//!
//! An [`Agent`] turns a state record into a command. An [`AgentClient`]
//! watches the player's state record, asks the agent for a command whenever a
//! new actionable state appears, and submits it with the next sequence number.

mod random;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::error::ProtocolError;
use crate::game::{Command, PlayerId, TurnState};
use crate::sync::{CommandRecord, Mailbox, StateRecord};

pub use random::RandomAgent;

/// Decision-making policy for one player.
pub trait Agent {
    /// Choose the next command. Only called in an actionable state
    /// (`mobilizing`, `attacking`, `conquering` or `fortifying`).
    fn decide(&mut self, state: &StateRecord) -> Command;
}

/// Polling behaviour of an [`AgentClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// Sleep between polls that found nothing new.
    pub poll_interval: Duration,
    /// Give up after this long without a new state. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2),
            idle_timeout: None,
        }
    }
}

/// Why [`AgentClient::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentExit {
    /// The game ended; the player's final state.
    Finished(TurnState),
    /// The stop flag was raised.
    Stopped,
    /// No new state arrived within the idle timeout.
    TimedOut,
}

/// The agent half of the protocol for one player.
#[derive(Debug)]
pub struct AgentClient<M> {
    player: PlayerId,
    mailbox: M,
    seen: u64,
    submitted: u64,
}

impl<M: Mailbox> AgentClient<M> {
    /// Attach to `player`'s records, continuing from whatever command count
    /// is already there.
    ///
    /// # Errors
    ///
    /// Fails if the command record exists but cannot be read.
    pub fn connect(player: PlayerId, mailbox: M) -> Result<Self, ProtocolError> {
        let submitted = mailbox
            .read_command(player)?
            .map_or(0, |record| record.count);
        Ok(Self {
            player,
            mailbox,
            seen: 0,
            submitted,
        })
    }

    /// Player this client acts for.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Commands submitted so far, counting any from before [`Self::connect`].
    #[must_use]
    pub const fn submitted(&self) -> u64 {
        self.submitted
    }

    /// Check for a new state and answer it if it is actionable.
    ///
    /// Returns the new state, or `None` if nothing changed.
    ///
    /// # Errors
    ///
    /// Fails on non-transient mailbox errors.
    pub fn poll<A: Agent + ?Sized>(
        &mut self,
        agent: &mut A,
    ) -> Result<Option<StateRecord>, ProtocolError> {
        let state = match self.mailbox.read_state(self.player) {
            Ok(Some(state)) if state.count > self.seen => state,
            Ok(_) => return Ok(None),
            Err(err) if err.is_transient() => {
                trace!("{}: re-reading state after {err}", self.player);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        self.seen = state.count;

        if matches!(state.state, TurnState::Waiting) || state.state.is_terminal() {
            return Ok(Some(state));
        }

        let command = agent.decide(&state);
        self.submitted += 1;
        debug!("{} #{}: {command}", self.player, self.submitted);
        self.mailbox
            .write_command(&CommandRecord::new(self.player, self.submitted, &command))?;
        Ok(Some(state))
    }

    /// Play until the game ends, `stop` is raised, or the idle timeout expires.
    ///
    /// # Errors
    ///
    /// Fails on non-transient mailbox errors.
    pub fn run<A: Agent + ?Sized>(
        &mut self,
        agent: &mut A,
        config: AgentConfig,
        stop: &AtomicBool,
    ) -> Result<AgentExit, ProtocolError> {
        let mut last_progress = Instant::now();
        loop {
            match self.poll(agent)? {
                Some(state) if state.state.is_terminal() => {
                    return Ok(AgentExit::Finished(state.state));
                }
                Some(_) => last_progress = Instant::now(),
                // A final state published just before the stop still counts.
                None if stop.load(Ordering::Relaxed) => return Ok(AgentExit::Stopped),
                None => {
                    if config
                        .idle_timeout
                        .is_some_and(|timeout| last_progress.elapsed() >= timeout)
                    {
                        return Ok(AgentExit::TimedOut);
                    }
                    thread::sleep(config.poll_interval);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{EngineConfig, GameEngine, World};
    use crate::sync::MemoryMailbox;

    struct Passer;

    impl Agent for Passer {
        fn decide(&mut self, _state: &StateRecord) -> Command {
            Command::PassTurn
        }
    }

    #[test]
    fn test_client_answers_each_state_once() {
        let engine = GameEngine::new(World::classic().unwrap(), EngineConfig::default()).unwrap();
        let player = engine.active();
        let mailbox = MemoryMailbox::with_initial_commands();
        let mut client = AgentClient::connect(player, mailbox.clone()).unwrap();

        assert!(client.poll(&mut Passer).unwrap().is_none());

        mailbox
            .write_state(player, &StateRecord::capture(&engine, player, 1))
            .unwrap();
        assert!(client.poll(&mut Passer).unwrap().is_some());
        assert!(client.poll(&mut Passer).unwrap().is_none());

        let record = mailbox.read_command(player).unwrap().unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.command.name, "pass_turn");
        assert_eq!(client.submitted(), 1);
    }

    #[test]
    fn test_waiting_player_does_not_submit() {
        let engine = GameEngine::new(World::classic().unwrap(), EngineConfig::default()).unwrap();
        let waiting = engine.active().opponent();
        let mailbox = MemoryMailbox::with_initial_commands();
        let mut client = AgentClient::connect(waiting, mailbox.clone()).unwrap();

        mailbox
            .write_state(waiting, &StateRecord::capture(&engine, waiting, 1))
            .unwrap();
        assert_eq!(
            client.poll(&mut Passer).unwrap().map(|s| s.state),
            Some(TurnState::Waiting)
        );
        assert_eq!(mailbox.read_command(waiting).unwrap().unwrap().count, 0);
    }

    #[test]
    fn test_run_stops_on_flag_and_timeout() {
        let mailbox = MemoryMailbox::with_initial_commands();
        let mut client = AgentClient::connect(PlayerId::One, mailbox).unwrap();
        let config = AgentConfig {
            poll_interval: Duration::from_millis(1),
            idle_timeout: Some(Duration::from_millis(20)),
        };

        let raised = AtomicBool::new(true);
        assert_eq!(client.run(&mut Passer, config, &raised).unwrap(), AgentExit::Stopped);

        let lowered = AtomicBool::new(false);
        assert_eq!(client.run(&mut Passer, config, &lowered).unwrap(), AgentExit::TimedOut);
    }
}
