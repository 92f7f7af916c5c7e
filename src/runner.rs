//! Game runners: drive an engine to completion.
//!
//! Provides two entry points:
//! - [`GameRunner`]: the engine half of the mailbox protocol, for agents that
//!   live in other threads or processes
//! - [`play_local`]: an in-process loop that asks agents directly, for
//!   self-play and benchmarks
//!
//! Both stop when a player wins or after `max_turns` hand-overs.

use std::thread;
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::agent::Agent;
use crate::error::{CommandError, ProtocolError, RunError};
use crate::game::{Command, GameEngine, Outcome, PlayerId};
use crate::sync::{Mailbox, Session, StateRecord};

/// Turn bound after which a game is a draw.
pub const DEFAULT_MAX_TURNS: u32 = 150;

/// Consecutive rejected commands after which a local game is abandoned.
const STALL_LIMIT: u32 = 10_000;

/// Configuration for a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Hand-overs after which the game ends without a winner.
    pub max_turns: u32,
    /// Sleep between polls that found no new command.
    pub poll_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            poll_interval: Duration::from_millis(2),
        }
    }
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// The winning player (None if the turn bound was reached).
    pub winner: Option<PlayerId>,
    /// Hand-overs played.
    pub turns_played: u32,
    /// Commands consumed per player, rejected ones included.
    pub actions: [u64; 2],
    /// Commands rejected over the whole game.
    pub rejected: u64,
    /// Troops on the board per player at the end.
    pub final_troops: [u32; 2],
    /// Territories owned per player at the end.
    pub final_territories: [usize; 2],
    /// The seed used for this game.
    pub seed: u64,
}

impl GameResult {
    fn from_engine(engine: &GameEngine, actions: [u64; 2], rejected: u64) -> Self {
        Self {
            winner: engine.winner(),
            turns_played: engine.turn(),
            actions,
            rejected,
            final_troops: PlayerId::ALL.map(|p| engine.player(p).total_troops),
            final_territories: PlayerId::ALL.map(|p| engine.world().owned_count(p)),
            seed: engine.config().seed,
        }
    }
}

/// What one [`GameRunner::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The active player has not submitted a new command.
    Idle,
    /// A command was applied.
    Applied(Outcome),
    /// A command was consumed and rejected.
    Rejected(CommandError),
    /// The game is over; nothing more will be consumed.
    Finished,
}

/// Engine side of the mailbox protocol.
///
/// Polls the active player's command record, applies each new command once,
/// and republishes both players' state records after every consumed command,
/// accepted or not.
#[derive(Debug)]
pub struct GameRunner<M> {
    engine: GameEngine,
    mailbox: M,
    sessions: [Session; 2],
    config: RunnerConfig,
    actions: [u64; 2],
    rejected: u64,
}

impl<M: Mailbox> GameRunner<M> {
    /// Bind `engine` to `mailbox`. Nothing is published until
    /// [`Self::publish`] or [`Self::run`].
    #[must_use]
    pub fn new(engine: GameEngine, mailbox: M, config: RunnerConfig) -> Self {
        Self {
            engine,
            mailbox,
            sessions: PlayerId::ALL.map(Session::new),
            config,
            actions: [0; 2],
            rejected: 0,
        }
    }

    /// The engine being driven.
    #[must_use]
    pub const fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// The mailbox in use.
    #[must_use]
    pub const fn mailbox(&self) -> &M {
        &self.mailbox
    }

    /// Session counters of `player`.
    #[must_use]
    pub const fn session(&self, player: PlayerId) -> &Session {
        &self.sessions[player.index()]
    }

    /// Whether the game has a winner or reached the turn bound.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.engine.is_over() || self.engine.turn() >= self.config.max_turns
    }

    /// Write a fresh state record for both players.
    ///
    /// # Errors
    ///
    /// Fails if a record cannot be written.
    pub fn publish(&mut self) -> Result<(), ProtocolError> {
        self.engine.refresh_analysis();
        for player in PlayerId::ALL {
            let count = self.sessions[player.index()].next_state_count();
            let record = StateRecord::capture(&self.engine, player, count);
            self.mailbox.write_state(player, &record)?;
        }
        Ok(())
    }

    /// Consume and apply at most one command from the active player.
    ///
    /// # Errors
    ///
    /// Fails on non-transient mailbox errors.
    pub fn step(&mut self) -> Result<StepOutcome, ProtocolError> {
        if self.is_finished() {
            return Ok(StepOutcome::Finished);
        }
        let active = self.engine.active();
        let Some(record) = self.sessions[active.index()].poll(&self.mailbox)? else {
            return Ok(StepOutcome::Idle);
        };
        self.actions[active.index()] += 1;

        let result = match Command::try_from(&record.command) {
            Ok(command) => self.engine.apply(active, &command),
            Err(err) => {
                warn!("{active} sent an unusable command #{}: {err}", record.count);
                Err(err)
            }
        };
        self.publish()?;

        Ok(match result {
            Ok(outcome) => StepOutcome::Applied(outcome),
            Err(err) => {
                self.rejected += 1;
                StepOutcome::Rejected(err)
            }
        })
    }

    /// Publish the opening state and serve commands until the game ends.
    ///
    /// # Errors
    ///
    /// Fails on non-transient mailbox errors.
    pub fn run(mut self) -> Result<GameResult, RunError> {
        self.publish()?;
        loop {
            match self.step()? {
                StepOutcome::Finished => break,
                StepOutcome::Idle => thread::sleep(self.config.poll_interval),
                StepOutcome::Applied(_) | StepOutcome::Rejected(_) => {}
            }
        }
        let result = self.result();
        log_result(&result);
        Ok(result)
    }

    /// Result so far.
    #[must_use]
    pub fn result(&self) -> GameResult {
        GameResult::from_engine(&self.engine, self.actions, self.rejected)
    }
}

/// Play a game in-process, handing each actionable state straight to the
/// active player's agent.
///
/// # Errors
///
/// Returns [`RunError::Stalled`] if the active agent keeps sending rejected
/// commands.
pub fn play_local(
    mut engine: GameEngine,
    agents: &mut [&mut dyn Agent; 2],
    config: RunnerConfig,
) -> Result<GameResult, RunError> {
    let mut sessions = PlayerId::ALL.map(Session::new);
    let mut actions = [0u64; 2];
    let mut rejected = 0u64;
    let mut rejected_in_a_row = 0u32;

    while !engine.is_over() && engine.turn() < config.max_turns {
        let active = engine.active();
        engine.refresh_analysis();
        let count = sessions[active.index()].next_state_count();
        let state = StateRecord::capture(&engine, active, count);
        let command = agents[active.index()].decide(&state);
        actions[active.index()] += 1;

        if engine.apply(active, &command).is_ok() {
            rejected_in_a_row = 0;
        } else {
            rejected += 1;
            rejected_in_a_row += 1;
            if rejected_in_a_row >= STALL_LIMIT {
                return Err(RunError::Stalled);
            }
        }
    }

    let result = GameResult::from_engine(&engine, actions, rejected);
    log_result(&result);
    Ok(result)
}

fn log_result(result: &GameResult) {
    match result.winner {
        Some(winner) => info!(
            "{winner} wins after {} turns ({} + {} actions)",
            result.turns_played, result.actions[0], result.actions[1]
        ),
        None => info!("draw after {} turns", result.turns_played),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RandomAgent;
    use crate::game::{EngineConfig, TurnState, World};
    use crate::sync::{CommandRecord, MemoryMailbox};

    fn engine(seed: u64) -> GameEngine {
        let config = EngineConfig {
            seed,
            ..EngineConfig::default()
        };
        GameEngine::new(World::classic().unwrap(), config).unwrap()
    }

    #[test]
    fn test_step_consumes_once_and_republishes() {
        let mailbox = MemoryMailbox::with_initial_commands();
        let mut runner = GameRunner::new(engine(1), mailbox.clone(), RunnerConfig::default());
        runner.publish().unwrap();
        let active = runner.engine().active();

        assert_eq!(runner.step().unwrap(), StepOutcome::Idle);

        mailbox
            .write_command(&CommandRecord::new(active, 1, &Command::PassTurn))
            .unwrap();
        assert!(matches!(runner.step().unwrap(), StepOutcome::Applied(_)));
        assert_eq!(runner.step().unwrap(), StepOutcome::Idle);

        let state = mailbox.read_state(active).unwrap().unwrap();
        assert_eq!(state.count, 2);
        assert_eq!(state.state, TurnState::Attacking);
        assert_eq!(mailbox.read_state(active.opponent()).unwrap().unwrap().count, 2);
    }

    #[test]
    fn test_rejected_command_still_publishes() {
        let mailbox = MemoryMailbox::with_initial_commands();
        let mut runner = GameRunner::new(engine(2), mailbox.clone(), RunnerConfig::default());
        runner.publish().unwrap();
        let active = runner.engine().active();

        let bogus = CommandRecord::new(active, 1, &Command::set_new_troops(1, "Atlantis"));
        mailbox.write_command(&bogus).unwrap();
        assert_eq!(
            runner.step().unwrap(),
            StepOutcome::Rejected(CommandError::UnknownTerritory("Atlantis".to_string()))
        );

        let state = mailbox.read_state(active).unwrap().unwrap();
        assert_eq!(state.count, 2);
        assert_eq!(state.state, TurnState::Mobilizing);
        assert_eq!(runner.result().rejected, 1);
    }

    #[test]
    fn test_turn_bound_finishes_runner() {
        let config = RunnerConfig {
            max_turns: 0,
            ..RunnerConfig::default()
        };
        let mut runner = GameRunner::new(engine(3), MemoryMailbox::new(), config);
        assert!(runner.is_finished());
        assert_eq!(runner.step().unwrap(), StepOutcome::Finished);
    }

    #[test]
    fn test_local_game_between_random_agents() {
        let mut one = RandomAgent::new(10);
        let mut two = RandomAgent::new(20);
        let result = play_local(
            engine(4),
            &mut [&mut one, &mut two],
            RunnerConfig::default(),
        )
        .unwrap();

        assert!(result.turns_played <= DEFAULT_MAX_TURNS);
        assert_eq!(result.final_territories[0] + result.final_territories[1], 42);
        if let Some(winner) = result.winner {
            assert_eq!(result.final_territories[winner.index()], 42);
        }
    }
}
