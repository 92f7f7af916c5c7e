//! Error types for the conquest engine.
//!
//! Each concern gets its own enum:
//! - [`WorldError`]: the static world definition is unusable (fatal at load)
//! - [`SetupError`]: a starting position violates the game invariants
//! - [`CommandError`]: an agent command was rejected (recoverable, no mutation)
//! - [`TransitionError`]: an illegal turn-state transition was requested
//! - [`ProtocolError`]: a mailbox record could not be read or written
//! - [`RunError`]: anything that stops a runner from completing a game

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::game::{CommandKind, PlayerId, TurnState};

/// A world definition that cannot be turned into a valid world graph.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The definition file could not be read.
    #[error("failed to read world definition {}: {source}", .path.display())]
    Io {
        /// Path of the definition file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The definition is not valid JSON or has the wrong shape.
    #[error("world definition is not valid: {0}")]
    Parse(#[from] serde_json::Error),
    /// The definition contains no territories at all.
    #[error("world definition has no territories")]
    Empty,
    /// A region lists no territories.
    #[error("region `{0}` has no territories")]
    EmptyRegion(String),
    /// A territory appears in more than one region.
    #[error("territory `{territory}` is listed in both `{first}` and `{second}`")]
    DuplicateTerritory {
        /// Territory name.
        territory: String,
        /// Region that listed it first.
        first: String,
        /// Region that listed it again.
        second: String,
    },
    /// A neighbour name does not match any territory.
    #[error("territory `{territory}` lists unknown neighbour `{neighbour}`")]
    UnknownNeighbour {
        /// Territory whose neighbour list is wrong.
        territory: String,
        /// The unresolved neighbour name.
        neighbour: String,
    },
    /// A territory lists itself as a neighbour.
    #[error("territory `{0}` lists itself as a neighbour")]
    SelfAdjacent(String),
    /// Adjacency is declared in one direction only.
    #[error("`{from}` lists `{to}` as a neighbour but `{to}` does not list `{from}`")]
    AsymmetricAdjacency {
        /// Territory declaring the edge.
        from: String,
        /// Territory missing the reverse edge.
        to: String,
    },
    /// More territories than a territory index can address.
    #[error("world has {0} territories, more than the supported maximum")]
    TooLarge(usize),
    /// A region bonus above [`MAX_REGION_BONUS`](crate::game::MAX_REGION_BONUS).
    #[error("region `{region}` grants {bonus} extra armies, more than the maximum of {max}")]
    BonusTooLarge {
        /// Region name.
        region: String,
        /// Declared bonus.
        bonus: u32,
        /// Largest accepted bonus.
        max: u32,
    },
}

/// A starting position that cannot begin a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Fewer territories than players.
    #[error("world has {0} territories; at least two are required")]
    TooFewTerritories(usize),
    /// Starting troops cannot garrison every drafted territory.
    #[error("{player} starts with {troops} troops but must garrison {territories} territories")]
    NotEnoughTroops {
        /// Player receiving the draft.
        player: PlayerId,
        /// Configured starting troops.
        troops: u32,
        /// Territories drafted to the player.
        territories: usize,
    },
    /// A territory has no owner.
    #[error("territory `{0}` has no owner")]
    Unowned(String),
    /// An owned territory has no troops.
    #[error("territory `{0}` is owned but has no troops")]
    EmptyGarrison(String),
    /// A player owns nothing, so the game is already decided.
    #[error("{0} owns no territories")]
    NoTerritories(PlayerId),
}

/// An illegal turn-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Passing the turn before moving troops into a conquered territory.
    #[error("cannot pass the turn while conquering")]
    PassWhileConquering,
    /// The requested transition does not exist from this state.
    #[error("cannot {action} while {state}")]
    Illegal {
        /// State the player is in.
        state: TurnState,
        /// Transition that was requested.
        action: &'static str,
    },
    /// The game has already been decided.
    #[error("the game is over")]
    GameOver,
}

/// A rejected command. The engine state is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command name is not one of the four known commands.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// The argument list has the wrong length or types.
    #[error("`{command}` expects arguments {expected}")]
    BadArguments {
        /// Command name.
        command: CommandKind,
        /// Human-readable argument shape.
        expected: &'static str,
    },
    /// No territory has this name.
    #[error("no territory named `{0}`")]
    UnknownTerritory(String),
    /// The acting player does not own the territory.
    #[error("{player} does not own `{territory}`")]
    NotOwned {
        /// Acting player.
        player: PlayerId,
        /// Territory name.
        territory: String,
    },
    /// The attack targets a territory the attacker already owns.
    #[error("{player} cannot attack its own territory `{territory}`")]
    OwnTerritory {
        /// Acting player.
        player: PlayerId,
        /// Territory name.
        territory: String,
    },
    /// The two territories do not share a border.
    #[error("`{from}` is not adjacent to `{to}`")]
    NotAdjacent {
        /// Source territory.
        from: String,
        /// Target territory.
        to: String,
    },
    /// The dice count is outside the allowed range.
    #[error("cannot attack with {dice} dice (allowed: 1 to {max})")]
    InvalidDice {
        /// Requested dice.
        dice: u32,
        /// Maximum dice an attacker may roll.
        max: u32,
    },
    /// The territory cannot spare the requested troops.
    #[error("`{territory}` has {troops} troops and cannot commit {requested} while keeping one behind")]
    InsufficientTroops {
        /// Source territory.
        territory: String,
        /// Troops currently there.
        troops: u32,
        /// Troops or dice requested.
        requested: u32,
    },
    /// The reinforcement pool is too small.
    #[error("{player} has {available} new troops and cannot place {requested}")]
    InsufficientReserve {
        /// Acting player.
        player: PlayerId,
        /// Troops in the pool.
        available: u32,
        /// Troops requested.
        requested: u32,
    },
    /// Source and destination are the same territory.
    #[error("cannot move troops from `{0}` to itself")]
    SameTerritory(String),
    /// After a conquest only the attacking pair may be used.
    #[error("after a conquest troops may only move from `{from}` to `{to}`")]
    ConquestPair {
        /// Attacking territory of the conquest.
        from: String,
        /// Conquered territory.
        to: String,
    },
    /// No owned-only path joins the two territories.
    #[error("`{from}` and `{to}` are not connected through owned territory")]
    NotConnected {
        /// Source territory.
        from: String,
        /// Destination territory.
        to: String,
    },
    /// The command is not available in the current turn state.
    #[error("`{command}` is not allowed while {state}")]
    WrongPhase {
        /// Command that was attempted.
        command: CommandKind,
        /// State of the acting player.
        state: TurnState,
    },
    /// The command came from the waiting player.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),
    /// The command asked for an illegal state transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// A player id outside the two seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("player id must be 1 or 2, got {0}")]
pub struct InvalidPlayerId(pub u8);

/// A failure reading or writing a synchronization record.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A record was read mid-write or is otherwise unparseable.
    #[error("record {location} is incomplete or corrupt: {source}")]
    Corrupt {
        /// Where the record lives.
        location: String,
        /// Parse failure.
        source: serde_json::Error,
    },
    /// A record could not be encoded.
    #[error("failed to encode record: {0}")]
    Encode(serde_json::Error),
    /// A record file could not be read or written.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        /// Record path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A thread panicked while holding the in-memory mailbox.
    #[error("mailbox lock was poisoned")]
    Poisoned,
    /// A command record carries the other player's id.
    #[error("command record for {expected} was signed by {found}")]
    WrongSender {
        /// Owner of the mailbox slot.
        expected: PlayerId,
        /// Id written in the record.
        found: PlayerId,
    },
}

impl ProtocolError {
    /// Whether re-polling may succeed (a record caught mid-write).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Anything that prevents a runner from finishing a game.
#[derive(Debug, Error)]
pub enum RunError {
    /// The world definition was rejected.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The starting position was rejected.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// The mailbox failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Neither the engine nor the agents could make progress.
    #[error("game stalled: too many rejected commands in a row")]
    Stalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_only_for_corrupt_records() {
        let parse = serde_json::from_str::<u32>("{").unwrap_err();
        let corrupt = ProtocolError::Corrupt {
            location: "Calls/player_1.json".to_string(),
            source: parse,
        };
        assert!(corrupt.is_transient());
        assert!(!ProtocolError::Poisoned.is_transient());
    }

    #[test]
    fn test_transition_error_wraps_into_command_error() {
        let err: CommandError = TransitionError::PassWhileConquering.into();
        assert_eq!(err.to_string(), "cannot pass the turn while conquering");
    }
}
