// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Conquest: a deterministic two-player territorial conquest engine.
//!
//! The engine owns the map, the turn structure and combat. Agents never touch
//! the engine directly: they read a per-player state record and answer with a
//! command record, one command at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Runner (GameRunner, play_local)   │
//! ├──────────────────┬──────────────────┤
//! │   Game engine    │  Sync (mailbox,  │
//! │   (game::*)      │  records)        │
//! ├──────────────────┴──────────────────┤
//! │   Agents (AgentClient, RandomAgent) │
//! └─────────────────────────────────────┘
//! ```

pub mod agent;
pub mod error;
pub mod game;
pub mod runner;
pub mod sync;

pub use agent::{Agent, AgentClient, RandomAgent};
pub use error::{CommandError, ProtocolError, RunError, SetupError, WorldError};
pub use game::{Command, EngineConfig, GameEngine, PlayerId, TurnState, World};
pub use runner::{GameResult, GameRunner, RunnerConfig, play_local};
pub use sync::{FileMailbox, Mailbox, MemoryMailbox};
