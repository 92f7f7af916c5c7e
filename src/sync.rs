//! Synchronization channel between the engine and agent processes.
//!
//! Each player has two records: a state record the engine writes and a
//! command record the agent writes. Both carry a monotonically increasing
//! `count`; a reader acts only when the count it sees is greater than the
//! last one it consumed.
//!
//! ```text
//!   engine ──write_state──▶ Logs/player_N.json  ──read_state──▶ agent
//!   engine ◀─read_command── Calls/player_N.json ◀─write_command─ agent
//! ```

mod mailbox;
mod records;
mod session;

pub use mailbox::{FileMailbox, Mailbox, MemoryMailbox};
pub use records::{CommandPayload, CommandRecord, ContinentView, CountryView, StateRecord};
pub use session::Session;
