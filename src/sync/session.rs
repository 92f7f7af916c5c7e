//! Engine-side bookkeeping for one player's channel.

use log::trace;

use crate::error::ProtocolError;
use crate::game::PlayerId;
use crate::sync::{CommandRecord, Mailbox};

/// Counters for one player: the last command consumed and the last state
/// published. Each command count is consumed at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    player: PlayerId,
    consumed: u64,
    published: u64,
}

impl Session {
    /// A session that has consumed and published nothing.
    #[must_use]
    pub const fn new(player: PlayerId) -> Self {
        Self {
            player,
            consumed: 0,
            published: 0,
        }
    }

    /// Player this session serves.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Count of the last consumed command.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Count of the last published state.
    #[must_use]
    pub const fn published(&self) -> u64 {
        self.published
    }

    /// Take the player's command if it is newer than the last one consumed.
    ///
    /// A record caught mid-write reads as nothing new.
    ///
    /// # Errors
    ///
    /// Fails on non-transient mailbox errors.
    pub fn poll<M: Mailbox + ?Sized>(
        &mut self,
        mailbox: &M,
    ) -> Result<Option<CommandRecord>, ProtocolError> {
        let record = match mailbox.read_command(self.player) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(err) if err.is_transient() => {
                trace!("{}: re-polling after {err}", self.player);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        if record.count <= self.consumed {
            return Ok(None);
        }
        self.consumed = record.count;
        Ok(Some(record))
    }

    /// Reserve the next state publication number.
    pub fn next_state_count(&mut self) -> u64 {
        self.published += 1;
        self.published
    }
}
