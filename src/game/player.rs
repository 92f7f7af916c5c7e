//! Player identity and per-player state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidPlayerId;
use crate::game::Analysis;

/// One of the two seats at the table. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerId {
    /// Player 1.
    One,
    /// Player 2.
    Two,
}

impl PlayerId {
    /// Both players in seat order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Zero-based seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// One-based player number used on the wire and in file names.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = InvalidPlayerId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(InvalidPlayerId(other)),
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> Self {
        id.number()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}

/// Per-player bookkeeping kept by the engine.
///
/// Territory ownership lives in the world; the player only holds what the
/// board cannot tell: the reinforcement pool, the running troop total and the
/// cached border/connectivity analysis.
#[derive(Debug, Clone)]
pub struct Player {
    /// Seat of this player.
    pub id: PlayerId,
    /// Reinforcement troops not yet placed.
    pub reserve: u32,
    /// Troops on the board.
    pub total_troops: u32,
    /// Border map and connectivity matrix, recomputed when ownership changes.
    pub analysis: Analysis,
}

impl Player {
    /// Create a player with no reserve.
    #[must_use]
    pub fn new(id: PlayerId, total_troops: u32) -> Self {
        Self {
            id,
            reserve: 0,
            total_troops,
            analysis: Analysis::default(),
        }
    }
}
