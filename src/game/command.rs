//! Commands agents issue to the engine.

use std::fmt;

/// The four command kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Attack an adjacent enemy territory.
    Attack,
    /// Move troops between two owned territories.
    MoveTroops,
    /// Place reinforcement troops.
    SetNewTroops,
    /// Advance to the next phase.
    PassTurn,
}

impl CommandKind {
    /// Every kind, in wire order.
    pub const ALL: [Self; 4] = [
        Self::Attack,
        Self::MoveTroops,
        Self::SetNewTroops,
        Self::PassTurn,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::MoveTroops => "move_troops",
            Self::SetNewTroops => "set_new_troops",
            Self::PassTurn => "pass_turn",
        }
    }

    /// Look up a kind by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Argument shape, for diagnostics.
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match self {
            Self::Attack => "[dice, attacker, defender]",
            Self::MoveTroops => "[n_troops, from, to]",
            Self::SetNewTroops => "[n_troops, territory]",
            Self::PassTurn => "[]",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single agent action. Territories are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Attack `to` from `from` rolling `dice` dice.
    Attack {
        /// Dice committed, 1 to 3.
        dice: u32,
        /// Attacking territory.
        from: String,
        /// Defending territory.
        to: String,
    },
    /// Move `count` troops from `from` to `to`.
    MoveTroops {
        /// Troops to move.
        count: u32,
        /// Source territory.
        from: String,
        /// Destination territory.
        to: String,
    },
    /// Place `count` reinforcement troops on `territory`.
    SetNewTroops {
        /// Troops to place.
        count: u32,
        /// Target territory.
        territory: String,
    },
    /// Advance to the next phase.
    PassTurn,
}

impl Command {
    /// Build an attack.
    #[must_use]
    pub fn attack(dice: u32, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Attack {
            dice,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Build a troop move.
    #[must_use]
    pub fn move_troops(count: u32, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::MoveTroops {
            count,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Build a reinforcement placement.
    #[must_use]
    pub fn set_new_troops(count: u32, territory: impl Into<String>) -> Self {
        Self::SetNewTroops {
            count,
            territory: territory.into(),
        }
    }

    /// Kind of this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Attack { .. } => CommandKind::Attack,
            Self::MoveTroops { .. } => CommandKind::MoveTroops,
            Self::SetNewTroops { .. } => CommandKind::SetNewTroops,
            Self::PassTurn => CommandKind::PassTurn,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack { dice, from, to } => write!(f, "attack({dice}, {from}, {to})"),
            Self::MoveTroops { count, from, to } => write!(f, "move_troops({count}, {from}, {to})"),
            Self::SetNewTroops { count, territory } => {
                write!(f, "set_new_troops({count}, {territory})")
            }
            Self::PassTurn => f.write_str("pass_turn()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(CommandKind::from_name("surrender"), None);
        assert_eq!(CommandKind::from_name(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Command::attack(2, "Alaska", "Kamchatka").to_string(),
            "attack(2, Alaska, Kamchatka)"
        );
        assert_eq!(Command::PassTurn.to_string(), "pass_turn()");
        assert_eq!(Command::set_new_troops(3, "Peru").kind(), CommandKind::SetNewTroops);
    }
}
