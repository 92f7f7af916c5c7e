//! Per-player turn state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::game::{CommandKind, PlayerId};

/// Where a player is within the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    /// The opponent is acting.
    Waiting,
    /// Placing reinforcements.
    Mobilizing,
    /// Attacking neighbours.
    Attacking,
    /// Must move troops into the territory just conquered.
    Conquering,
    /// One optional troop move before the turn ends.
    Fortifying,
    /// Owns every territory.
    Winner,
    /// Lost every territory.
    Loser,
}

impl TurnState {
    /// Wire name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Mobilizing => "mobilizing",
            Self::Attacking => "attacking",
            Self::Conquering => "conquering",
            Self::Fortifying => "fortifying",
            Self::Winner => "winner",
            Self::Loser => "loser",
        }
    }

    /// Whether the game is over for this player.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Winner | Self::Loser)
    }

    /// Whether a command of this kind may be issued in this state.
    ///
    /// `pass_turn` while conquering is not permitted here; the state machine
    /// reports it as an illegal transition instead.
    #[must_use]
    pub const fn permits(self, kind: CommandKind) -> bool {
        matches!(
            (self, kind),
            (Self::Mobilizing, CommandKind::SetNewTroops | CommandKind::PassTurn)
                | (Self::Attacking, CommandKind::Attack | CommandKind::PassTurn)
                | (Self::Conquering, CommandKind::MoveTroops)
                | (Self::Fortifying, CommandKind::MoveTroops | CommandKind::PassTurn)
        )
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The active player moved to the next phase of its turn.
    Phase {
        /// Phase left.
        from: TurnState,
        /// Phase entered.
        to: TurnState,
    },
    /// The turn passed to the opponent.
    TurnEnded {
        /// Player now mobilizing.
        next: PlayerId,
        /// Turn counter after the hand-over.
        turn: u32,
    },
}

/// The two players' states plus whose turn it is.
///
/// Exactly one player is active; the other is `waiting` until the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnMachine {
    states: [TurnState; 2],
    active: PlayerId,
    turn: u32,
}

impl TurnMachine {
    /// Start with `first` mobilizing.
    #[must_use]
    pub fn new(first: PlayerId) -> Self {
        let mut states = [TurnState::Waiting; 2];
        states[first.index()] = TurnState::Mobilizing;
        Self {
            states,
            active: first,
            turn: 0,
        }
    }

    /// State of `player`.
    #[must_use]
    pub const fn state(&self, player: PlayerId) -> TurnState {
        self.states[player.index()]
    }

    /// The player whose turn it is.
    #[must_use]
    pub const fn active(&self) -> PlayerId {
        self.active
    }

    /// Completed hand-overs between players.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Whether a winner has been declared.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state(self.active).is_terminal()
    }

    /// The winner, once declared.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        PlayerId::ALL
            .into_iter()
            .find(|&p| self.state(p) == TurnState::Winner)
    }

    /// Advance the active player past its current phase.
    ///
    /// # Errors
    ///
    /// Fails while conquering, after the game is over, and from `waiting`.
    pub fn pass(&mut self) -> Result<PassOutcome, TransitionError> {
        let from = self.state(self.active);
        let to = match from {
            TurnState::Mobilizing => TurnState::Attacking,
            TurnState::Attacking => TurnState::Fortifying,
            TurnState::Fortifying => {
                let next = self.active.opponent();
                self.states[self.active.index()] = TurnState::Waiting;
                self.states[next.index()] = TurnState::Mobilizing;
                self.active = next;
                self.turn += 1;
                return Ok(PassOutcome::TurnEnded {
                    next,
                    turn: self.turn,
                });
            }
            TurnState::Conquering => return Err(TransitionError::PassWhileConquering),
            TurnState::Winner | TurnState::Loser => return Err(TransitionError::GameOver),
            TurnState::Waiting => {
                return Err(TransitionError::Illegal {
                    state: from,
                    action: "pass the turn",
                });
            }
        };
        self.states[self.active.index()] = to;
        Ok(PassOutcome::Phase { from, to })
    }

    /// Enter `conquering` after a conquering attack.
    ///
    /// # Errors
    ///
    /// Fails unless the active player is attacking.
    pub fn begin_conquest(&mut self) -> Result<(), TransitionError> {
        self.expect(TurnState::Attacking, "begin a conquest")?;
        self.states[self.active.index()] = TurnState::Conquering;
        Ok(())
    }

    /// Return to `attacking` after the post-conquest move.
    ///
    /// # Errors
    ///
    /// Fails unless the active player is conquering.
    pub fn end_conquest(&mut self) -> Result<(), TransitionError> {
        self.expect(TurnState::Conquering, "finish a conquest")?;
        self.states[self.active.index()] = TurnState::Attacking;
        Ok(())
    }

    /// Mark `winner` as the winner and the opponent as the loser.
    pub fn declare_winner(&mut self, winner: PlayerId) {
        self.states[winner.index()] = TurnState::Winner;
        self.states[winner.opponent().index()] = TurnState::Loser;
    }

    fn expect(&self, wanted: TurnState, action: &'static str) -> Result<(), TransitionError> {
        let state = self.state(self.active);
        if state.is_terminal() {
            Err(TransitionError::GameOver)
        } else if state == wanted {
            Ok(())
        } else {
            Err(TransitionError::Illegal { state, action })
        }
    }
}
