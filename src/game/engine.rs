//! The game engine: the only mutator of the world, players and turn state.

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{CommandError, SetupError, TransitionError};
use crate::game::{
    Analysis, CombatOutcome, Command, CommandKind, DEFAULT_STARTING_TROOPS, MAX_ATTACK_DICE,
    PassOutcome, Player, PlayerId, TerritoryId, TurnMachine, TurnState, World, assert_invariants,
    can_attack, random_draft, resolve,
};

/// Engine tuning. Defaults match the classic rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed for the draft, the first-player coin flip and every dice roll.
    pub seed: u64,
    /// Troops each player drafts, garrisons included.
    pub starting_troops: u32,
    /// Floor on the per-turn reinforcement before region bonuses.
    pub min_reinforcement: u32,
    /// One reinforcement troop per this many owned territories.
    pub territories_per_troop: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            starting_troops: DEFAULT_STARTING_TROOPS,
            min_reinforcement: 3,
            territories_per_troop: 3,
        }
    }
}

/// The attacking pair of the most recent conquest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conquest {
    /// Territory the attack came from.
    pub from: TerritoryId,
    /// Territory that was conquered.
    pub to: TerritoryId,
}

/// What an accepted command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reinforcements placed.
    Placed {
        /// Territory reinforced.
        territory: TerritoryId,
        /// Troops placed.
        count: u32,
    },
    /// An attack was resolved and the game goes on.
    Attacked {
        /// Attacking territory.
        from: TerritoryId,
        /// Defending territory.
        to: TerritoryId,
        /// Dice committed.
        dice: u32,
        /// Losses and whether the defender fell.
        combat: CombatOutcome,
    },
    /// An attack took the last enemy territory.
    Won {
        /// The new winner.
        winner: PlayerId,
        /// Territory taken last.
        territory: TerritoryId,
    },
    /// Troops moved into a freshly conquered territory.
    Occupied {
        /// Attacking territory.
        from: TerritoryId,
        /// Conquered territory.
        to: TerritoryId,
        /// Troops moved.
        count: u32,
    },
    /// The end-of-turn troop move, which hands the turn over.
    Fortified {
        /// Source territory.
        from: TerritoryId,
        /// Destination territory.
        to: TerritoryId,
        /// Troops moved.
        count: u32,
        /// Player now mobilizing.
        next: PlayerId,
        /// Reinforcements granted to `next`.
        reinforcements: u32,
    },
    /// The active player moved to its next phase.
    PhaseChanged {
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
        /// Reinforcements granted to `next`.
        reinforcements: u32,
    },
}

/// Authoritative game state.
///
/// Commands enter through [`GameEngine::apply`]; a rejected command leaves
/// every piece of state untouched. Dice come from a seeded RNG so a game is
/// reproducible from its [`EngineConfig`] and command sequence.
#[derive(Debug, Clone)]
pub struct GameEngine {
    pub(crate) world: World,
    players: [Player; 2],
    turns: TurnMachine,
    pub(crate) conquest: Option<Conquest>,
    rng: ChaCha8Rng,
    config: EngineConfig,
}

impl GameEngine {
    /// Draft `world` at random, flip for the first player and grant its
    /// first reinforcements.
    ///
    /// # Errors
    ///
    /// Fails if the world is too small or the starting troops cannot
    /// garrison a player's share.
    pub fn new(mut world: World, config: EngineConfig) -> Result<Self, SetupError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        random_draft(&mut world, config.starting_troops, &mut rng)?;
        let first = if rng.gen_bool(0.5) {
            PlayerId::One
        } else {
            PlayerId::Two
        };
        Ok(Self::start(world, first, config, rng))
    }

    /// Start from an explicit placement with `first` to move.
    ///
    /// Troop totals are derived from the board.
    ///
    /// # Errors
    ///
    /// Fails if a territory is unowned or empty, or a player owns nothing.
    pub fn from_position(
        world: World,
        first: PlayerId,
        config: EngineConfig,
    ) -> Result<Self, SetupError> {
        for (_, territory) in world.territories() {
            if territory.owner().is_none() {
                return Err(SetupError::Unowned(territory.name().to_string()));
            }
            if territory.troops() == 0 {
                return Err(SetupError::EmptyGarrison(territory.name().to_string()));
            }
        }
        if let Some(player) = PlayerId::ALL
            .into_iter()
            .find(|&p| world.owned_count(p) == 0)
        {
            return Err(SetupError::NoTerritories(player));
        }
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self::start(world, first, config, rng))
    }

    fn start(world: World, first: PlayerId, config: EngineConfig, rng: ChaCha8Rng) -> Self {
        let players = PlayerId::ALL.map(|id| Player::new(id, world.troops_of(id)));
        let mut engine = Self {
            world,
            players,
            turns: TurnMachine::new(first),
            conquest: None,
            rng,
            config,
        };
        let granted = engine.grant_reinforcements(first);
        engine.refresh_analysis();
        info!(
            "game start: {} territories, seed {}, {first} moves first with {granted} new troops",
            engine.world.len(),
            config.seed,
        );
        assert_invariants(&engine);
        engine
    }

    /// Validate and apply one command from `player`.
    ///
    /// # Errors
    ///
    /// Returns the reason the command was rejected; nothing is mutated.
    pub fn apply(&mut self, player: PlayerId, command: &Command) -> Result<Outcome, CommandError> {
        let result = self.dispatch(player, command);
        match &result {
            Ok(outcome) => {
                debug!("{player} {command}: {outcome:?}");
                assert_invariants(self);
            }
            Err(err) => warn!("{player} {command} rejected: {err}"),
        }
        result
    }

    fn dispatch(&mut self, player: PlayerId, command: &Command) -> Result<Outcome, CommandError> {
        if self.turns.is_over() {
            return Err(TransitionError::GameOver.into());
        }
        if player != self.turns.active() {
            return Err(CommandError::NotYourTurn(player));
        }
        let state = self.turns.state(player);
        let kind = command.kind();
        // Passing while conquering reaches the state machine, which names the error.
        let pass_while_conquering = state == TurnState::Conquering && kind == CommandKind::PassTurn;
        if !state.permits(kind) && !pass_while_conquering {
            return Err(CommandError::WrongPhase {
                command: kind,
                state,
            });
        }

        match command {
            Command::Attack { dice, from, to } => self.attack(player, *dice, from, to),
            Command::MoveTroops { count, from, to } => self.move_troops(player, *count, from, to),
            Command::SetNewTroops { count, territory } => {
                self.set_new_troops(player, *count, territory)
            }
            Command::PassTurn => self.pass_turn(),
        }
    }

    fn attack(
        &mut self,
        player: PlayerId,
        dice: u32,
        from: &str,
        to: &str,
    ) -> Result<Outcome, CommandError> {
        let from_id = self.lookup(from)?;
        let to_id = self.lookup(to)?;
        self.require_owned(player, from_id)?;
        if self.world.territory(to_id).owner() == Some(player) {
            return Err(CommandError::OwnTerritory {
                player,
                territory: to.to_string(),
            });
        }
        if !self.world.are_adjacent(from_id, to_id) {
            return Err(CommandError::NotAdjacent {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if !(1..=MAX_ATTACK_DICE).contains(&dice) {
            return Err(CommandError::InvalidDice {
                dice,
                max: MAX_ATTACK_DICE,
            });
        }
        let attacker_troops = self.world.territory(from_id).troops();
        if !can_attack(attacker_troops, dice) {
            return Err(CommandError::InsufficientTroops {
                territory: from.to_string(),
                troops: attacker_troops,
                requested: dice,
            });
        }

        let defender_troops = self.world.territory(to_id).troops();
        let combat = resolve(attacker_troops, defender_troops, dice, &mut self.rng);
        let enemy = player.opponent();

        let attacker_left = attacker_troops - combat.attacker_losses;
        let defender_left = defender_troops - combat.defender_losses;
        self.players[player.index()].total_troops -= combat.attacker_losses;
        self.players[enemy.index()].total_troops -= combat.defender_losses;

        if !combat.conquered {
            self.world.set_troops(from_id, attacker_left);
            self.world.set_troops(to_id, defender_left);
            return Ok(Outcome::Attacked {
                from: from_id,
                to: to_id,
                dice,
                combat,
            });
        }

        self.world.set_troops(from_id, attacker_left - dice);
        self.world.place(to_id, player, dice);

        if self.world.owned_count(player) == self.world.len() {
            self.turns.declare_winner(player);
            info!("{player} owns every territory and wins on turn {}", self.turns.turn());
            return Ok(Outcome::Won {
                winner: player,
                territory: to_id,
            });
        }

        self.turns.begin_conquest()?;
        self.conquest = Some(Conquest {
            from: from_id,
            to: to_id,
        });
        Ok(Outcome::Attacked {
            from: from_id,
            to: to_id,
            dice,
            combat,
        })
    }

    fn move_troops(
        &mut self,
        player: PlayerId,
        count: u32,
        from: &str,
        to: &str,
    ) -> Result<Outcome, CommandError> {
        let from_id = self.lookup(from)?;
        let to_id = self.lookup(to)?;
        if from_id == to_id {
            return Err(CommandError::SameTerritory(from.to_string()));
        }
        self.require_owned(player, from_id)?;
        self.require_owned(player, to_id)?;
        let available = self.world.territory(from_id).troops();
        if count >= available {
            return Err(CommandError::InsufficientTroops {
                territory: from.to_string(),
                troops: available,
                requested: count,
            });
        }

        if self.turns.state(player) == TurnState::Conquering {
            let pair = Conquest {
                from: from_id,
                to: to_id,
            };
            match self.conquest {
                Some(conquest) if conquest == pair => {}
                Some(conquest) => {
                    return Err(CommandError::ConquestPair {
                        from: self.world.name(conquest.from).to_string(),
                        to: self.world.name(conquest.to).to_string(),
                    });
                }
                None => {
                    return Err(TransitionError::Illegal {
                        state: TurnState::Conquering,
                        action: "move troops without a conquest",
                    }
                    .into());
                }
            }
            self.turns.end_conquest()?;
            self.conquest = None;
            self.transfer(from_id, to_id, count);
            return Ok(Outcome::Occupied {
                from: from_id,
                to: to_id,
                count,
            });
        }

        self.players[player.index()]
            .analysis
            .refresh(&self.world, player);
        if !self.players[player.index()].analysis.matrix().get(from_id, to_id) {
            return Err(CommandError::NotConnected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let PassOutcome::TurnEnded { next, .. } = self.turns.pass()? else {
            return Err(TransitionError::Illegal {
                state: self.turns.state(player),
                action: "end the turn by fortifying",
            }
            .into());
        };
        self.transfer(from_id, to_id, count);
        let reinforcements = self.grant_reinforcements(next);
        Ok(Outcome::Fortified {
            from: from_id,
            to: to_id,
            count,
            next,
            reinforcements,
        })
    }

    fn set_new_troops(
        &mut self,
        player: PlayerId,
        count: u32,
        territory: &str,
    ) -> Result<Outcome, CommandError> {
        let id = self.lookup(territory)?;
        self.require_owned(player, id)?;
        let reserve = self.players[player.index()].reserve;
        if count > reserve {
            return Err(CommandError::InsufficientReserve {
                player,
                available: reserve,
                requested: count,
            });
        }

        let troops = self.world.territory(id).troops();
        self.world.set_troops(id, troops + count);
        let state = &mut self.players[player.index()];
        state.reserve -= count;
        state.total_troops += count;
        Ok(Outcome::Placed {
            territory: id,
            count,
        })
    }

    fn pass_turn(&mut self) -> Result<Outcome, CommandError> {
        match self.turns.pass()? {
            PassOutcome::Phase { from, to } => Ok(Outcome::PhaseChanged { from, to }),
            PassOutcome::TurnEnded { next, turn } => {
                let reinforcements = self.grant_reinforcements(next);
                Ok(Outcome::TurnEnded {
                    next,
                    turn,
                    reinforcements,
                })
            }
        }
    }

    fn transfer(&mut self, from: TerritoryId, to: TerritoryId, count: u32) {
        let from_troops = self.world.territory(from).troops();
        let to_troops = self.world.territory(to).troops();
        self.world.set_troops(from, from_troops - count);
        self.world.set_troops(to, to_troops + count);
    }

    fn grant_reinforcements(&mut self, player: PlayerId) -> u32 {
        let troops = self.reinforcement_for(player);
        let reserve = &mut self.players[player.index()].reserve;
        *reserve = reserve.saturating_add(troops);
        troops
    }

    fn lookup(&self, name: &str) -> Result<TerritoryId, CommandError> {
        self.world
            .id(name)
            .ok_or_else(|| CommandError::UnknownTerritory(name.to_string()))
    }

    fn require_owned(&self, player: PlayerId, id: TerritoryId) -> Result<(), CommandError> {
        if self.world.territory(id).owner() == Some(player) {
            Ok(())
        } else {
            Err(CommandError::NotOwned {
                player,
                territory: self.world.name(id).to_string(),
            })
        }
    }

    /// Troops `player` would receive at the start of a turn now:
    /// `max(min_reinforcement, owned / territories_per_troop)` plus region bonuses.
    #[must_use]
    pub fn reinforcement_for(&self, player: PlayerId) -> u32 {
        let owned = u32::try_from(self.world.owned_count(player)).unwrap_or(u32::MAX);
        let base = owned
            .checked_div(self.config.territories_per_troop)
            .unwrap_or(0)
            .max(self.config.min_reinforcement);
        base.saturating_add(self.world.region_bonus_for(player))
    }

    /// Bring both players' analyses up to date with the world.
    pub fn refresh_analysis(&mut self) {
        for player in &mut self.players {
            player.analysis.refresh(&self.world, player.id);
        }
    }

    /// Cached analysis of `player`; may lag the world until
    /// [`GameEngine::refresh_analysis`] runs.
    #[must_use]
    pub fn analysis(&self, player: PlayerId) -> &Analysis {
        &self.players[player.index()].analysis
    }

    /// The world graph.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Bookkeeping for `player`.
    #[must_use]
    pub const fn player(&self, player: PlayerId) -> &Player {
        &self.players[player.index()]
    }

    /// Turn state of `player`.
    #[must_use]
    pub const fn state(&self, player: PlayerId) -> TurnState {
        self.turns.state(player)
    }

    /// Player whose turn it is.
    #[must_use]
    pub const fn active(&self) -> PlayerId {
        self.turns.active()
    }

    /// Completed hand-overs between players.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turns.turn()
    }

    /// Whether a winner has been declared.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.turns.is_over()
    }

    /// The winner, once declared.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.turns.winner()
    }

    /// Pending post-conquest move, while conquering.
    #[must_use]
    pub const fn conquest(&self) -> Option<Conquest> {
        self.conquest
    }

    /// Configuration the engine was started with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}
