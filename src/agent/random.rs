//! An agent that plays random legal-looking moves, for tests and self-play.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agent::Agent;
use crate::game::{Command, TurnState};
use crate::sync::StateRecord;

/// Fortify attempts at finding a territory with troops to spare.
const FORTIFY_TRIES: usize = 10;

/// Plays uniformly random moves from the ones the state record suggests.
///
/// - mobilizing: drops a random share of the pool on a random territory,
///   passing once the pool is empty
/// - attacking: attacks from the first shuffled border territory that can,
///   with as many dice as it can afford
/// - conquering: moves a random number of troops along the last attack
/// - fortifying: moves a random number of troops to the first connected
///   territory, or passes
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: ChaCha8Rng,
    last_attack: Option<(String, String)>,
}

impl RandomAgent {
    /// Create an agent with its own seeded RNG.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_attack: None,
        }
    }

    fn mobilize(&mut self, state: &StateRecord) -> Command {
        if state.n_new_troops == 0 {
            return Command::PassTurn;
        }
        let Some(territory) = state.countries_owned.choose(&mut self.rng) else {
            return Command::PassTurn;
        };
        let count = self.rng.gen_range(1..=state.n_new_troops);
        Command::set_new_troops(count, territory.as_str())
    }

    fn attack(&mut self, state: &StateRecord) -> Command {
        let mut borders: Vec<(&String, &Vec<String>)> = state.border_countries.iter().collect();
        borders.shuffle(&mut self.rng);

        for (from, enemies) in borders {
            let troops = state.troops(from);
            let Some(to) = enemies.first() else {
                continue;
            };
            let dice = match troops {
                0 | 1 => continue,
                2 => 1,
                3 => 2,
                _ => 3,
            };
            self.last_attack = Some((from.clone(), to.clone()));
            return Command::attack(dice, from.as_str(), to.as_str());
        }
        Command::PassTurn
    }

    fn conquer(&mut self, state: &StateRecord) -> Command {
        let Some((from, to)) = self.last_attack.clone() else {
            return Command::PassTurn;
        };
        let available = state.troops(&from).max(1);
        Command::move_troops(self.rng.gen_range(0..available), from, to)
    }

    fn fortify(&mut self, state: &StateRecord) -> Command {
        let source = (0..FORTIFY_TRIES)
            .filter_map(|_| state.countries_owned.choose(&mut self.rng))
            .find(|name| state.troops(name) > 1);
        let Some(from) = source else {
            return Command::PassTurn;
        };
        let target = state
            .countries_owned
            .iter()
            .find(|to| *to != from && state.connected(from, to));
        match target {
            Some(to) => {
                let count = self.rng.gen_range(0..state.troops(from));
                Command::move_troops(count, from.as_str(), to.as_str())
            }
            None => Command::PassTurn,
        }
    }
}

impl Agent for RandomAgent {
    fn decide(&mut self, state: &StateRecord) -> Command {
        match state.state {
            TurnState::Mobilizing => self.mobilize(state),
            TurnState::Attacking => self.attack(state),
            TurnState::Conquering => self.conquer(state),
            TurnState::Fortifying => self.fortify(state),
            TurnState::Waiting | TurnState::Winner | TurnState::Loser => Command::PassTurn,
        }
    }
}
