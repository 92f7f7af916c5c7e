//! Game layer for the conquest engine.
//!
//! Implements the rules of a two-player territorial conquest game:
//! - World graph with territories, adjacency and region bonuses
//! - Players with reinforcement pools and troop totals
//! - Dice combat resolution
//! - Border and connectivity analysis over each player's territory
//! - Per-player turn state machine
//! - The engine that validates and applies agent commands

mod combat;
mod command;
mod connectivity;
mod draft;
mod engine;
mod invariants;
mod player;
mod turn;
mod world;

pub use combat::{
    CombatOutcome, DIE_FACES, MAX_ATTACK_DICE, MAX_DEFENCE_DICE, can_attack, compare_rolls,
    defender_dice, resolve, roll_dice,
};
pub use command::{Command, CommandKind};
pub use connectivity::{Analysis, BorderMap, ConnectivityMatrix, border_map, is_connected};
pub use draft::{DEFAULT_STARTING_TROOPS, random_draft};
pub use engine::{Conquest, EngineConfig, GameEngine, Outcome};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use player::{Player, PlayerId};
pub use turn::{PassOutcome, TurnMachine, TurnState};
pub use world::{
    CLASSIC_WORLD, MAX_REGION_BONUS, Region, RegionDefinition, RegionId, Territory, TerritoryId,
    World, WorldDefinition,
};
