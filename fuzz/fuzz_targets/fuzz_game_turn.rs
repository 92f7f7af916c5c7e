#![no_main]

//! Full game fuzzer.
//!
//! Drives a drafted classic game with arbitrary commands from both players,
//! valid or not, and checks after every command that:
//! 1. Rejected commands change nothing
//! 2. Accepted commands keep every game invariant
//! 3. The game never leaves its terminal state once over

use arbitrary::Arbitrary;
use conquest::game::check_invariants;
use conquest::{Command, EngineConfig, GameEngine, PlayerId, World};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated command; territories are indices into the world.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzCommand {
    /// Attack between two territories.
    Attack { dice: u8, from: u8, to: u8 },
    /// Move troops between two territories.
    Move { count: u16, from: u8, to: u8 },
    /// Place reinforcements.
    Place { count: u16, territory: u8 },
    /// End the current phase.
    Pass,
}

/// Structured input for full game fuzzing.
#[derive(Arbitrary, Debug)]
struct GameInput {
    /// Seed for the draft, the coin flip and the dice.
    seed: u64,
    /// Commands in order; each is sent by the player flagged alongside it.
    commands: Vec<(bool, FuzzCommand)>,
}

fn to_command(world: &World, command: &FuzzCommand) -> Command {
    let ids: Vec<_> = world.ids().collect();
    let name = |i: u8| world.name(ids[usize::from(i) % ids.len()]).to_string();
    match *command {
        FuzzCommand::Attack { dice, from, to } => {
            Command::attack(u32::from(dice), name(from), name(to))
        }
        FuzzCommand::Move { count, from, to } => {
            Command::move_troops(u32::from(count), name(from), name(to))
        }
        FuzzCommand::Place { count, territory } => {
            Command::set_new_troops(u32::from(count), name(territory))
        }
        FuzzCommand::Pass => Command::PassTurn,
    }
}

fn board(engine: &GameEngine) -> Vec<(Option<PlayerId>, u32)> {
    engine
        .world()
        .territories()
        .map(|(_, t)| (t.owner(), t.troops()))
        .collect()
}

fuzz_target!(|input: GameInput| {
    let config = EngineConfig {
        seed: input.seed,
        ..EngineConfig::default()
    };
    let Ok(world) = World::classic() else {
        return;
    };
    let Ok(mut engine) = GameEngine::new(world, config) else {
        return;
    };

    for (use_active, fuzz_command) in input.commands.iter().take(500) {
        let player = if *use_active {
            engine.active()
        } else {
            engine.active().opponent()
        };
        let command = to_command(engine.world(), fuzz_command);

        let before = board(&engine);
        let reserves = PlayerId::ALL.map(|p| engine.player(p).reserve);
        let was_over = engine.is_over();

        match engine.apply(player, &command) {
            Ok(_) => {
                assert!(!was_over, "command accepted after the game ended");
                let violations = check_invariants(&engine);
                assert!(violations.is_empty(), "invariants violated: {violations:?}");
            }
            Err(_) => {
                assert_eq!(board(&engine), before, "rejected {command} changed the board");
                assert_eq!(PlayerId::ALL.map(|p| engine.player(p).reserve), reserves);
            }
        }
    }
});
