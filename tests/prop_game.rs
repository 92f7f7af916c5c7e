//! Property-based tests for combat, world ownership and connectivity.
//!
//! Run with: cargo test --release prop_game

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use conquest::agent::Agent;
use conquest::game::{
    ConnectivityMatrix, Outcome, TerritoryId, can_attack, check_invariants, defender_dice,
    is_connected, resolve,
};
use conquest::sync::StateRecord;
use conquest::{Command, EngineConfig, GameEngine, PlayerId, RandomAgent, World};

/// Classic world with the territories flagged in `owners` given to P1, the
/// rest to P2.
fn split_world(owners: &[bool]) -> World {
    let mut world = World::classic().unwrap();
    let ids: Vec<TerritoryId> = world.ids().collect();
    for (id, &mine) in ids.into_iter().zip(owners) {
        let owner = if mine { PlayerId::One } else { PlayerId::Two };
        world.place(id, owner, 1);
    }
    world
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Losses are bounded by the compared pairs and never exceed the troops present.
    #[test]
    fn prop_combat_accounting(
        attacker in 2u32..200,
        defender in 1u32..200,
        dice in 1u32..=3,
        seed in any::<u64>()
    ) {
        prop_assume!(can_attack(attacker, dice));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = resolve(attacker, defender, dice, &mut rng);

        let pairs = dice.min(defender_dice(defender));
        prop_assert_eq!(outcome.attacker_losses + outcome.defender_losses, pairs);
        prop_assert!(outcome.attacker_losses < attacker);
        prop_assert!(outcome.defender_losses <= defender);
        prop_assert_eq!(outcome.conquered, outcome.defender_losses == defender);

        // Board troops never grow from combat.
        let after = (attacker - outcome.attacker_losses) + (defender - outcome.defender_losses);
        prop_assert!(after < attacker + defender);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Region ownership is a pure function of the board.
    #[test]
    fn prop_region_owner_idempotent(owners in prop::collection::vec(any::<bool>(), 42)) {
        let world = split_world(&owners);
        for (id, region) in world.regions() {
            let first = world.region_owner(id);
            prop_assert_eq!(first, world.region_owner(id));

            let expected = PlayerId::ALL.into_iter().find(|&p| {
                region
                    .members()
                    .iter()
                    .all(|&t| world.territory(t).owner() == Some(p))
            });
            prop_assert_eq!(first, expected);
        }
    }

    /// The connectivity matrix is symmetric and agrees with a direct search.
    #[test]
    fn prop_matrix_symmetric(
        owners in prop::collection::vec(any::<bool>(), 42),
        player in prop::sample::select(PlayerId::ALL.to_vec())
    ) {
        let world = split_world(&owners);
        let matrix = ConnectivityMatrix::compute(&world, player);
        prop_assert!(matrix.is_symmetric());

        let owned = matrix.owned().to_vec();
        for &a in &owned {
            prop_assert!(!matrix.get(a, a));
            for &b in &owned {
                if a != b {
                    prop_assert_eq!(matrix.get(a, b), matrix.get(b, a));
                    prop_assert_eq!(matrix.get(a, b), is_connected(&world, player, a, b));
                }
            }
        }
    }

    /// Fortify moves are accepted exactly when a troop stays behind.
    #[test]
    fn prop_fortify_keeps_a_troop(garrison in 1u32..20, count in 0u32..25) {
        let mut world = split_world(&[true; 42]);
        let argentina = world.id("Argentina").unwrap();
        world.place(argentina, PlayerId::Two, 1);
        let alaska = world.id("Alaska").unwrap();
        world.place(alaska, PlayerId::One, garrison);

        let mut engine =
            GameEngine::from_position(world, PlayerId::One, EngineConfig::default()).unwrap();
        engine.apply(PlayerId::One, &Command::PassTurn).unwrap();
        engine.apply(PlayerId::One, &Command::PassTurn).unwrap();

        let result = engine.apply(PlayerId::One, &Command::move_troops(count, "Alaska", "Alberta"));
        prop_assert_eq!(result.is_ok(), count < garrison);
        prop_assert!(engine.world().territory(alaska).troops() >= 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Random agents never break the game invariants, whatever they send.
    #[test]
    fn prop_random_games_hold_invariants(seed in any::<u64>(), steps in 50usize..400) {
        let config = EngineConfig { seed, ..EngineConfig::default() };
        let mut engine = GameEngine::new(World::classic().unwrap(), config).unwrap();
        let mut agents = [RandomAgent::new(seed ^ 1), RandomAgent::new(seed ^ 2)];
        let mut count = 0;

        for _ in 0..steps {
            if engine.is_over() {
                break;
            }
            let active = engine.active();
            engine.refresh_analysis();
            count += 1;
            let state = StateRecord::capture(&engine, active, count);
            let command = agents[active.index()].decide(&state);

            let board_before = engine.world().troops_of(PlayerId::One)
                + engine.world().troops_of(PlayerId::Two);
            let outcome = engine.apply(active, &command);
            let board_after = engine.world().troops_of(PlayerId::One)
                + engine.world().troops_of(PlayerId::Two);

            match outcome {
                Ok(Outcome::Attacked { .. } | Outcome::Won { .. }) => {
                    prop_assert!(board_after < board_before);
                }
                Ok(Outcome::Placed { count, .. }) => {
                    prop_assert_eq!(board_after, board_before + count);
                }
                Ok(_) => prop_assert_eq!(board_after, board_before),
                Err(_) => prop_assert_eq!(board_after, board_before),
            }
            prop_assert!(check_invariants(&engine).is_empty());
        }
    }
}
