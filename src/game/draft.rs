//! Random initial distribution of territories and troops.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SetupError;
use crate::game::{PlayerId, TerritoryId, World};

/// Troops each player starts with, garrisons included.
pub const DEFAULT_STARTING_TROOPS: u32 = 40;

/// Split the territories evenly at random and scatter each player's
/// `starting_troops` over what they drew.
///
/// Every territory gets one troop first; the remainder is dropped in random
/// chunks on random owned territories until none is left. With an odd number
/// of territories the second player draws the extra one.
///
/// # Errors
///
/// Fails if there are fewer than two territories or `starting_troops` cannot
/// garrison a player's share.
pub fn random_draft<R: Rng + ?Sized>(
    world: &mut World,
    starting_troops: u32,
    rng: &mut R,
) -> Result<(), SetupError> {
    if world.len() < 2 {
        return Err(SetupError::TooFewTerritories(world.len()));
    }

    let mut order: Vec<TerritoryId> = world.ids().collect();
    order.shuffle(rng);
    let (first, second) = order.split_at(order.len() / 2);

    for (player, share) in [(PlayerId::One, first), (PlayerId::Two, second)] {
        let mut remaining = u32::try_from(share.len())
            .ok()
            .and_then(|garrisons| starting_troops.checked_sub(garrisons))
            .ok_or(SetupError::NotEnoughTroops {
                player,
                troops: starting_troops,
                territories: share.len(),
            })?;

        for &id in share {
            world.place(id, player, 1);
        }

        while remaining > 0 {
            let Some(&id) = share.choose(rng) else {
                break;
            };
            let extra = rng.gen_range(0..=remaining);
            let troops = world.territory(id).troops() + extra;
            world.set_troops(id, troops);
            remaining -= extra;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_draft_splits_evenly_and_places_all_troops() {
        let mut world = World::classic().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        random_draft(&mut world, DEFAULT_STARTING_TROOPS, &mut rng).unwrap();

        for player in PlayerId::ALL {
            assert_eq!(world.owned_count(player), 21);
            assert_eq!(world.troops_of(player), DEFAULT_STARTING_TROOPS);
        }
        assert!(world.territories().all(|(_, t)| t.owner().is_some() && t.troops() >= 1));
    }

    #[test]
    fn test_draft_is_deterministic_for_seed() {
        let draft = |seed| {
            let mut world = World::classic().unwrap();
            random_draft(&mut world, 40, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            world
                .territories()
                .map(|(_, t)| (t.owner(), t.troops()))
                .collect::<Vec<_>>()
        };
        assert_eq!(draft(11), draft(11));
        assert_ne!(draft(11), draft(12));
    }

    #[test]
    fn test_draft_rejects_too_few_troops() {
        let mut world = World::classic().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = random_draft(&mut world, 20, &mut rng).unwrap_err();
        assert!(matches!(err, SetupError::NotEnoughTroops { territories: 21, .. }));
    }
}
