//! Dice combat resolution.
//!
//! The attacker commits 1 to 3 dice, the defender rolls up to 2. Dice are
//! sorted descending and compared pairwise; each pair costs the loser one
//! troop and ties go to the defender.

use rand::Rng;

/// Most dice an attacker may commit.
pub const MAX_ATTACK_DICE: u32 = 3;

/// Most dice a defender rolls.
pub const MAX_DEFENCE_DICE: u32 = 2;

/// Faces on a die.
pub const DIE_FACES: u8 = 6;

/// Losses from a single attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CombatOutcome {
    /// Troops the attacker lost.
    pub attacker_losses: u32,
    /// Troops the defender lost.
    pub defender_losses: u32,
    /// Whether the defender was wiped out.
    pub conquered: bool,
}

/// Dice the defender rolls when holding `defender_troops`.
#[must_use]
pub fn defender_dice(defender_troops: u32) -> u32 {
    defender_troops.min(MAX_DEFENCE_DICE)
}

/// Whether `attacker_troops` may attack with `dice` and keep a troop behind.
#[must_use]
pub const fn can_attack(attacker_troops: u32, dice: u32) -> bool {
    dice >= 1 && dice <= MAX_ATTACK_DICE && attacker_troops > 1 && attacker_troops > dice
}

/// Roll `count` dice, sorted highest first.
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<u8> {
    let mut rolls: Vec<u8> = (0..count).map(|_| rng.gen_range(1..=DIE_FACES)).collect();
    rolls.sort_unstable_by(|a, b| b.cmp(a));
    rolls
}

/// Compare sorted rolls pairwise.
///
/// Only the first `min(attack.len(), defence.len())` pairs count. The outcome
/// is conquering when the defender's losses equal `defender_troops`.
#[must_use]
pub fn compare_rolls(attack: &[u8], defence: &[u8], defender_troops: u32) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    for (a, d) in attack.iter().zip(defence) {
        if a > d {
            outcome.defender_losses += 1;
        } else {
            outcome.attacker_losses += 1;
        }
    }
    outcome.conquered = outcome.defender_losses >= defender_troops;
    outcome
}

/// Resolve one attack. Pure apart from the dice drawn from `rng`.
///
/// The caller is expected to have checked [`can_attack`].
pub fn resolve<R: Rng + ?Sized>(
    attacker_troops: u32,
    defender_troops: u32,
    dice: u32,
    rng: &mut R,
) -> CombatOutcome {
    debug_assert!(can_attack(attacker_troops, dice));
    let attack = roll_dice(rng, dice);
    let defence = roll_dice(rng, defender_dice(defender_troops));
    compare_rolls(&attack, &defence, defender_troops)
}
