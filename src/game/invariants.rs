//! Game invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger after a command accepted by the engine. If
//! they do, it indicates a bug in a handler, not a bad command.

use thiserror::Error;

use crate::game::{GameEngine, PlayerId, TurnState};

/// Invariant violation error.
#[derive(Debug, Clone, Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(engine: &GameEngine) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let world = engine.world();

    for (id, territory) in world.territories() {
        if territory.owner().is_none() {
            violations.push(InvariantViolation {
                message: format!("Territory {} has no owner", territory.name()),
            });
        } else if territory.troops() == 0 {
            violations.push(InvariantViolation {
                message: format!("Territory {} is owned but has no troops", territory.name()),
            });
        }

        for &neighbour in territory.neighbours() {
            if !world.are_adjacent(neighbour, id) {
                violations.push(InvariantViolation {
                    message: format!(
                        "Adjacency {} -> {} is not symmetric",
                        territory.name(),
                        world.name(neighbour)
                    ),
                });
            }
        }
    }

    // Troop totals match the board
    for player in PlayerId::ALL {
        let on_board = world.troops_of(player);
        let counted = engine.player(player).total_troops;
        if on_board != counted {
            violations.push(InvariantViolation {
                message: format!(
                    "{player} has {on_board} troops on the board but counts {counted}"
                ),
            });
        }
    }

    // Exactly one player acts until the game is decided
    let active = engine.active();
    let waiting = engine.state(active.opponent());
    if engine.is_over() {
        if engine.winner().is_none() || !waiting.is_terminal() {
            violations.push(InvariantViolation {
                message: format!(
                    "Game over but states are {} and {}",
                    engine.state(active),
                    waiting
                ),
            });
        }
    } else if engine.state(active) == TurnState::Waiting || waiting != TurnState::Waiting {
        violations.push(InvariantViolation {
            message: format!(
                "Active player {active} is {} while the opponent is {waiting}",
                engine.state(active)
            ),
        });
    }

    // A pending conquest exists exactly while conquering
    let conquering = engine.state(active) == TurnState::Conquering;
    match engine.conquest() {
        Some(conquest) if conquering => {
            let owner = |id| world.territory(id).owner();
            if owner(conquest.from) != Some(active) || owner(conquest.to) != Some(active) {
                violations.push(InvariantViolation {
                    message: format!(
                        "Conquest {} -> {} is not held by {active}",
                        world.name(conquest.from),
                        world.name(conquest.to)
                    ),
                });
            }
        }
        None if !conquering => {}
        pending => {
            violations.push(InvariantViolation {
                message: format!(
                    "Pending conquest {pending:?} while {active} is {}",
                    engine.state(active)
                ),
            });
        }
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(engine: &GameEngine) {
    let violations = check_invariants(engine);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_engine: &GameEngine) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Command, EngineConfig, World};

    fn create_valid_game() -> GameEngine {
        GameEngine::new(World::classic().unwrap(), EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_valid_game_passes() {
        let game = create_valid_game();
        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_valid_after_full_turn() {
        let mut game = create_valid_game();
        let first = game.active();
        for _ in 0..3 {
            game.apply(first, &Command::PassTurn).unwrap();
        }
        assert_eq!(game.active(), first.opponent());
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_tampered_troops_detected() {
        let mut game = create_valid_game();
        let id = game.world().owned_by(PlayerId::One).next().unwrap();
        let troops = game.world().territory(id).troops();
        game.world.set_troops(id, troops + 1);

        let violations = check_invariants(&game);
        assert_eq!(violations.len(), 1, "{violations:?}");
        assert!(violations[0].message.contains("troops on the board"));
        assert!(violations[0].to_string().starts_with("Invariant violation: P1 has"));
    }

    #[test]
    fn test_empty_garrison_detected() {
        let mut game = create_valid_game();
        let id = game.world().owned_by(PlayerId::Two).next().unwrap();
        game.world.set_troops(id, 0);

        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("no troops")));
    }

    #[test]
    fn test_stray_conquest_detected() {
        let mut game = create_valid_game();
        let id = game.world().owned_by(game.active()).next().unwrap();
        game.conquest = Some(crate::game::Conquest { from: id, to: id });

        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("Pending conquest")));
    }
}
