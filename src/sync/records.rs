//! Wire records exchanged through a mailbox.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommandError;
use crate::game::{Analysis, Command, CommandKind, GameEngine, PlayerId, TurnState};

/// The `command` object of a command record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    /// Command name; empty in the initial record.
    pub name: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
}

/// What an agent writes to submit one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Submitting player.
    pub id: PlayerId,
    /// Sequence number; strictly increasing per player, 0 before any command.
    pub count: u64,
    /// The command itself.
    pub command: CommandPayload,
}

impl CommandRecord {
    /// The record present before an agent has submitted anything.
    #[must_use]
    pub fn initial(id: PlayerId) -> Self {
        Self {
            id,
            count: 0,
            command: CommandPayload {
                name: String::new(),
                args: Vec::new(),
            },
        }
    }

    /// Wrap `command` as submission number `count`.
    #[must_use]
    pub fn new(id: PlayerId, count: u64, command: &Command) -> Self {
        Self {
            id,
            count,
            command: command.into(),
        }
    }
}

impl From<&Command> for CommandPayload {
    fn from(command: &Command) -> Self {
        let args = match command {
            Command::Attack { dice, from, to } => {
                vec![(*dice).into(), from.as_str().into(), to.as_str().into()]
            }
            Command::MoveTroops { count, from, to } => {
                vec![(*count).into(), from.as_str().into(), to.as_str().into()]
            }
            Command::SetNewTroops { count, territory } => {
                vec![(*count).into(), territory.as_str().into()]
            }
            Command::PassTurn => Vec::new(),
        };
        Self {
            name: command.kind().as_str().to_string(),
            args,
        }
    }
}

impl TryFrom<&CommandPayload> for Command {
    type Error = CommandError;

    fn try_from(payload: &CommandPayload) -> Result<Self, Self::Error> {
        let kind = CommandKind::from_name(&payload.name)
            .ok_or_else(|| CommandError::UnknownCommand(payload.name.clone()))?;
        let bad = || CommandError::BadArguments {
            command: kind,
            expected: kind.signature(),
        };
        let number = |value: &Value| {
            value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(bad)
        };
        let name = |value: &Value| value.as_str().map(str::to_string).ok_or_else(bad);

        match (kind, payload.args.as_slice()) {
            (CommandKind::Attack, [dice, from, to]) => Ok(Self::Attack {
                dice: number(dice)?,
                from: name(from)?,
                to: name(to)?,
            }),
            (CommandKind::MoveTroops, [count, from, to]) => Ok(Self::MoveTroops {
                count: number(count)?,
                from: name(from)?,
                to: name(to)?,
            }),
            (CommandKind::SetNewTroops, [count, territory]) => Ok(Self::SetNewTroops {
                count: number(count)?,
                territory: name(territory)?,
            }),
            (CommandKind::PassTurn, []) => Ok(Self::PassTurn),
            _ => Err(bad()),
        }
    }
}

/// Public view of one territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryView {
    /// Adjacent territory names.
    pub neighbours: Vec<String>,
    /// Current owner.
    pub owner: Option<PlayerId>,
    /// Troops stationed.
    pub n_troops: u32,
}

/// Public view of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinentView {
    /// Player holding every member, if any.
    pub owner: Option<PlayerId>,
    /// Bonus for holding the region.
    pub extra_armies: u32,
    /// Member territory names.
    pub countries: Vec<String>,
}

/// Everything an agent sees of the game, from one player's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Publication number; strictly increasing per player.
    pub count: u64,
    /// Player the record is for.
    pub id: PlayerId,
    /// Reinforcements not yet placed.
    pub n_new_troops: u32,
    /// Troops on the board.
    pub n_total_troops: u32,
    /// Opponent's troops on the board.
    pub enemy_n_total_troops: u32,
    /// The player's turn state.
    pub state: TurnState,
    /// Names of owned territories.
    pub countries_owned: Vec<String>,
    /// Every territory by name.
    pub countries_data: BTreeMap<String, CountryView>,
    /// Owned territory to its foreign neighbours; interior territories omitted.
    pub border_countries: BTreeMap<String, Vec<String>>,
    /// Owned territory to every other owned territory: joined by an owned path?
    pub connection_matrix: BTreeMap<String, BTreeMap<String, bool>>,
    /// Every region by name.
    pub continents_data: BTreeMap<String, ContinentView>,
}

impl StateRecord {
    /// Snapshot the engine for `player` as publication number `count`.
    ///
    /// Uses the player's cached analysis when it is current and computes a
    /// fresh one otherwise.
    #[must_use]
    pub fn capture(engine: &GameEngine, player: PlayerId, count: u64) -> Self {
        let world = engine.world();
        let fresh;
        let analysis = if engine.analysis(player).is_stale(world) {
            fresh = Analysis::compute(world, player);
            &fresh
        } else {
            engine.analysis(player)
        };
        let name = |id| world.name(id).to_string();

        let countries_data = world
            .territories()
            .map(|(_, t)| {
                let view = CountryView {
                    neighbours: t.neighbours().iter().map(|&n| name(n)).collect(),
                    owner: t.owner(),
                    n_troops: t.troops(),
                };
                (t.name().to_string(), view)
            })
            .collect();

        let continents_data = world
            .regions()
            .map(|(id, r)| {
                let view = ContinentView {
                    owner: world.region_owner(id),
                    extra_armies: r.bonus(),
                    countries: r.members().iter().map(|&m| name(m)).collect(),
                };
                (r.name().to_string(), view)
            })
            .collect();

        let border_countries = analysis
            .borders()
            .iter()
            .map(|(&id, foreign)| (name(id), foreign.iter().map(|&n| name(n)).collect()))
            .collect();

        let connection_matrix = analysis
            .matrix()
            .rows()
            .map(|(from, row)| {
                let row = row.into_iter().map(|(to, linked)| (name(to), linked)).collect();
                (name(from), row)
            })
            .collect();

        let me = engine.player(player);
        Self {
            count,
            id: player,
            n_new_troops: me.reserve,
            n_total_troops: me.total_troops,
            enemy_n_total_troops: engine.player(player.opponent()).total_troops,
            state: engine.state(player),
            countries_owned: world.owned_by(player).map(name).collect(),
            countries_data,
            border_countries,
            connection_matrix,
            continents_data,
        }
    }

    /// Troops on a territory, zero if the name is unknown.
    #[must_use]
    pub fn troops(&self, territory: &str) -> u32 {
        self.countries_data
            .get(territory)
            .map_or(0, |view| view.n_troops)
    }

    /// Whether two owned territories are joined by an owned path.
    #[must_use]
    pub fn connected(&self, from: &str, to: &str) -> bool {
        self.connection_matrix
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{EngineConfig, World};
    use serde_json::json;

    fn payload(value: Value) -> CommandPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_each_command() {
        let attack = payload(json!({"name": "attack", "args": [2, "Alaska", "Kamchatka"]}));
        assert_eq!(
            Command::try_from(&attack).unwrap(),
            Command::attack(2, "Alaska", "Kamchatka")
        );

        let pass = payload(json!({"name": "pass_turn", "args": []}));
        assert_eq!(Command::try_from(&pass).unwrap(), Command::PassTurn);

        let place = payload(json!({"name": "set_new_troops", "args": [0, "Peru"]}));
        assert_eq!(Command::try_from(&place).unwrap(), Command::set_new_troops(0, "Peru"));
    }

    #[test]
    fn test_bad_payloads_rejected() {
        let unknown = payload(json!({"name": "retreat", "args": []}));
        assert_eq!(
            Command::try_from(&unknown),
            Err(CommandError::UnknownCommand("retreat".to_string()))
        );

        let initial = CommandRecord::initial(PlayerId::One);
        assert!(matches!(
            Command::try_from(&initial.command),
            Err(CommandError::UnknownCommand(name)) if name.is_empty()
        ));

        for args in [json!([-1, "Peru"]), json!(["1", "Peru"]), json!([1]), json!([1, 2])] {
            let bad = payload(json!({"name": "set_new_troops", "args": args}));
            assert!(matches!(
                Command::try_from(&bad),
                Err(CommandError::BadArguments {
                    command: CommandKind::SetNewTroops,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_command_record_wire_shape() {
        let command = Command::move_troops(3, "Peru", "Brazil");
        let record = CommandRecord::new(PlayerId::Two, 7, &command);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 2,
                "count": 7,
                "command": {"name": "move_troops", "args": [3, "Peru", "Brazil"]}
            })
        );
    }

    #[test]
    fn test_state_record_reflects_engine() {
        let engine = GameEngine::new(World::classic().unwrap(), EngineConfig::default()).unwrap();
        let player = engine.active();
        let record = StateRecord::capture(&engine, player, 1);

        assert_eq!(record.count, 1);
        assert_eq!(record.id, player);
        assert_eq!(record.state, TurnState::Mobilizing);
        assert_eq!(record.n_new_troops, engine.player(player).reserve);
        assert_eq!(record.countries_owned.len(), 21);
        assert_eq!(record.countries_data.len(), 42);
        assert_eq!(record.continents_data.len(), 6);
        assert_eq!(record.connection_matrix.len(), 21);
        assert!(record.connection_matrix.values().all(|row| row.len() == 20));
        for (name, foreign) in &record.border_countries {
            assert_eq!(record.countries_data[name].owner, Some(player));
            assert!(foreign
                .iter()
                .all(|n| record.countries_data[n].owner == Some(player.opponent())));
        }

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["state"], "mobilizing");
        assert_eq!(value["id"], json!(player.number()));
        assert!(value["countries_data"]["Alaska"]["n_troops"].is_u64());
    }
}
