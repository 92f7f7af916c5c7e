//! World graph: territories, adjacency and regions.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::game::PlayerId;

/// The bundled 42-territory, 6-region world.
pub const CLASSIC_WORLD: &str = include_str!("../../worlds/classic.json");

/// Largest `extra_armies` a region may declare.
pub const MAX_REGION_BONUS: u32 = 1000;

/// Dense index of a territory within its [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerritoryId(u16);

impl TerritoryId {
    /// Position of the territory in the world's territory list.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Dense index of a region within its [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(u16);

impl RegionId {
    /// Position of the region in the world's region list.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// On-disk world description: region name to its members and bonus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldDefinition {
    /// Regions keyed by name.
    pub regions: BTreeMap<String, RegionDefinition>,
}

/// One region of a [`WorldDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDefinition {
    /// Member territories, each with its neighbour names.
    pub countries: BTreeMap<String, Vec<String>>,
    /// Bonus troops for holding every member.
    pub extra_armies: u32,
}

impl WorldDefinition {
    /// Parse a definition from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Parse`] if the text is not a valid definition.
    pub fn from_json(text: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a definition file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the file cannot be read and
    /// [`WorldError::Parse`] if it is not a valid definition.
    pub fn load(path: &Path) -> Result<Self, WorldError> {
        let text = fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

/// A single territory.
#[derive(Debug, Clone)]
pub struct Territory {
    name: String,
    region: RegionId,
    neighbours: Vec<TerritoryId>,
    owner: Option<PlayerId>,
    troops: u32,
}

impl Territory {
    /// Unique territory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Region the territory belongs to.
    #[must_use]
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// Adjacent territories, sorted by id.
    #[must_use]
    pub fn neighbours(&self) -> &[TerritoryId] {
        &self.neighbours
    }

    /// Current owner, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Troops stationed here.
    #[must_use]
    pub const fn troops(&self) -> u32 {
        self.troops
    }
}

/// A group of territories that grants a bonus to whoever holds all of them.
#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    members: Vec<TerritoryId>,
    bonus: u32,
}

impl Region {
    /// Region name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member territories.
    #[must_use]
    pub fn members(&self) -> &[TerritoryId] {
        &self.members
    }

    /// Reinforcement bonus for holding the whole region.
    #[must_use]
    pub const fn bonus(&self) -> u32 {
        self.bonus
    }
}

/// The world graph.
///
/// Adjacency and region membership are fixed at construction. Ownership and
/// troop counts mutate; every ownership change bumps [`World::revision`] so
/// derived per-player analysis knows when it is stale.
#[derive(Debug, Clone)]
pub struct World {
    territories: Vec<Territory>,
    regions: Vec<Region>,
    index: HashMap<String, TerritoryId>,
    revision: u64,
}

impl World {
    /// Build and validate a world from its definition.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if a region is empty or its bonus exceeds
    /// [`MAX_REGION_BONUS`], a territory is listed twice, a neighbour is
    /// unknown or the territory itself, or adjacency is not symmetric.
    pub fn from_definition(definition: &WorldDefinition) -> Result<Self, WorldError> {
        let mut territories: Vec<Territory> = Vec::new();
        let mut regions = Vec::with_capacity(definition.regions.len());
        let mut index: HashMap<String, TerritoryId> = HashMap::new();

        for (region_index, (region_name, region_def)) in definition.regions.iter().enumerate() {
            if region_def.countries.is_empty() {
                return Err(WorldError::EmptyRegion(region_name.clone()));
            }
            if region_def.extra_armies > MAX_REGION_BONUS {
                return Err(WorldError::BonusTooLarge {
                    region: region_name.clone(),
                    bonus: region_def.extra_armies,
                    max: MAX_REGION_BONUS,
                });
            }
            let region = RegionId(
                u16::try_from(region_index)
                    .map_err(|_| WorldError::TooLarge(definition.regions.len()))?,
            );
            let mut members = Vec::with_capacity(region_def.countries.len());
            for name in region_def.countries.keys() {
                if let Some(existing) = index.get(name) {
                    let first: &Region = &regions[territories[existing.index()].region.index()];
                    return Err(WorldError::DuplicateTerritory {
                        territory: name.clone(),
                        first: first.name.clone(),
                        second: region_name.clone(),
                    });
                }
                let id = TerritoryId(
                    u16::try_from(territories.len())
                        .map_err(|_| WorldError::TooLarge(territories.len() + 1))?,
                );
                index.insert(name.clone(), id);
                members.push(id);
                territories.push(Territory {
                    name: name.clone(),
                    region,
                    neighbours: Vec::new(),
                    owner: None,
                    troops: 0,
                });
            }
            regions.push(Region {
                name: region_name.clone(),
                members,
                bonus: region_def.extra_armies,
            });
        }

        if territories.is_empty() {
            return Err(WorldError::Empty);
        }

        for region_def in definition.regions.values() {
            for (name, neighbour_names) in &region_def.countries {
                let id = index[name];
                let mut neighbours = Vec::with_capacity(neighbour_names.len());
                for neighbour in neighbour_names {
                    if neighbour == name {
                        return Err(WorldError::SelfAdjacent(name.clone()));
                    }
                    let Some(&neighbour_id) = index.get(neighbour) else {
                        return Err(WorldError::UnknownNeighbour {
                            territory: name.clone(),
                            neighbour: neighbour.clone(),
                        });
                    };
                    neighbours.push(neighbour_id);
                }
                neighbours.sort_unstable();
                neighbours.dedup();
                territories[id.index()].neighbours = neighbours;
            }
        }

        for territory in &territories {
            for &neighbour in &territory.neighbours {
                let other = &territories[neighbour.index()];
                if other.neighbours.binary_search(&index[&territory.name]).is_err() {
                    return Err(WorldError::AsymmetricAdjacency {
                        from: territory.name.clone(),
                        to: other.name.clone(),
                    });
                }
            }
        }

        Ok(Self {
            territories,
            regions,
            index,
            revision: 0,
        })
    }

    /// Parse and build a world from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if the text is not a valid world.
    pub fn from_json(text: &str) -> Result<Self, WorldError> {
        Self::from_definition(&WorldDefinition::from_json(text)?)
    }

    /// Load a world from a definition file.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if the file cannot be read or is not a valid world.
    pub fn load(path: &Path) -> Result<Self, WorldError> {
        Self::from_definition(&WorldDefinition::load(path)?)
    }

    /// The bundled classic world.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded definition is corrupt.
    pub fn classic() -> Result<Self, WorldError> {
        Self::from_json(CLASSIC_WORLD)
    }

    /// Number of territories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// Whether the world has no territories. Never true for a constructed world.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Resolve a territory name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<TerritoryId> {
        self.index.get(name).copied()
    }

    /// Territory by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to a different world.
    #[must_use]
    pub fn territory(&self, id: TerritoryId) -> &Territory {
        &self.territories[id.index()]
    }

    /// Region by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to a different world.
    #[must_use]
    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    /// Name of a territory.
    #[must_use]
    pub fn name(&self, id: TerritoryId) -> &str {
        &self.territory(id).name
    }

    /// All territory ids in index order.
    #[allow(clippy::cast_possible_truncation)] // construction caps the count at u16
    pub fn ids(&self) -> impl Iterator<Item = TerritoryId> + '_ {
        (0..self.territories.len()).map(|i| TerritoryId(i as u16))
    }

    /// All territories with their ids.
    #[allow(clippy::cast_possible_truncation)]
    pub fn territories(&self) -> impl Iterator<Item = (TerritoryId, &Territory)> {
        self.territories
            .iter()
            .enumerate()
            .map(|(i, t)| (TerritoryId(i as u16), t))
    }

    /// All regions with their ids.
    #[allow(clippy::cast_possible_truncation)]
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, r)| (RegionId(i as u16), r))
    }

    /// Whether two territories share a border.
    #[must_use]
    pub fn are_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.territory(a).neighbours.binary_search(&b).is_ok()
    }

    /// Territories owned by `player`, in index order.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = TerritoryId> + '_ {
        self.territories()
            .filter(move |(_, t)| t.owner == Some(player))
            .map(|(id, _)| id)
    }

    /// Number of territories owned by `player`.
    #[must_use]
    pub fn owned_count(&self, player: PlayerId) -> usize {
        self.territories
            .iter()
            .filter(|t| t.owner == Some(player))
            .count()
    }

    /// Troops on every territory owned by `player`.
    #[must_use]
    pub fn troops_of(&self, player: PlayerId) -> u32 {
        self.territories
            .iter()
            .filter(|t| t.owner == Some(player))
            .map(|t| t.troops)
            .sum()
    }

    /// Owner of a region: the common owner of all members, if there is one.
    ///
    /// This is the only place region ownership is computed.
    #[must_use]
    pub fn region_owner(&self, region: RegionId) -> Option<PlayerId> {
        let mut owners = self
            .region(region)
            .members
            .iter()
            .map(|&id| self.territory(id).owner);
        let first = owners.next()??;
        owners.all(|owner| owner == Some(first)).then_some(first)
    }

    /// Sum of the bonuses of every region held by `player`.
    #[must_use]
    pub fn region_bonus_for(&self, player: PlayerId) -> u32 {
        self.regions()
            .filter(|&(id, _)| self.region_owner(id) == Some(player))
            .fold(0, |total, (_, r)| total.saturating_add(r.bonus))
    }

    /// Ownership revision; bumped on every owner change.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Set a territory's owner and troops.
    ///
    /// Setup-only: meant for building positions before they are handed to
    /// [`GameEngine::from_position`](crate::GameEngine::from_position). Once a
    /// game is running, the engine is the only thing that should move troops.
    pub fn place(&mut self, id: TerritoryId, owner: PlayerId, troops: u32) {
        let territory = &mut self.territories[id.index()];
        if territory.owner != Some(owner) {
            territory.owner = Some(owner);
            self.revision += 1;
        }
        territory.troops = troops;
    }

    pub(crate) fn set_troops(&mut self, id: TerritoryId, troops: u32) {
        self.territories[id.index()].troops = troops;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny(json: &str) -> Result<World, WorldError> {
        World::from_json(json)
    }

    #[test]
    fn test_classic_world_loads() {
        let world = World::classic().unwrap();
        assert_eq!(world.len(), 42);
        assert_eq!(world.regions().count(), 6);

        let bonuses: BTreeMap<&str, u32> =
            world.regions().map(|(_, r)| (r.name(), r.bonus())).collect();
        assert_eq!(bonuses["North America"], 5);
        assert_eq!(bonuses["South America"], 2);
        assert_eq!(bonuses["Australia"], 2);
        assert_eq!(bonuses["Europe"], 5);
        assert_eq!(bonuses["Asia"], 7);
        assert_eq!(bonuses["Africa"], 3);
    }

    #[test]
    fn test_classic_adjacency_is_symmetric() {
        let world = World::classic().unwrap();
        for (id, territory) in world.territories() {
            for &n in territory.neighbours() {
                assert!(world.are_adjacent(n, id), "{} -> {}", territory.name(), world.name(n));
            }
        }
        let alaska = world.id("Alaska").unwrap();
        let kamchatka = world.id("Kamchatka").unwrap();
        assert!(world.are_adjacent(alaska, kamchatka));
    }

    #[test]
    fn test_unknown_neighbour_rejected() {
        let err = tiny(r#"{"R": {"countries": {"A": ["B"]}, "extra_armies": 1}}"#).unwrap_err();
        assert!(matches!(err, WorldError::UnknownNeighbour { .. }));
    }

    #[test]
    fn test_asymmetric_adjacency_rejected() {
        let err = tiny(r#"{"R": {"countries": {"A": ["B"], "B": []}, "extra_armies": 1}}"#)
            .unwrap_err();
        assert!(matches!(err, WorldError::AsymmetricAdjacency { .. }));
    }

    #[test]
    fn test_self_adjacency_rejected() {
        let err = tiny(r#"{"R": {"countries": {"A": ["A"]}, "extra_armies": 1}}"#).unwrap_err();
        assert!(matches!(err, WorldError::SelfAdjacent(name) if name == "A"));
    }

    #[test]
    fn test_territory_in_two_regions_rejected() {
        let err = tiny(
            r#"{"R1": {"countries": {"A": []}, "extra_armies": 1},
                "R2": {"countries": {"A": []}, "extra_armies": 1}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::DuplicateTerritory { .. }));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(matches!(tiny("{}").unwrap_err(), WorldError::Empty));
        assert!(matches!(
            tiny(r#"{"R": {"countries": {}, "extra_armies": 1}}"#).unwrap_err(),
            WorldError::EmptyRegion(_)
        ));
        assert!(matches!(tiny("[1, 2]").unwrap_err(), WorldError::Parse(_)));
    }

    #[test]
    fn test_oversized_region_bonus_rejected() {
        let err = tiny(
            r#"{"R1": {"countries": {"A": ["B"]}, "extra_armies": 4294967295},
                "R2": {"countries": {"B": ["A"]}, "extra_armies": 4294967295}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            WorldError::BonusTooLarge { region, bonus: u32::MAX, max: MAX_REGION_BONUS }
                if region == "R1"
        ));

        let mut world = tiny(
            r#"{"R1": {"countries": {"A": ["B"]}, "extra_armies": 1000},
                "R2": {"countries": {"B": ["A"]}, "extra_armies": 1000}}"#,
        )
        .unwrap();
        for id in world.ids().collect::<Vec<_>>() {
            world.place(id, PlayerId::One, 1);
        }
        assert_eq!(world.region_bonus_for(PlayerId::One), 2 * MAX_REGION_BONUS);
    }

    #[test]
    fn test_duplicate_neighbours_collapsed() {
        let world =
            tiny(r#"{"R": {"countries": {"A": ["B", "B"], "B": ["A"]}, "extra_armies": 0}}"#)
                .unwrap();
        let a = world.id("A").unwrap();
        assert_eq!(world.territory(a).neighbours().len(), 1);
    }

    #[test]
    fn test_region_owner_requires_every_member() {
        let mut world = World::classic().unwrap();
        let (australia, region) = world
            .regions()
            .find(|(_, r)| r.name() == "Australia")
            .map(|(id, r)| (id, r.members().to_vec()))
            .unwrap();
        assert_eq!(world.region_owner(australia), None);

        for &id in &region[1..] {
            world.place(id, PlayerId::One, 1);
        }
        assert_eq!(world.region_owner(australia), None);

        world.place(region[0], PlayerId::Two, 1);
        assert_eq!(world.region_owner(australia), None);

        world.place(region[0], PlayerId::One, 1);
        assert_eq!(world.region_owner(australia), Some(PlayerId::One));
        assert_eq!(world.region_owner(australia), Some(PlayerId::One));
        assert_eq!(world.region_bonus_for(PlayerId::One), 2);
        assert_eq!(world.region_bonus_for(PlayerId::Two), 0);
    }

    #[test]
    fn test_revision_bumps_only_on_owner_change() {
        let mut world = World::classic().unwrap();
        let alaska = world.id("Alaska").unwrap();
        assert_eq!(world.revision(), 0);

        world.place(alaska, PlayerId::One, 3);
        assert_eq!(world.revision(), 1);

        world.place(alaska, PlayerId::One, 5);
        world.set_troops(alaska, 7);
        assert_eq!(world.revision(), 1);
        assert_eq!(world.territory(alaska).troops(), 7);

        world.place(alaska, PlayerId::Two, 1);
        assert_eq!(world.revision(), 2);
    }
}
