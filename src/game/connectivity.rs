//! Border and connectivity analysis over one player's territory.
//!
//! Both structures are derived from the world and cached per player in an
//! [`Analysis`], which is recomputed only when the world's ownership revision
//! has moved past the one it was computed at.

use std::collections::BTreeMap;

use crate::game::{PlayerId, TerritoryId, World};

/// Owned territory to the adjacent territories the player does not own.
/// Territories with no foreign neighbour are omitted.
pub type BorderMap = BTreeMap<TerritoryId, Vec<TerritoryId>>;

/// Compute the border map of `player`.
#[must_use]
pub fn border_map(world: &World, player: PlayerId) -> BorderMap {
    world
        .owned_by(player)
        .filter_map(|id| {
            let foreign: Vec<TerritoryId> = world
                .territory(id)
                .neighbours()
                .iter()
                .copied()
                .filter(|&n| world.territory(n).owner() != Some(player))
                .collect();
            (!foreign.is_empty()).then_some((id, foreign))
        })
        .collect()
}

/// Whether `from` and `to` are joined by a path of territories all owned by
/// `player`. Iterative depth-first search with a visited set local to the call.
#[must_use]
pub fn is_connected(world: &World, player: PlayerId, from: TerritoryId, to: TerritoryId) -> bool {
    let owned = |id: TerritoryId| world.territory(id).owner() == Some(player);
    if !owned(from) || !owned(to) {
        return false;
    }
    if from == to {
        return true;
    }

    let mut visited = vec![false; world.len()];
    let mut stack = vec![from];
    visited[from.index()] = true;

    while let Some(current) = stack.pop() {
        for &next in world.territory(current).neighbours() {
            if visited[next.index()] || !owned(next) {
                continue;
            }
            if next == to {
                return true;
            }
            visited[next.index()] = true;
            stack.push(next);
        }
    }
    false
}

/// Pairwise owned-only reachability between a player's territories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityMatrix {
    /// Owned territories, sorted; row/column order of `reach`.
    owned: Vec<TerritoryId>,
    /// Row-major `owned.len()` squared reachability flags.
    reach: Vec<bool>,
    searches: usize,
}

impl ConnectivityMatrix {
    /// Compute the matrix for `player`.
    ///
    /// One search runs per unordered pair and fills both directions.
    #[must_use]
    pub fn compute(world: &World, player: PlayerId) -> Self {
        let owned: Vec<TerritoryId> = world.owned_by(player).collect();
        let n = owned.len();
        let mut reach = vec![false; n * n];
        let mut searches = 0;

        for (i, &a) in owned.iter().enumerate() {
            for (j, &b) in owned.iter().enumerate().skip(i + 1) {
                searches += 1;
                let connected = is_connected(world, player, a, b);
                reach[i * n + j] = connected;
                reach[j * n + i] = connected;
            }
        }

        Self {
            owned,
            reach,
            searches,
        }
    }

    /// Whether `from` reaches `to`. False if either is not in the matrix or
    /// they are the same territory.
    #[must_use]
    pub fn get(&self, from: TerritoryId, to: TerritoryId) -> bool {
        match (self.position(from), self.position(to)) {
            (Some(i), Some(j)) if i != j => self.reach[i * self.owned.len() + j],
            _ => false,
        }
    }

    /// Territories covered by the matrix.
    #[must_use]
    pub fn owned(&self) -> &[TerritoryId] {
        &self.owned
    }

    /// Searches run to build the matrix.
    #[must_use]
    pub const fn searches(&self) -> usize {
        self.searches
    }

    /// Each covered territory with its reachability to every other one.
    pub fn rows(&self) -> impl Iterator<Item = (TerritoryId, Vec<(TerritoryId, bool)>)> + '_ {
        self.owned.iter().map(move |&from| {
            let row = self
                .owned
                .iter()
                .filter(|&&to| to != from)
                .map(|&to| (to, self.get(from, to)))
                .collect();
            (from, row)
        })
    }

    /// Whether reachability is the same in both directions for every pair.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        let n = self.owned.len();
        (0..n).all(|i| (0..n).all(|j| self.reach[i * n + j] == self.reach[j * n + i]))
    }

    fn position(&self, id: TerritoryId) -> Option<usize> {
        self.owned.binary_search(&id).ok()
    }
}

/// A player's cached border map and connectivity matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    borders: BorderMap,
    matrix: ConnectivityMatrix,
    computed_at: Option<u64>,
}

impl Analysis {
    /// Compute a fresh analysis.
    #[must_use]
    pub fn compute(world: &World, player: PlayerId) -> Self {
        Self {
            borders: border_map(world, player),
            matrix: ConnectivityMatrix::compute(world, player),
            computed_at: Some(world.revision()),
        }
    }

    /// Whether ownership changed since this analysis was computed.
    #[must_use]
    pub fn is_stale(&self, world: &World) -> bool {
        self.computed_at != Some(world.revision())
    }

    /// Recompute if stale. Returns whether any work was done.
    pub fn refresh(&mut self, world: &World, player: PlayerId) -> bool {
        if !self.is_stale(world) {
            return false;
        }
        *self = Self::compute(world, player);
        true
    }

    /// Border map.
    #[must_use]
    pub const fn borders(&self) -> &BorderMap {
        &self.borders
    }

    /// Connectivity matrix.
    #[must_use]
    pub const fn matrix(&self) -> &ConnectivityMatrix {
        &self.matrix
    }

    /// World revision the analysis reflects, if computed.
    #[must_use]
    pub const fn computed_at(&self) -> Option<u64> {
        self.computed_at
    }
}
