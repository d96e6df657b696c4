//! Exclusive, advisory claims on shared world resources.
//!
//! The [`ReservationManager`] grants each [`Resource`] to at most one agent
//! at a time. Claims are advisory: nothing stops an agent from walking onto
//! a reserved tile, but every hauling step checks the claim before acting.
//! Tasks release everything they hold when they end.

use std::collections::BTreeMap;

use stowage_types::{AgentId, CellId, ItemId, Position};
use tracing::debug;

/// Something an agent can claim exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    /// A storage cell (the destination of a haul).
    Cell(CellId),
    /// A path tile (e.g. a doorway or narrow corridor).
    Tile(Position),
    /// A loose item another agent means to pick up.
    Item(ItemId),
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Cell(id) => write!(f, "cell {id}"),
            Self::Tile(pos) => write!(f, "tile {pos}"),
            Self::Item(id) => write!(f, "item {id}"),
        }
    }
}

/// Grants and releases resource claims.
///
/// At most one live claim exists per resource; the map structure enforces it.
#[derive(Debug, Clone, Default)]
pub struct ReservationManager {
    claims: BTreeMap<Resource, AgentId>,
}

impl ReservationManager {
    /// Create a manager with no claims.
    pub const fn new() -> Self {
        Self {
            claims: BTreeMap::new(),
        }
    }

    /// Claim `resource` for `agent`.
    ///
    /// Returns `true` if the claim is now held by `agent` (including when it
    /// already was), `false` if another agent holds it.
    pub fn reserve(&mut self, agent: AgentId, resource: Resource) -> bool {
        match self.claims.get(&resource) {
            Some(&holder) if holder == agent => true,
            Some(&holder) => {
                debug!(%agent, %holder, %resource, "reservation denied");
                false
            }
            None => {
                self.claims.insert(resource, agent);
                debug!(%agent, %resource, "reservation granted");
                true
            }
        }
    }

    /// Release `agent`'s claim on `resource`. Claims held by other agents are
    /// left alone. Returns whether anything was released.
    pub fn release(&mut self, agent: AgentId, resource: Resource) -> bool {
        if self.claims.get(&resource) == Some(&agent) {
            self.claims.remove(&resource);
            debug!(%agent, %resource, "reservation released");
            return true;
        }
        false
    }

    /// Release every claim `agent` holds. Returns how many were released.
    pub fn release_all(&mut self, agent: AgentId) -> usize {
        let before = self.claims.len();
        self.claims.retain(|_, holder| *holder != agent);
        let released = before.saturating_sub(self.claims.len());
        if released > 0 {
            debug!(%agent, released, "released all reservations");
        }
        released
    }

    /// The agent holding `resource`, if any.
    pub fn holder(&self, resource: Resource) -> Option<AgentId> {
        self.claims.get(&resource).copied()
    }

    /// Whether `agent` could claim `resource` right now.
    pub fn can_reserve(&self, agent: AgentId, resource: Resource) -> bool {
        self.holder(resource).is_none_or(|holder| holder == agent)
    }

    /// Every resource `agent` currently holds.
    pub fn held_by(&self, agent: AgentId) -> Vec<Resource> {
        self.claims
            .iter()
            .filter(|(_, holder)| **holder == agent)
            .map(|(resource, _)| *resource)
            .collect()
    }

    /// Path tiles claimed by anyone other than `agent`.
    pub fn tiles_blocked_for(&self, agent: AgentId) -> std::collections::BTreeSet<Position> {
        self.claims
            .iter()
            .filter(|(_, holder)| **holder != agent)
            .filter_map(|(resource, _)| match resource {
                Resource::Tile(pos) => Some(*pos),
                Resource::Cell(_) | Resource::Item(_) => None,
            })
            .collect()
    }

    /// Number of live claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no claims are live.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claim_wins() {
        let mut reservations = ReservationManager::new();
        let cell = Resource::Cell(CellId::new());
        let a = AgentId::new();
        let b = AgentId::new();
        assert!(reservations.reserve(a, cell));
        assert!(!reservations.reserve(b, cell));
        assert_eq!(reservations.holder(cell), Some(a));
    }

    #[test]
    fn reserving_twice_is_idempotent() {
        let mut reservations = ReservationManager::new();
        let cell = Resource::Cell(CellId::new());
        let a = AgentId::new();
        assert!(reservations.reserve(a, cell));
        assert!(reservations.reserve(a, cell));
        assert_eq!(reservations.len(), 1);
    }

    #[test]
    fn release_by_non_holder_is_ignored() {
        let mut reservations = ReservationManager::new();
        let cell = Resource::Cell(CellId::new());
        let a = AgentId::new();
        let b = AgentId::new();
        reservations.reserve(a, cell);
        assert!(!reservations.release(b, cell));
        assert_eq!(reservations.holder(cell), Some(a));
        assert!(reservations.release(a, cell));
        assert!(reservations.can_reserve(b, cell));
    }

    #[test]
    fn release_all_only_touches_one_agent() {
        let mut reservations = ReservationManager::new();
        let a = AgentId::new();
        let b = AgentId::new();
        reservations.reserve(a, Resource::Cell(CellId::new()));
        reservations.reserve(a, Resource::Tile(Position::new(1, 1)));
        reservations.reserve(b, Resource::Cell(CellId::new()));
        assert_eq!(reservations.release_all(a), 2);
        assert!(reservations.held_by(a).is_empty());
        assert_eq!(reservations.held_by(b).len(), 1);
    }

    #[test]
    fn tiles_blocked_excludes_own_claims() {
        let mut reservations = ReservationManager::new();
        let a = AgentId::new();
        let b = AgentId::new();
        reservations.reserve(a, Resource::Tile(Position::new(1, 0)));
        reservations.reserve(b, Resource::Tile(Position::new(2, 0)));
        let blocked = reservations.tiles_blocked_for(a);
        assert!(blocked.contains(&Position::new(2, 0)));
        assert!(!blocked.contains(&Position::new(1, 0)));
    }
}
