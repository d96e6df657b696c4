//! Agent profiles and management.
//!
//! The [`AgentManager`] keeps each agent's [`AgentProfile`] (capacities,
//! carry capacity, and status flags) and its [`Loadout`]. Physical holdings
//! live in the world, not here.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use stowage_types::{AgentId, Capacity};
use stowage_world::ItemCatalog;
use tracing::debug;

use crate::encumbrance::hypothetical_encumbrance;
use crate::error::AgentError;
use crate::loadout::{Loadout, LoadoutState, extend_set};

/// Static and status data for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    /// Agent identity, shared with the world.
    pub id: AgentId,
    /// Display name (unique within a manager).
    pub name: String,
    /// Capacities the agent currently has.
    pub capacities: BTreeSet<Capacity>,
    /// Mass the agent can carry before being fully encumbered.
    pub carry_capacity: Decimal,
    /// Whether the agent is of a humanlike race.
    pub humanlike: bool,
    /// Whether the agent belongs to the player's colony.
    pub colonist: bool,
    /// Whether the agent is dead.
    pub dead: bool,
    /// Whether the agent is a temporary quest guest.
    pub quest_lodger: bool,
    /// Whether the agent wears apparel it may not remove.
    pub apparel_locked: bool,
}

impl AgentProfile {
    /// A healthy colonist with every capacity.
    pub fn new(name: &str, carry_capacity: Decimal) -> Self {
        Self {
            id: AgentId::new(),
            name: name.to_owned(),
            capacities: BTreeSet::from([Capacity::Manipulation, Capacity::Moving, Capacity::Sight]),
            carry_capacity,
            humanlike: true,
            colonist: true,
            dead: false,
            quest_lodger: false,
            apparel_locked: false,
        }
    }

    /// Whether the agent currently has `capacity`.
    pub fn capable_of(&self, capacity: Capacity) -> bool {
        self.capacities.contains(&capacity)
    }

    /// Whether the agent may be given a loadout.
    pub const fn is_valid_loadout_holder(&self) -> bool {
        self.humanlike && self.colonist && !self.dead && !self.quest_lodger && !self.apparel_locked
    }
}

/// Tracks agent profiles and their loadouts.
#[derive(Debug, Default)]
pub struct AgentManager {
    profiles: BTreeMap<AgentId, AgentProfile>,
    names_in_use: BTreeSet<String>,
    loadouts: BTreeMap<AgentId, Loadout>,
}

impl AgentManager {
    /// Create an empty manager.
    pub const fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
            names_in_use: BTreeSet::new(),
            loadouts: BTreeMap::new(),
        }
    }

    /// Register a profile. Names must be unique.
    pub fn register(&mut self, profile: AgentProfile) -> Result<AgentId, AgentError> {
        if self.profiles.contains_key(&profile.id) {
            return Err(AgentError::DuplicateAgent(profile.id));
        }
        if self.names_in_use.contains(&profile.name) {
            return Err(AgentError::DuplicateName(profile.name));
        }
        let id = profile.id;
        debug!(agent = %id, name = %profile.name, "agent registered");
        self.names_in_use.insert(profile.name.clone());
        self.profiles.insert(id, profile);
        Ok(id)
    }

    /// Forget an agent and its loadout.
    pub fn remove(&mut self, agent: AgentId) -> Result<AgentProfile, AgentError> {
        let profile = self
            .profiles
            .remove(&agent)
            .ok_or(AgentError::AgentNotFound(agent))?;
        self.names_in_use.remove(&profile.name);
        self.loadouts.remove(&agent);
        Ok(profile)
    }

    /// Look up a profile.
    pub fn get(&self, agent: AgentId) -> Option<&AgentProfile> {
        self.profiles.get(&agent)
    }

    /// Look up a profile, mutably.
    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut AgentProfile> {
        self.profiles.get_mut(&agent)
    }

    /// Every registered agent in id order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.profiles.keys().copied()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Whether the agent exists and currently has `capacity`.
    pub fn capable_of(&self, agent: AgentId, capacity: Capacity) -> bool {
        self.profiles
            .get(&agent)
            .is_some_and(|profile| profile.capable_of(capacity))
    }

    /// Grant or remove a capacity (injury, recovery).
    pub fn set_capacity(
        &mut self,
        agent: AgentId,
        capacity: Capacity,
        present: bool,
    ) -> Result<(), AgentError> {
        let profile = self
            .profiles
            .get_mut(&agent)
            .ok_or(AgentError::AgentNotFound(agent))?;
        if present {
            profile.capacities.insert(capacity);
        } else {
            profile.capacities.remove(&capacity);
        }
        debug!(%agent, ?capacity, present, "capacity changed");
        Ok(())
    }

    /// Give an agent a loadout, replacing any previous one.
    pub fn assign_loadout(&mut self, agent: AgentId, loadout: Loadout) -> Result<(), AgentError> {
        let profile = self
            .profiles
            .get(&agent)
            .ok_or(AgentError::AgentNotFound(agent))?;
        if !profile.is_valid_loadout_holder() {
            return Err(AgentError::NotLoadoutHolder(agent));
        }
        self.loadouts.insert(agent, loadout);
        Ok(())
    }

    /// The agent's loadout, if it has one.
    pub fn loadout(&self, agent: AgentId) -> Option<&Loadout> {
        self.loadouts.get(&agent)
    }

    /// The agent's active loadout state, if it has one.
    pub fn get_active_state(&self, agent: AgentId) -> Option<&LoadoutState> {
        self.loadouts.get(&agent)?.active_state()
    }

    /// Switch the agent's active loadout state.
    pub fn set_active_state(&mut self, agent: AgentId, state: &str) -> Result<(), AgentError> {
        let loadout = self
            .loadouts
            .get_mut(&agent)
            .ok_or(AgentError::NoLoadout(agent))?;
        if !loadout.activate(state) {
            return Err(AgentError::UnknownLoadoutState {
                agent,
                state: state.to_owned(),
            });
        }
        debug!(%agent, state, "loadout state activated");
        Ok(())
    }

    /// Agents grouped by the name of their active loadout state.
    pub fn holders_by_state(&self) -> BTreeMap<String, BTreeSet<AgentId>> {
        let mut groups = BTreeMap::new();
        for (agent, loadout) in &self.loadouts {
            if let Some(state) = loadout.active_state() {
                extend_set(&mut groups, state.name.clone(), [*agent]);
            }
        }
        groups
    }

    /// Encumbrance (0 to 1) the agent would have carrying exactly its active
    /// loadout state. `None` if it has no active state.
    pub fn active_state_encumbrance(
        &self,
        agent: AgentId,
        catalog: &ItemCatalog,
    ) -> Result<Option<Decimal>, AgentError> {
        let profile = self
            .profiles
            .get(&agent)
            .ok_or(AgentError::AgentNotFound(agent))?;
        let Some(state) = self.get_active_state(agent) else {
            return Ok(None);
        };
        hypothetical_encumbrance(profile, catalog, &state.items).map(Some)
    }
}
