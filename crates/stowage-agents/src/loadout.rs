//! Loadouts: named sets of desired items, grouped into switchable states.
//!
//! A [`LoadoutState`] lists [`LoadoutItem`]s (a filter plus a desired
//! quantity). An agent's [`Loadout`] holds several states and marks one as
//! active; whatever the agent carries beyond the active state's wishes is
//! surplus for the unload policy.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use stowage_types::{ItemKey, QualityCategory};

/// Which concrete items satisfy a loadout entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Required definition name.
    pub def: String,
    /// Required material, or any.
    pub stuff: Option<String>,
    /// Lowest acceptable quality, or any.
    pub min_quality: Option<QualityCategory>,
    /// Highest acceptable quality, or any.
    pub max_quality: Option<QualityCategory>,
}

impl ItemFilter {
    /// Filter accepting every item of a definition.
    pub fn any_of(def: &str) -> Self {
        Self {
            def: def.to_owned(),
            stuff: None,
            min_quality: None,
            max_quality: None,
        }
    }

    /// Whether an item with this key satisfies the filter.
    ///
    /// Items without a quality grade pass any quality bound.
    pub fn allows(&self, key: &ItemKey) -> bool {
        if key.def != self.def {
            return false;
        }
        if self.stuff.is_some() && key.stuff != self.stuff {
            return false;
        }
        let Some(quality) = key.quality else {
            return true;
        };
        self.min_quality.is_none_or(|min| quality >= min)
            && self.max_quality.is_none_or(|max| quality <= max)
    }

    /// The same filter with its quality bounds loosened by one grade each.
    pub fn widened(&self) -> Self {
        Self {
            min_quality: self.min_quality.map(QualityCategory::previous),
            max_quality: self.max_quality.map(QualityCategory::next),
            ..self.clone()
        }
    }
}

/// One line of a loadout state: "keep `quantity` of whatever `filter` allows".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutItem {
    /// What counts toward this line.
    pub filter: ItemFilter,
    /// Units the agent wants to keep.
    pub quantity: u32,
}

impl LoadoutItem {
    /// Create a loadout line.
    pub const fn new(filter: ItemFilter, quantity: u32) -> Self {
        Self { filter, quantity }
    }
}

/// A named set of desired items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutState {
    /// State name (e.g. "work", "combat").
    pub name: String,
    /// Desired items.
    pub items: Vec<LoadoutItem>,
}

impl LoadoutState {
    /// Create a state with no items.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            items: Vec::new(),
        }
    }

    /// Builder-style helper to add a line.
    #[must_use]
    pub fn with_item(mut self, item: LoadoutItem) -> Self {
        self.items.push(item);
        self
    }

    /// Units of `key` this state wants kept, summed over matching lines.
    pub fn desired_for(&self, key: &ItemKey) -> u32 {
        self.items
            .iter()
            .filter(|line| line.filter.allows(key))
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }
}

/// An agent's loadout: several states, at most one active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    states: BTreeMap<String, LoadoutState>,
    active: Option<String>,
}

impl Loadout {
    /// Create an empty loadout.
    pub const fn new() -> Self {
        Self {
            states: BTreeMap::new(),
            active: None,
        }
    }

    /// Add or replace a state. The first state added becomes active.
    pub fn insert_state(&mut self, state: LoadoutState) {
        if self.active.is_none() {
            self.active = Some(state.name.clone());
        }
        self.states.insert(state.name.clone(), state);
    }

    /// Look up a state by name.
    pub fn state(&self, name: &str) -> Option<&LoadoutState> {
        self.states.get(name)
    }

    /// The active state, if any.
    pub fn active_state(&self) -> Option<&LoadoutState> {
        self.states.get(self.active.as_deref()?)
    }

    /// Switch the active state. Returns `false` if no state has that name.
    pub fn activate(&mut self, name: &str) -> bool {
        if self.states.contains_key(name) {
            self.active = Some(name.to_owned());
            true
        } else {
            false
        }
    }

    /// Names of every state.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }
}

/// Insert `values` under `key`, extending the existing set if there is one.
pub fn extend_set<K, V, I>(map: &mut BTreeMap<K, BTreeSet<V>>, key: K, values: I)
where
    K: Ord,
    V: Ord,
    I: IntoIterator<Item = V>,
{
    map.entry(key).or_default().extend(values);
}
