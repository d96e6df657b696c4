//! Item definition catalog.
//!
//! The catalog maps definition names to [`ItemDef`] records and derives
//! the per-category def lists that loadout editors offer.

use std::collections::BTreeMap;

use stowage_types::{ItemCategory, ItemDef};

use crate::error::WorldError;

/// Registry of every item definition known to the world.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    defs: BTreeMap<String, ItemDef>,
}

impl ItemCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self {
            defs: BTreeMap::new(),
        }
    }

    /// Register a definition.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateDef`] if the name is already taken.
    pub fn insert(&mut self, def: ItemDef) -> Result<(), WorldError> {
        if self.defs.contains_key(&def.name) {
            return Err(WorldError::DuplicateDef(def.name));
        }
        self.defs.insert(def.name.clone(), def);
        Ok(())
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&ItemDef> {
        self.defs.get(name)
    }

    /// Look up a definition by name, failing if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownDef`] if no such definition exists.
    pub fn require(&self, name: &str) -> Result<&ItemDef, WorldError> {
        self.defs
            .get(name)
            .ok_or_else(|| WorldError::UnknownDef(name.to_owned()))
    }

    /// Iterate over every definition in name order.
    pub fn defs(&self) -> impl Iterator<Item = &ItemDef> {
        self.defs.values()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Definition names partitioned by the kind of loadout slot they fill.
///
/// Every list holds only defs an agent could actually carry around:
/// haulable, player-acquirable, and not a frame, unfinished product,
/// minified building, corpse, or destroy-on-drop item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefLists {
    /// Worn apparel.
    pub apparel: Vec<String>,
    /// Melee weapons.
    pub melee_weapons: Vec<String>,
    /// Ranged weapons that are not buildings (turret guns are excluded).
    pub ranged_weapons: Vec<String>,
    /// Medicine and drugs.
    pub medicinal: Vec<String>,
    /// Everything else.
    pub items: Vec<String>,
}

impl DefLists {
    /// Partition the catalog into def lists.
    pub fn from_catalog(catalog: &ItemCatalog) -> Self {
        let mut lists = Self::default();
        for def in catalog.defs().filter(|def| is_loadout_candidate(def)) {
            let name = def.name.clone();
            match def.category {
                ItemCategory::Apparel => lists.apparel.push(name),
                ItemCategory::MeleeWeapon => lists.melee_weapons.push(name),
                ItemCategory::RangedWeapon if !def.is_building => lists.ranged_weapons.push(name),
                ItemCategory::Medicine | ItemCategory::Drug => lists.medicinal.push(name),
                ItemCategory::RangedWeapon | ItemCategory::Resource | ItemCategory::Food => {
                    lists.items.push(name);
                }
            }
        }
        lists
    }
}

const fn is_loadout_candidate(def: &ItemDef) -> bool {
    def.haulable
        && !def.is_frame
        && !def.destroy_on_drop
        && def.player_acquirable
        && !def.is_unfinished
        && !def.is_minified
        && !def.is_corpse
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        let defs = [
            ItemDef::new("steel", ItemCategory::Resource, dec!(0.5), 75),
            ItemDef::new("parka", ItemCategory::Apparel, dec!(3), 1),
            ItemDef::new("longsword", ItemCategory::MeleeWeapon, dec!(2), 1),
            ItemDef::new("rifle", ItemCategory::RangedWeapon, dec!(3.5), 1),
            ItemDef::new("medicine", ItemCategory::Medicine, dec!(0.5), 25),
            ItemDef::new("beer", ItemCategory::Drug, dec!(0.3), 25),
            ItemDef {
                is_building: true,
                ..ItemDef::new("turret_gun", ItemCategory::RangedWeapon, dec!(10), 1)
            },
            ItemDef {
                is_corpse: true,
                ..ItemDef::new("corpse", ItemCategory::Food, dec!(60), 1)
            },
            ItemDef {
                haulable: false,
                ..ItemDef::new("boulder", ItemCategory::Resource, dec!(100), 1)
            },
        ];
        for def in defs {
            assert!(catalog.insert(def).is_ok());
        }
        catalog
    }

    #[test]
    fn duplicate_def_rejected() {
        let mut catalog = catalog();
        let result = catalog.insert(ItemDef::new("steel", ItemCategory::Resource, dec!(1), 1));
        assert!(matches!(result, Err(WorldError::DuplicateDef(_))));
    }

    #[test]
    fn require_unknown_def_fails() {
        assert!(catalog().require("plasteel").is_err());
        assert!(catalog().require("steel").is_ok());
    }

    #[test]
    fn def_lists_partition_by_category() {
        let lists = DefLists::from_catalog(&catalog());
        assert_eq!(lists.apparel, vec!["parka".to_owned()]);
        assert_eq!(lists.melee_weapons, vec!["longsword".to_owned()]);
        assert_eq!(lists.ranged_weapons, vec!["rifle".to_owned()]);
        assert_eq!(lists.medicinal, vec!["beer".to_owned(), "medicine".to_owned()]);
    }

    #[test]
    fn def_lists_exclude_unhaulable_and_corpses() {
        let lists = DefLists::from_catalog(&catalog());
        assert!(!lists.items.contains(&"boulder".to_owned()));
        assert!(!lists.items.contains(&"corpse".to_owned()));
        assert!(lists.items.contains(&"steel".to_owned()));
        // Building-class ranged weapons fall through to the generic list.
        assert!(lists.items.contains(&"turret_gun".to_owned()));
    }
}
