//! Item containers with split/merge semantics.
//!
//! A [`Container`] is an ordered list of stacks. Taking part of a stack
//! splits it (the split-off part gets a fresh id); adding a stack whose key
//! matches an existing one merges into it.

use stowage_types::{ItemId, ItemKey, ItemStack};

use crate::error::WorldError;

/// An ordered collection of item stacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    stacks: Vec<ItemStack>,
}

impl Container {
    /// Create an empty container.
    pub const fn new() -> Self {
        Self { stacks: Vec::new() }
    }

    /// The stacks in insertion order.
    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    /// Whether the container holds nothing.
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Look up a stack by id.
    pub fn get(&self, item: ItemId) -> Option<&ItemStack> {
        self.stacks.iter().find(|s| s.id == item)
    }

    /// Look up a stack by id, mutably.
    pub fn get_mut(&mut self, item: ItemId) -> Option<&mut ItemStack> {
        self.stacks.iter_mut().find(|s| s.id == item)
    }

    /// Whether a stack with this id is present.
    pub fn contains(&self, item: ItemId) -> bool {
        self.get(item).is_some()
    }

    /// Total units held with the given key.
    pub fn count_of(&self, key: &ItemKey) -> u32 {
        self.stacks
            .iter()
            .filter(|s| &s.key == key)
            .fold(0_u32, |acc, s| acc.saturating_add(s.count))
    }

    /// How many more units of `key` can merge in before the count overflows.
    pub fn headroom_for(&self, key: &ItemKey) -> u32 {
        u32::MAX.saturating_sub(self.count_of(key))
    }

    /// Remove up to `amount` units of the stack `item`.
    ///
    /// Taking the whole stack moves it out with its id intact; taking part
    /// of it leaves the remainder in place and returns a new stack.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if the split underflows,
    /// which cannot happen for well-formed stacks.
    pub fn take(&mut self, item: ItemId, amount: u32) -> Result<Option<ItemStack>, WorldError> {
        let Some(index) = self.stacks.iter().position(|s| s.id == item) else {
            return Ok(None);
        };
        let Some(stack) = self.stacks.get_mut(index) else {
            return Ok(None);
        };
        if amount >= stack.count {
            return Ok(Some(self.stacks.remove(index)));
        }
        stack.count = stack
            .count
            .checked_sub(amount)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(Some(ItemStack {
            id: ItemId::new(),
            key: stack.key.clone(),
            count: amount,
            forbidden: stack.forbidden,
        }))
    }

    /// Add a stack, merging it into an existing stack with the same key.
    ///
    /// Returns the id the units now live under.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if the merged count would
    /// exceed `u32::MAX`.
    pub fn absorb(&mut self, stack: ItemStack) -> Result<ItemId, WorldError> {
        if let Some(existing) = self.stacks.iter_mut().find(|s| s.key == stack.key) {
            existing.count = existing
                .count
                .checked_add(stack.count)
                .ok_or(WorldError::ArithmeticOverflow)?;
            return Ok(existing.id);
        }
        let id = stack.id;
        self.stacks.push(stack);
        Ok(id)
    }

    /// Remove and return every stack.
    pub fn drain(&mut self) -> Vec<ItemStack> {
        core::mem::take(&mut self.stacks)
    }
}
