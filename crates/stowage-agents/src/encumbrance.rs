//! Hypothetical encumbrance: how heavy would a set of loadout items be?
//!
//! Masses come from the item catalog. All arithmetic is checked
//! [`Decimal`] math.

use rust_decimal::Decimal;
use stowage_world::ItemCatalog;

use crate::agent::AgentProfile;
use crate::error::AgentError;
use crate::loadout::LoadoutItem;

/// Total mass of `items` at their desired quantities.
pub fn hypothetical_gear_mass(
    catalog: &ItemCatalog,
    items: &[LoadoutItem],
) -> Result<Decimal, AgentError> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        let def = catalog.require(&item.filter.def)?;
        def.mass
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|mass| total.checked_add(mass))
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("gear mass for {}", item.filter.def),
            })
    })
}

/// Mass of `items` as a fraction of the agent's carry capacity. May exceed 1.
pub fn hypothetical_unbounded_encumbrance(
    agent: &AgentProfile,
    catalog: &ItemCatalog,
    items: &[LoadoutItem],
) -> Result<Decimal, AgentError> {
    let mass = hypothetical_gear_mass(catalog, items)?;
    if agent.carry_capacity <= Decimal::ZERO {
        return Err(AgentError::NoCarryCapacity(agent.id));
    }
    mass.checked_div(agent.carry_capacity)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: format!("encumbrance for {}", agent.id),
        })
}

/// Encumbrance clamped to `[0, 1]`.
///
/// An agent with no carry capacity is fully encumbered by anything with
/// mass and unencumbered by nothing.
pub fn hypothetical_encumbrance(
    agent: &AgentProfile,
    catalog: &ItemCatalog,
    items: &[LoadoutItem],
) -> Result<Decimal, AgentError> {
    match hypothetical_unbounded_encumbrance(agent, catalog, items) {
        Ok(value) => Ok(value.clamp(Decimal::ZERO, Decimal::ONE)),
        Err(AgentError::NoCarryCapacity(_)) => {
            let mass = hypothetical_gear_mass(catalog, items)?;
            Ok(if mass > Decimal::ZERO {
                Decimal::ONE
            } else {
                Decimal::ZERO
            })
        }
        Err(other) => Err(other),
    }
}
