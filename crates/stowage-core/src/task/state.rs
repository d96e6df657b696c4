//! The unload state machine as data.
//!
//! [`transition`] is a pure function from the current [`UnloadState`] and
//! the [`StepEvent`] the driver just observed to the next state plus the
//! [`Effect`]s the driver must apply. It touches nothing; all world access
//! happens in the driver.

use serde::{Deserialize, Serialize};
use stowage_types::{CellId, ItemId, StepStatus, Unloadable};

/// Steps of one unload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnloadState {
    /// Adopt the pinned item or ask the policy for one.
    SelectTarget,
    /// Search for a storage cell.
    LocateStorage,
    /// Claim the located cell.
    ReserveStorage,
    /// Walk toward the cell (spans ticks).
    Travel,
    /// Move the item from inventory or equipment into the carry slot.
    PickUpAndCarry,
    /// Walk to the cell carrying the item and put it down (spans ticks).
    CarryAndPlace,
    /// Loop back for more or finish.
    Finalize,
    /// Terminal: done.
    Succeeded,
    /// Terminal: could not proceed.
    Incompletable,
}

impl UnloadState {
    /// The caller-visible status for this state.
    pub const fn status(self) -> StepStatus {
        match self {
            Self::Succeeded => StepStatus::Succeeded,
            Self::Incompletable => StepStatus::Incompletable,
            Self::SelectTarget
            | Self::LocateStorage
            | Self::ReserveStorage
            | Self::Travel
            | Self::PickUpAndCarry
            | Self::CarryAndPlace
            | Self::Finalize => StepStatus::InProgress,
        }
    }

    /// Whether the run has ended.
    pub const fn is_terminal(self) -> bool {
        self.status().is_terminal()
    }
}

/// What the driver observed while performing the current state's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// The pinned item is still held.
    Pinned,
    /// The pinned item is gone.
    PinnedItemMissing,
    /// The policy chose an item.
    PolicyPicked(Unloadable),
    /// The policy has nothing left to unload.
    NothingToUnload,
    /// The locator found a cell.
    CellFound(CellId),
    /// No cell can take the item.
    NoCellFound,
    /// The reservation was granted.
    Reserved,
    /// Someone else holds the cell, or it is no longer usable.
    ReservationDenied,
    /// The mover made progress but has not arrived.
    Moving,
    /// The mover reached the cell.
    Arrived,
    /// The cell cannot be reached.
    Unreachable,
    /// The target item is no longer in the agent's possession.
    ItemMissing,
    /// The agent cannot manipulate, or the item can never be stored.
    CannotStore,
    /// Units moved into the carry slot.
    PickedUp {
        /// Units actually moved.
        moved: u32,
    },
    /// The carried stack was deposited.
    Placed {
        /// Units the cell could not take and that are still carried.
        remainder: u32,
    },
    /// The policy still has work for a non-pinned run.
    MoreToUnload,
    /// Nothing more to do.
    Done,
    /// A collaborator returned an error.
    Failed,
}

/// A state change the driver applies after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Make this item the target.
    AdoptItem(ItemId),
    /// Make this cell the destination.
    AdoptCell(CellId),
    /// Set the quantity to move.
    RecordQuantity(u32),
    /// Clear the forbidden flag on the carried stack.
    Unforbid,
    /// Drop the carried stack, or the target item if nothing is carried,
    /// near the agent.
    DropOnGround,
    /// Release the destination cell reservation.
    ReleaseReservation,
    /// Forget the target item, cell, and quantity.
    ResetTargets,
}

/// Next state and the effects that lead there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State to enter.
    pub next: UnloadState,
    /// Effects to apply, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: UnloadState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with(next: UnloadState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn abandon() -> Self {
        Self::with(UnloadState::Incompletable, vec![Effect::ReleaseReservation])
    }
}

/// Map an observed event to the next state.
///
/// Terminal states absorb every event. Any event that does not belong to
/// the current state abandons the run.
pub fn transition(state: UnloadState, event: StepEvent) -> Transition {
    use Effect::{
        AdoptCell, AdoptItem, DropOnGround, RecordQuantity, ReleaseReservation, ResetTargets,
        Unforbid,
    };
    use StepEvent as E;
    use UnloadState as S;

    match (state, event) {
        (S::Succeeded | S::Incompletable, _) => Transition::to(state),

        (S::SelectTarget, E::Pinned) => Transition::to(S::LocateStorage),
        (S::SelectTarget, E::PinnedItemMissing) => Transition::to(S::Incompletable),
        (S::SelectTarget, E::PolicyPicked(pick)) => Transition::with(
            S::LocateStorage,
            vec![AdoptItem(pick.item), RecordQuantity(pick.count)],
        ),
        (S::SelectTarget, E::NothingToUnload) => Transition::to(S::Succeeded),

        (S::LocateStorage, E::CellFound(cell)) => {
            Transition::with(S::ReserveStorage, vec![AdoptCell(cell)])
        }
        // No destination: drop where we stand and skip straight to the end.
        (S::LocateStorage, E::NoCellFound) => Transition::with(S::Finalize, vec![DropOnGround]),
        (S::LocateStorage, E::ItemMissing) => Transition::to(S::Incompletable),

        (S::ReserveStorage, E::Reserved) => Transition::to(S::Travel),
        (S::ReserveStorage, E::ReservationDenied) => Transition::to(S::Incompletable),

        (S::Travel, E::Moving) => Transition::to(S::Travel),
        (S::Travel, E::Arrived) => Transition::to(S::PickUpAndCarry),

        (S::PickUpAndCarry, E::CannotStore) => {
            Transition::with(S::Finalize, vec![DropOnGround, ReleaseReservation])
        }
        (S::PickUpAndCarry, E::PickedUp { moved }) if moved > 0 => Transition::with(
            S::CarryAndPlace,
            vec![RecordQuantity(moved), Unforbid],
        ),

        (S::CarryAndPlace, E::Moving) => Transition::to(S::CarryAndPlace),
        (S::CarryAndPlace, E::Placed { remainder: 0 }) => {
            Transition::with(S::Finalize, vec![ReleaseReservation])
        }
        (S::CarryAndPlace, E::Placed { .. }) => {
            Transition::with(S::Finalize, vec![ReleaseReservation, DropOnGround])
        }

        (S::Finalize, E::MoreToUnload) => Transition::with(S::SelectTarget, vec![ResetTargets]),
        (S::Finalize, E::Done) => Transition::to(S::Succeeded),

        // Unreachable cells, vanished items, empty pickups, collaborator
        // errors, and stray events all end the run.
        _ => Transition::abandon(),
    }
}
