//! Two-slot selection state machine used to stage matching attempts.

use memory_spheres_core::{EntityId, SelectionSnapshot};

/// Phase of the selection derived from slot occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionPhase {
    /// Neither slot holds a sphere.
    Idle,
    /// Only the first slot holds a sphere.
    OneSelected,
    /// Both slots hold spheres awaiting the next resolution frame.
    BothSelected,
}

/// Selection slots staging a pair of spheres for comparison.
///
/// The second slot is never filled while the first is empty, and the two
/// slots never hold the same sphere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SelectionSlots {
    first: Option<EntityId>,
    second: Option<EntityId>,
}

impl SelectionSlots {
    pub(crate) fn phase(&self) -> SelectionPhase {
        match (self.first, self.second) {
            (None, _) => SelectionPhase::Idle,
            (Some(_), None) => SelectionPhase::OneSelected,
            (Some(_), Some(_)) => SelectionPhase::BothSelected,
        }
    }

    pub(crate) fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            first: self.first,
            second: self.second,
        }
    }

    /// Applies a click that hit `id`. Returns `true` when the slots changed.
    pub(crate) fn click(&mut self, id: EntityId) -> bool {
        match self.phase() {
            SelectionPhase::Idle => {
                self.first = Some(id);
                true
            }
            SelectionPhase::OneSelected => {
                if self.first == Some(id) {
                    return false;
                }
                self.second = Some(id);
                true
            }
            SelectionPhase::BothSelected => {
                self.first = Some(id);
                self.second = None;
                true
            }
        }
    }

    /// Empties both slots. Returns `true` when anything was held.
    pub(crate) fn clear(&mut self) -> bool {
        let held = self.phase() != SelectionPhase::Idle;
        *self = Self::default();
        held
    }

    /// Removes and returns the staged pair when both slots are filled.
    pub(crate) fn take_pair(&mut self) -> Option<(EntityId, EntityId)> {
        match (self.first, self.second) {
            (Some(first), Some(second)) => {
                *self = Self::default();
                Some((first, second))
            }
            _ => None,
        }
    }
}
