//! Per-slot memory of the last observation
//!
//! Raw samples drive change detection, but trigger and stick events are
//! deduplicated against the last *emitted* normalized values, so raw jitter
//! that normalizes to the same value stays silent.

use super::driver::RawSample;
use super::event::Side;
use super::slot::{Slot, SLOT_COUNT};

/// Cached state for one slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlotState {
    pub connected: bool,
    pub raw: RawSample,
    /// Last emitted trigger values, indexed by [`side_index`]
    pub triggers: [f64; 2],
    /// Last emitted stick positions, indexed by [`side_index`]
    pub sticks: [(f64, f64); 2],
}

impl SlotState {
    /// Forget everything observed; used when a controller goes away so a
    /// reconnect is diffed against a neutral pad
    pub fn reset(&mut self) {
        *self = SlotState::default();
    }
}

pub fn side_index(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

/// State for all four slots
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    slots: [SlotState; SLOT_COUNT],
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: Slot) -> &SlotState {
        &self.slots[slot.index()]
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut SlotState {
        &mut self.slots[slot.index()]
    }

    pub fn is_connected(&self, slot: Slot) -> bool {
        self.slot(slot).connected
    }

    /// Connectivity flags for all four slots
    pub fn connected(&self) -> [bool; SLOT_COUNT] {
        self.slots.map(|s| s.connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_slot() {
        let mut store = StateStore::new();
        let slot = Slot::new(2).unwrap();
        {
            let state = store.slot_mut(slot);
            state.connected = true;
            state.raw.buttons = 0x1000;
            state.triggers[side_index(Side::Right)] = 0.5;
        }
        assert_eq!(store.connected(), [false, false, true, false]);

        store.slot_mut(slot).reset();
        assert_eq!(*store.slot(slot), SlotState::default());
    }
}
