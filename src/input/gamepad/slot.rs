//! Controller slot identity
//!
//! XInput exposes exactly four user indices. A [`Slot`] is one of them,
//! validated at construction so the rest of the engine never has to
//! re-check the range. [`SlotSet`] is the compact membership set handlers
//! subscribe with.

use std::fmt;

use crate::error::{Result, XInputError};

/// Number of controller slots XInput supports
pub const SLOT_COUNT: usize = 4;

/// One of the four XInput user indices (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    /// All four slots in index order
    pub const ALL: [Slot; SLOT_COUNT] = [Slot(0), Slot(1), Slot(2), Slot(3)];

    /// Validate a user index
    ///
    /// # Errors
    /// [`XInputError::InvalidArgument`] if `index` is outside 0..=3
    pub fn new(index: u32) -> Result<Self> {
        if (index as usize) < SLOT_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(XInputError::InvalidArgument(format!(
                "slot {} is outside 0..=3",
                index
            )))
        }
    }

    /// Zero-based index, suitable for array access
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// User index as passed to the driver
    pub fn user_index(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller{}", self.0 + 1)
    }
}

/// Set of slots a handler listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotSet(u8);

impl SlotSet {
    /// Empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every slot
    pub const fn all() -> Self {
        Self(0b1111)
    }

    pub fn insert(&mut self, slot: Slot) {
        self.0 |= 1 << slot.0;
    }

    pub fn remove(&mut self, slot: Slot) {
        self.0 &= !(1 << slot.0);
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.0 & (1 << slot.0) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Slots in index order
    pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl FromIterator<Slot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        let mut set = SlotSet::empty();
        for slot in iter {
            set.insert(slot);
        }
        set
    }
}
