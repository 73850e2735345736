//! Ordered status board.

use dsts_core::StatusBlock;
use dsts_source::StatusSlot;

/// Slots in display order.
///
/// Index 0 is the leftmost block of the bar. The order is fixed once a
/// slot is added.
#[derive(Debug, Clone, Default)]
pub struct Board {
    slots: Vec<StatusSlot>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slot: StatusSlot) {
        self.slots.push(slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[StatusSlot] {
        &self.slots
    }

    /// Current value of every slot, in board order.
    ///
    /// Slots that never received a value render as the empty block.
    pub fn snapshot(&self) -> Vec<StatusBlock> {
        self.slots.iter().map(StatusSlot::load_or_empty).collect()
    }
}
