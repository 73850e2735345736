//! Lock-free status slot.

use arc_swap::ArcSwapOption;
use dsts_core::StatusBlock;
use std::fmt;
use std::sync::Arc;

/// Shared cell holding the latest published block of one bar position.
///
/// Writers replace the whole block atomically and readers never block, so a
/// reader sees either nothing (before the first publish) or one complete
/// published value.
#[derive(Clone)]
pub struct StatusSlot {
    cell: Arc<ArcSwapOption<StatusBlock>>,
}

impl StatusSlot {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Replace the current block.
    pub fn store(&self, block: StatusBlock) {
        self.cell.store(Some(Arc::new(block)));
    }

    /// Latest block, if anything was published yet.
    pub fn load(&self) -> Option<Arc<StatusBlock>> {
        self.cell.load_full()
    }

    /// Latest block, or the empty block before the first publish.
    pub fn load_or_empty(&self) -> StatusBlock {
        self.load()
            .map(|block| StatusBlock::clone(&block))
            .unwrap_or_default()
    }
}

impl Default for StatusSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatusSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StatusSlot").field(&self.load()).finish()
    }
}
