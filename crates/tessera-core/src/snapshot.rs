//! Lock-free publication of flow data for display threads.
//!
//! The evaluation path publishes a fresh `Arc<FlowData>` after each update;
//! any number of reader threads load the latest complete snapshot without
//! blocking the writer. Readers never observe a half-written buffer because
//! a snapshot is immutable once published.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;

use crate::flow::FlowData;

/// Single-slot snapshot cell.
///
/// Writes replace the slot atomically; reads are wait-free.
#[derive(Debug, Default)]
pub struct DisplaySnapshot {
    slot: ArcSwapOption<FlowData>,
    publishes: AtomicU64,
}

impl DisplaySnapshot {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new snapshot, replacing the previous one.
    pub fn publish(&self, data: FlowData) {
        self.publish_arc(Arc::new(data));
    }

    /// Publish an already shared snapshot.
    pub fn publish_arc(&self, data: Arc<FlowData>) {
        self.slot.store(Some(data));
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }

    /// Latest published snapshot, if any.
    pub fn load(&self) -> Option<Arc<FlowData>> {
        self.slot.load_full()
    }

    /// Drop the current snapshot.
    pub fn clear(&self) {
        self.slot.store(None);
    }

    /// Number of publishes so far.
    pub fn publish_count(&self) -> u64 {
        self.publishes.load(Ordering::Relaxed)
    }
}
