use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility into the engine's own
/// behavior, distinct from the per-caller daily counters it persists.
#[derive(Clone, Default)]
pub struct Counters {
    pub assigned: Arc<AtomicU64>,
    pub unassigned: Arc<AtomicU64>,
    pub replayed: Arc<AtomicU64>,
    pub transient_retries: Arc<AtomicU64>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_assigned(&self) {
        self.assigned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_unassigned(&self) {
        self.unassigned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_replayed(&self) {
        self.replayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_transient_retry(&self) {
        self.transient_retries.fetch_add(1, Ordering::Relaxed);
    }
}
