use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a [`super::TreeCache`].
#[derive(Default, Debug)]
pub struct CacheMetrics {
    node_hits: AtomicU64,
    node_misses: AtomicU64,
    store_fetches: AtomicU64,
    child_loads: AtomicU64,
    refreshes: AtomicU64,
    stale_lookups: AtomicU64,
}

/// Point-in-time copy of [`CacheMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    /// Node lookups answered from memory.
    pub node_hits: u64,
    /// Node lookups that went to the store.
    pub node_misses: u64,
    /// Calls made to the store.
    pub store_fetches: u64,
    /// Child lists loaded from the store.
    pub child_loads: u64,
    /// Successful refreshes.
    pub refreshes: u64,
    /// Lookups of keys the store no longer knows.
    pub stale_lookups: u64,
}

impl CacheMetricsSnapshot {
    /// Share of node lookups served from memory.
    pub fn hit_rate(&self) -> f64 {
        let total = self.node_hits + self.node_misses;
        if total == 0 {
            return 0.0;
        }
        self.node_hits as f64 / total as f64
    }
}

impl CacheMetrics {
    /// Copies the current counter values.
    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            node_hits: self.node_hits.load(Ordering::Relaxed),
            node_misses: self.node_misses.load(Ordering::Relaxed),
            store_fetches: self.store_fetches.load(Ordering::Relaxed),
            child_loads: self.child_loads.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            stale_lookups: self.stale_lookups.load(Ordering::Relaxed),
        }
    }

    fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn node_hit(&self) {
        Self::inc(&self.node_hits);
    }

    pub(crate) fn node_miss(&self) {
        Self::inc(&self.node_misses);
    }

    pub(crate) fn store_fetch(&self) {
        Self::inc(&self.store_fetches);
    }

    pub(crate) fn child_load(&self) {
        Self::inc(&self.child_loads);
    }

    pub(crate) fn refresh(&self) {
        Self::inc(&self.refreshes);
    }

    pub(crate) fn stale_lookup(&self) {
        Self::inc(&self.stale_lookups);
    }
}
