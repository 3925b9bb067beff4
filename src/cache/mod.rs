//! Pull-based hierarchical view over a category store.
//!
//! The cache never writes to the store. Callers that mutate the store call
//! [`TreeCache::refresh`] afterwards to observe the change.

mod listener;
mod metrics;
mod tree;

pub use listener::{CacheEvent, CacheListener, ListenerId};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use tree::TreeCache;
