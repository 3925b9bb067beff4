//! Category storage: the authoritative store and its persistence backends.
//!
//! [`CategoryStore`] enforces the hierarchy invariants and delegates record
//! keeping to a [`CategoryBackend`]. [`MemoryBackend`] is the in-memory
//! backend used by tests, the CLI and any embedding that does not bring its
//! own persistence.

mod backend;
mod memory;
mod options;
mod shared;
mod store;

/// Persistence collaborator contract and its failure kinds.
pub use backend::{BackendError, BackendResult, CategoryBackend};

/// In-memory backend.
pub use memory::MemoryBackend;

/// Listing order and store configuration.
pub use options::{ChildOrder, StoreOptions};

/// Lock-guarded handle for concurrent readers and writers.
pub use shared::SharedStore;

/// The authoritative store and its read-only view.
pub use store::{CategorySource, CategoryStore};
