//! Hierarchical category store with a lazily materialized tree cache.
//!
//! [`storage::CategoryStore`] is the single source of truth for a tree of
//! [`model::Category`] records and keeps it acyclic, with resolvable parents
//! and children reparented on delete. [`cache::TreeCache`] is a pull-based
//! navigation view over the store for display layers; it memoizes what it
//! reads until it is explicitly refreshed.

#![warn(missing_docs)]

pub mod access;
pub mod cache;
pub mod cli;
pub mod config;
pub mod model;
pub mod storage;
pub mod types;

pub use cache::TreeCache;
pub use model::Category;
pub use storage::{CategoryStore, MemoryBackend, SharedStore};
pub use types::{CanopyError, CategoryKey, Result};
