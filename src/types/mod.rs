#![forbid(unsafe_code)]

//! Identifier, metadata and error types shared by every layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable, globally unique identifier of a category.
///
/// Keys are generated when a category is constructed and never change or get
/// reused afterwards.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(pub Uuid);

impl CategoryKey {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        CategoryKey(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CategoryKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(CategoryKey)
    }
}

impl From<Uuid> for CategoryKey {
    fn from(value: Uuid) -> Self {
        CategoryKey(value)
    }
}

/// Identity and concurrency metadata embedded in every entity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct EntityMeta {
    key: CategoryKey,
    version: u64,
}

impl EntityMeta {
    /// Metadata for an entity that has never been persisted.
    pub fn new() -> Self {
        Self {
            key: CategoryKey::generate(),
            version: 0,
        }
    }

    /// The entity key.
    pub fn key(&self) -> CategoryKey {
        self.key
    }

    /// Optimistic-concurrency version; `0` until first persisted.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Records the version assigned by a backend.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Store operation names, used when reporting access decisions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Operation {
    /// Any read: lookup by key, children or roots.
    Read,
    /// First-time persistence of a new category.
    Persist,
    /// Update of an existing category.
    Merge,
    /// Removal of a category.
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Persist => "persist",
            Operation::Merge => "merge",
            Operation::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Failure kinds surfaced by the store and its collaborators.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanopyError {
    /// The operation referenced a key absent from the store.
    #[error("category {0} not found")]
    NotFound(CategoryKey),
    /// `insert` was called with a key already present.
    #[error("category {0} already exists")]
    DuplicateKey(CategoryKey),
    /// The parent does not resolve, or would make the category its own ancestor.
    #[error("category {key} cannot have parent {parent}")]
    InvalidParent {
        /// Category being written.
        key: CategoryKey,
        /// Rejected parent key.
        parent: CategoryKey,
    },
    /// A concurrent modification was detected by the backend.
    #[error("category {key} was modified concurrently (expected version {expected}, found {found})")]
    OptimisticLockFailure {
        /// Category being written.
        key: CategoryKey,
        /// Version carried by the caller.
        expected: u64,
        /// Version held by the backend.
        found: u64,
    },
    /// An authorization wrapper rejected the call.
    #[error("access denied: {principal} may not {operation}")]
    AccessDenied {
        /// Rejected operation.
        operation: Operation,
        /// Name of the principal, `anonymous` when none is signed in.
        principal: String,
    },
    /// The backend refused a write that would break its integrity rules.
    #[error("data integrity violation: {0}")]
    DataIntegrityViolation(String),
    /// Malformed input.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}

impl CanopyError {
    /// Whether this error only says the referenced category is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CanopyError::NotFound(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CanopyError>;
