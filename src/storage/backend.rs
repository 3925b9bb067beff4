use crate::model::Category;
use crate::types::{CanopyError, CategoryKey, Operation};

/// Failures surfaced by a persistence backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No record with this key.
    #[error("record {0} not found")]
    NotFound(CategoryKey),
    /// The caller's copy is older than the stored record.
    #[error("stale record {key}: expected version {expected}, found {found}")]
    OptimisticLock {
        /// Record key.
        key: CategoryKey,
        /// Version carried by the caller.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },
    /// The key is stored, or belonged to a record that was removed.
    #[error("record {0} already exists or was retired")]
    DuplicateKey(CategoryKey),
    /// A write would break a backend constraint.
    #[error("integrity violation: {0}")]
    DataIntegrity(String),
    /// An authorization layer wrapped around the backend refused the call.
    #[error("access denied: {principal} may not {operation}")]
    AccessDenied {
        /// Rejected operation.
        operation: Operation,
        /// Name of the principal.
        principal: String,
    },
}

/// Result alias for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

impl From<BackendError> for CanopyError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(key) => CanopyError::NotFound(key),
            BackendError::OptimisticLock {
                key,
                expected,
                found,
            } => CanopyError::OptimisticLockFailure {
                key,
                expected,
                found,
            },
            BackendError::DuplicateKey(key) => CanopyError::DuplicateKey(key),
            BackendError::DataIntegrity(message) => CanopyError::DataIntegrityViolation(message),
            BackendError::AccessDenied {
                operation,
                principal,
            } => CanopyError::AccessDenied {
                operation,
                principal,
            },
        }
    }
}

/// Persistence collaborator behind a [`super::CategoryStore`].
///
/// Backends own the `version` counter: `persist` assigns the first version,
/// `merge` and `remove` reject a caller whose version differs from the stored
/// one and `merge` increments it. Lists come back in the backend's configured
/// order. Backends keep their own parent→children index consistent with the
/// `parent` field of every record they store.
pub trait CategoryBackend {
    /// Looks a record up by key.
    fn find_by_key(&self, key: CategoryKey) -> BackendResult<Option<Category>>;

    /// Lists the direct children of `parent`; empty for an unknown parent.
    fn find_by_parent(&self, parent: CategoryKey) -> BackendResult<Vec<Category>>;

    /// Lists the records without a parent.
    fn find_roots(&self) -> BackendResult<Vec<Category>>;

    /// Stores a new record and returns it with its first version. Keys that are
    /// stored or were ever removed are rejected with `DuplicateKey`.
    fn persist(&mut self, category: Category) -> BackendResult<Category>;

    /// Replaces an existing record and returns it with its new version.
    fn merge(&mut self, category: Category) -> BackendResult<Category>;

    /// Drops a record and hands its children to the record's own parent, or
    /// promotes them to roots, in one step: either everything applies or
    /// nothing does. Returns the adopted children with their new versions.
    /// A removed key is retired and never accepted again.
    fn remove(&mut self, category: &Category) -> BackendResult<Vec<Category>>;

    /// Number of stored records.
    fn count(&self) -> BackendResult<usize>;
}
