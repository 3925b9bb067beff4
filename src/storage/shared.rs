use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::backend::CategoryBackend;
use super::memory::MemoryBackend;
use super::store::{CategorySource, CategoryStore};
use crate::model::Category;
use crate::types::{CategoryKey, Result};

/// Cloneable handle to a store guarded by a single reader/writer lock.
///
/// Reads through [`CategorySource`] take the read lock for the duration of
/// one call; writers go through [`SharedStore::write`].
pub struct SharedStore<B = MemoryBackend> {
    inner: Arc<RwLock<CategoryStore<B>>>,
}

impl<B> SharedStore<B> {
    /// Wraps `store` in a shared handle.
    pub fn new(store: CategoryStore<B>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Acquires the read lock.
    pub fn read(&self) -> RwLockReadGuard<'_, CategoryStore<B>> {
        self.inner.read()
    }

    /// Acquires the write lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, CategoryStore<B>> {
        self.inner.write()
    }
}

impl<B> Clone for SharedStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: CategoryBackend> CategorySource for SharedStore<B> {
    fn root_categories(&self) -> Result<Vec<Category>> {
        self.inner.read().root_categories()
    }

    fn children(&self, parent: CategoryKey) -> Result<Vec<Category>> {
        self.inner.read().children(parent)
    }

    fn get_by_key(&self, key: CategoryKey) -> Result<Category> {
        self.inner.read().get_by_key(key)
    }
}
