use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::backend::CategoryBackend;
use super::memory::MemoryBackend;
use super::options::StoreOptions;
use crate::model::Category;
use crate::types::{CanopyError, CategoryKey, Result};

/// Authoritative collection of categories.
///
/// Every mutation validates the structural invariants (unique keys, resolvable
/// parents, no cycles) before it reaches the backend, and backend failures are
/// surfaced as [`CanopyError`] without being logged and dropped. `update` is a
/// strict update: it never inserts.
///
/// Mutators take `&mut self`. Wrap the store in [`super::SharedStore`] when a
/// [`crate::cache::TreeCache`] must read it while another caller writes.
#[derive(Debug)]
pub struct CategoryStore<B = MemoryBackend> {
    backend: B,
}

impl CategoryStore<MemoryBackend> {
    /// Creates an empty store over a [`MemoryBackend`].
    pub fn in_memory(options: StoreOptions) -> Self {
        Self::new(MemoryBackend::new(options))
    }
}

impl Default for CategoryStore<MemoryBackend> {
    fn default() -> Self {
        Self::in_memory(StoreOptions::default())
    }
}

impl<B: CategoryBackend> CategoryStore<B> {
    /// Creates a store over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The persistence backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the store and returns its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Lists the root categories in backend order.
    pub fn root_categories(&self) -> Result<Vec<Category>> {
        let roots = self.backend.find_roots()?;
        debug!(count = roots.len(), "retrieved root categories");
        Ok(roots)
    }

    /// Lists the direct children of `parent`; `NotFound` if it does not exist.
    pub fn children(&self, parent: CategoryKey) -> Result<Vec<Category>> {
        self.get_by_key(parent)?;
        let children = self.backend.find_by_parent(parent)?;
        debug!(%parent, count = children.len(), "retrieved children");
        Ok(children)
    }

    /// Looks a category up, returning `None` when absent.
    pub fn find(&self, key: CategoryKey) -> Result<Option<Category>> {
        Ok(self.backend.find_by_key(key)?)
    }

    /// Looks a category up; `NotFound` when absent.
    pub fn get_by_key(&self, key: CategoryKey) -> Result<Category> {
        self.find(key)?.ok_or(CanopyError::NotFound(key))
    }

    /// Whether a category with this key is stored.
    pub fn contains(&self, key: CategoryKey) -> Result<bool> {
        Ok(self.find(key)?.is_some())
    }

    /// Number of stored categories.
    pub fn len(&self) -> Result<usize> {
        Ok(self.backend.count()?)
    }

    /// Whether the store holds no categories.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Keys on the parent chain of `key`, nearest parent first.
    pub fn ancestors(&self, key: CategoryKey) -> Result<Vec<CategoryKey>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(key);
        let mut next = self.get_by_key(key)?.parent;
        while let Some(parent) = next {
            if !seen.insert(parent) {
                return Err(CanopyError::DataIntegrityViolation(format!(
                    "parent chain of {key} loops through {parent}"
                )));
            }
            chain.push(parent);
            next = self.get_by_key(parent)?.parent;
        }
        Ok(chain)
    }

    /// Stores a new category and returns the stored instance.
    pub fn insert(&mut self, category: Category) -> Result<Category> {
        let key = category.key();
        debug!(%key, name = %category.name, "inserting category");
        validate_name(&category)?;
        if self.contains(key)? {
            debug!(%key, "cannot insert category as it already exists");
            return Err(CanopyError::DuplicateKey(key));
        }
        if category.version() != 0 {
            return Err(CanopyError::Invalid("new category must not carry a version"));
        }
        if let Some(parent) = category.parent {
            if !self.contains(parent)? {
                return Err(CanopyError::InvalidParent { key, parent });
            }
        }
        Ok(self.backend.persist(category)?)
    }

    /// Replaces a stored category and returns the merged instance.
    ///
    /// When the parent changes the backend moves the key from the old parent's
    /// child list into the new parent's list, or into the root list. A parent
    /// that is missing, the category itself, or one of its descendants is
    /// rejected with `InvalidParent`.
    pub fn update(&mut self, category: Category) -> Result<Category> {
        let key = category.key();
        debug!(%key, name = %category.name, "updating category");
        let Some(existing) = self.find(key)? else {
            debug!(%key, "cannot update category as it could not be found");
            return Err(CanopyError::NotFound(key));
        };
        validate_name(&category)?;
        if let Some(parent) = category.parent {
            if parent == key || !self.contains(parent)? {
                return Err(CanopyError::InvalidParent { key, parent });
            }
            if existing.parent != Some(parent) && self.ancestors(parent)?.contains(&key) {
                return Err(CanopyError::InvalidParent { key, parent });
            }
        }
        Ok(self.backend.merge(category)?)
    }

    /// Removes a category; its children are adopted by its parent, or become
    /// roots if it was a root. Deleting an absent category is a no-op.
    ///
    /// The backend applies the removal and the re-linking as one call, so a
    /// rejected delete (stale version, access denied) leaves the tree as it
    /// was.
    pub fn delete(&mut self, category: &Category) -> Result<()> {
        let key = category.key();
        if self.find(key)?.is_none() {
            debug!(%key, "category to delete is absent");
            return Ok(());
        }
        let adopted = self.backend.remove(category)?;
        debug!(%key, adopted = adopted.len(), "deleted category");
        Ok(())
    }
}

fn validate_name(category: &Category) -> Result<()> {
    if category.name.trim().is_empty() {
        return Err(CanopyError::Invalid("category name must not be blank"));
    }
    Ok(())
}

/// Read side of a category store, as consumed by the tree cache.
pub trait CategorySource {
    /// See [`CategoryStore::root_categories`].
    fn root_categories(&self) -> Result<Vec<Category>>;
    /// See [`CategoryStore::children`].
    fn children(&self, parent: CategoryKey) -> Result<Vec<Category>>;
    /// See [`CategoryStore::get_by_key`].
    fn get_by_key(&self, key: CategoryKey) -> Result<Category>;
}

impl<B: CategoryBackend> CategorySource for CategoryStore<B> {
    fn root_categories(&self) -> Result<Vec<Category>> {
        CategoryStore::root_categories(self)
    }

    fn children(&self, parent: CategoryKey) -> Result<Vec<Category>> {
        CategoryStore::children(self, parent)
    }

    fn get_by_key(&self, key: CategoryKey) -> Result<Category> {
        CategoryStore::get_by_key(self, key)
    }
}

impl<S: CategorySource + ?Sized> CategorySource for &S {
    fn root_categories(&self) -> Result<Vec<Category>> {
        (**self).root_categories()
    }

    fn children(&self, parent: CategoryKey) -> Result<Vec<Category>> {
        (**self).children(parent)
    }

    fn get_by_key(&self, key: CategoryKey) -> Result<Category> {
        (**self).get_by_key(key)
    }
}

impl<S: CategorySource + ?Sized> CategorySource for Arc<S> {
    fn root_categories(&self) -> Result<Vec<Category>> {
        (**self).root_categories()
    }

    fn children(&self, parent: CategoryKey) -> Result<Vec<Category>> {
        (**self).children(parent)
    }

    fn get_by_key(&self, key: CategoryKey) -> Result<Category> {
        (**self).get_by_key(key)
    }
}
