use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::backend::{BackendError, BackendResult, CategoryBackend};
use super::options::StoreOptions;
use crate::model::Category;
use crate::types::CategoryKey;

/// In-memory backend keeping a primary key index, a parent→children index,
/// a root index and the set of retired keys.
///
/// Child and root lists hold keys in insertion order; listings sort a copy by
/// the configured [`super::ChildOrder`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    options: StoreOptions,
    records: HashMap<CategoryKey, Category>,
    children: HashMap<CategoryKey, Vec<CategoryKey>>,
    roots: Vec<CategoryKey>,
    retired: HashSet<CategoryKey>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options the backend was created with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    fn list(&self, keys: &[CategoryKey]) -> Vec<Category> {
        let mut out: Vec<Category> = keys
            .iter()
            .filter_map(|key| self.records.get(key).cloned())
            .collect();
        let order = self.options.child_order;
        out.sort_by(|a, b| order.compare(a, b));
        out
    }

    fn link(&mut self, key: CategoryKey, parent: Option<CategoryKey>) {
        match parent {
            Some(parent) => self.children.entry(parent).or_default().push(key),
            None => self.roots.push(key),
        }
    }

    fn unlink(&mut self, key: CategoryKey, parent: Option<CategoryKey>) {
        let list = match parent {
            Some(parent) => match self.children.get_mut(&parent) {
                Some(list) => list,
                // parent already removed, its index went with it
                None => return,
            },
            None => &mut self.roots,
        };
        list.retain(|k| *k != key);
    }

    fn check_parent(&self, category: &Category) -> BackendResult<()> {
        match category.parent {
            Some(parent) if !self.records.contains_key(&parent) => {
                Err(BackendError::DataIntegrity(format!(
                    "parent {parent} of {} does not exist",
                    category.key()
                )))
            }
            _ => Ok(()),
        }
    }

    fn check_version(stored: &Category, incoming: &Category) -> BackendResult<()> {
        if stored.version() != incoming.version() {
            return Err(BackendError::OptimisticLock {
                key: incoming.key(),
                expected: incoming.version(),
                found: stored.version(),
            });
        }
        Ok(())
    }
}

impl CategoryBackend for MemoryBackend {
    fn find_by_key(&self, key: CategoryKey) -> BackendResult<Option<Category>> {
        Ok(self.records.get(&key).cloned())
    }

    fn find_by_parent(&self, parent: CategoryKey) -> BackendResult<Vec<Category>> {
        let keys = self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[]);
        Ok(self.list(keys))
    }

    fn find_roots(&self) -> BackendResult<Vec<Category>> {
        Ok(self.list(&self.roots))
    }

    fn persist(&mut self, mut category: Category) -> BackendResult<Category> {
        let key = category.key();
        if self.records.contains_key(&key) || self.retired.contains(&key) {
            return Err(BackendError::DuplicateKey(key));
        }
        self.check_parent(&category)?;
        category.set_version(1);
        self.link(key, category.parent);
        self.records.insert(key, category.clone());
        trace!(%key, "memory backend persisted record");
        Ok(category)
    }

    fn merge(&mut self, mut category: Category) -> BackendResult<Category> {
        let key = category.key();
        let stored = self
            .records
            .get(&key)
            .ok_or(BackendError::NotFound(key))?;
        Self::check_version(stored, &category)?;
        let old_parent = stored.parent;
        self.check_parent(&category)?;
        if old_parent != category.parent {
            self.unlink(key, old_parent);
            self.link(key, category.parent);
        }
        category.set_version(category.version() + 1);
        self.records.insert(key, category.clone());
        trace!(%key, version = category.version(), "memory backend merged record");
        Ok(category)
    }

    fn remove(&mut self, category: &Category) -> BackendResult<Vec<Category>> {
        let key = category.key();
        let stored = self
            .records
            .get(&key)
            .ok_or(BackendError::NotFound(key))?;
        Self::check_version(stored, category)?;
        let new_parent = stored.parent;

        self.unlink(key, new_parent);
        let orphans = self.children.remove(&key).unwrap_or_default();
        self.records.remove(&key);
        self.retired.insert(key);

        let mut adopted = Vec::with_capacity(orphans.len());
        for child_key in orphans {
            let Some(child) = self.records.get_mut(&child_key) else {
                continue;
            };
            child.parent = new_parent;
            child.set_version(child.version() + 1);
            adopted.push(child.clone());
            self.link(child_key, new_parent);
        }
        trace!(%key, adopted = adopted.len(), "memory backend removed record");
        Ok(adopted)
    }

    fn count(&self) -> BackendResult<usize> {
        Ok(self.records.len())
    }
}
