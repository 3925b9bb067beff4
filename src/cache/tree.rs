use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{info, trace, warn};

use super::listener::{CacheEvent, CacheListener, ListenerId, ListenerRegistry};
use super::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::model::{self, Category, FieldKind, FieldValue, CATEGORY_FIELDS};
use crate::storage::CategorySource;
use crate::types::{CanopyError, CategoryKey, Result};

/// Lazily built, memoized navigation view over a [`CategorySource`].
///
/// Nodes are fetched on first use and kept until the next
/// [`TreeCache::refresh`]; mutations made to the store in the meantime are not
/// observed. Keys the store no longer knows resolve to `None`/`false` instead
/// of failing, any other store error is returned to the caller.
///
/// Navigation before the first refresh is allowed: nodes resolve lazily and
/// the root set is empty.
pub struct TreeCache<S> {
    source: S,
    state: Mutex<CacheState>,
    listeners: ListenerRegistry,
    metrics: CacheMetrics,
}

#[derive(Default)]
struct CacheState {
    nodes: HashMap<CategoryKey, Node>,
    roots: Vec<CategoryKey>,
    generation: u64,
}

struct Node {
    category: Category,
    // lookup edge into `CacheState::nodes`, never owning
    parent: Option<CategoryKey>,
    children: Option<Vec<CategoryKey>>,
    created_at: Instant,
}

impl Node {
    fn new(category: Category, parent: Option<CategoryKey>) -> Self {
        Self {
            category,
            parent,
            children: None,
            created_at: Instant::now(),
        }
    }
}

impl<S: CategorySource> TreeCache<S> {
    /// Creates an empty cache over `source`. Call [`TreeCache::refresh`] to
    /// load the root set.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::default()),
            listeners: ListenerRegistry::default(),
            metrics: CacheMetrics::default(),
        }
    }

    /// The store the cache reads from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Discards every memoized node, re-reads the root set and notifies
    /// listeners. Child lists stay unloaded until asked for.
    ///
    /// If the store fails the error is returned and the previous contents are
    /// kept.
    pub fn refresh(&self) -> Result<()> {
        self.metrics.store_fetch();
        let roots = self.source.root_categories()?;
        let event = {
            let mut state = self.state.lock();
            let mut nodes = HashMap::with_capacity(roots.len());
            let mut root_keys = Vec::with_capacity(roots.len());
            for root in roots {
                let key = root.key();
                root_keys.push(key);
                nodes.insert(key, Node::new(root, None));
            }
            state.nodes = nodes;
            state.roots = root_keys;
            state.generation += 1;
            CacheEvent::Refreshed {
                generation: state.generation,
                roots: state.roots.len(),
            }
        };
        self.metrics.refresh();
        if let CacheEvent::Refreshed { generation, roots } = &event {
            info!(generation, roots, "tree cache refreshed");
        }
        self.listeners.fire(&event);
        Ok(())
    }

    /// Keys of the roots read by the last refresh.
    pub fn root_keys(&self) -> Vec<CategoryKey> {
        self.state.lock().roots.clone()
    }

    /// Whether `key` was a root at the last refresh.
    pub fn is_root(&self, key: CategoryKey) -> bool {
        self.state.lock().roots.contains(&key)
    }

    /// Ordered child keys of `key`, `None` if the key does not resolve.
    pub fn children_of(&self, key: CategoryKey) -> Result<Option<Vec<CategoryKey>>> {
        let mut state = self.state.lock();
        self.load_children(&mut state, key)
    }

    /// Parent key of `key`; `None` for roots and unknown keys.
    pub fn parent_of(&self, key: CategoryKey) -> Result<Option<CategoryKey>> {
        let mut state = self.state.lock();
        if !self.resolve(&mut state, key)? {
            return Ok(None);
        }
        Ok(state.nodes.get(&key).and_then(|node| node.parent))
    }

    /// Whether `key` currently has at least one child.
    pub fn has_children(&self, key: CategoryKey) -> Result<bool> {
        Ok(self
            .children_of(key)?
            .is_some_and(|children| !children.is_empty()))
    }

    /// Every category may hold children; display layers use this to decide
    /// whether to draw an expander, so it reports actual children.
    pub fn are_children_allowed(&self, key: CategoryKey) -> Result<bool> {
        self.has_children(key)
    }

    /// Whether `key` resolves to a node.
    pub fn contains(&self, key: CategoryKey) -> Result<bool> {
        let mut state = self.state.lock();
        self.resolve(&mut state, key)
    }

    /// The cached record for `key`.
    pub fn category(&self, key: CategoryKey) -> Result<Option<Category>> {
        let mut state = self.state.lock();
        if !self.resolve(&mut state, key)? {
            return Ok(None);
        }
        Ok(state.nodes.get(&key).map(|node| node.category.clone()))
    }

    /// Reads one property of the cached record; `None` for unknown keys or
    /// property names.
    pub fn property(&self, key: CategoryKey, name: &str) -> Result<Option<FieldValue>> {
        let Some(descriptor) = model::field(name) else {
            return Ok(None);
        };
        Ok(self.category(key)?.map(|category| descriptor.get(&category)))
    }

    /// Names of every property a node exposes.
    pub fn property_names(&self) -> Vec<&'static str> {
        CATEGORY_FIELDS.iter().map(|field| field.name).collect()
    }

    /// Type of a property, `None` if there is no such property.
    pub fn property_kind(&self, name: &str) -> Option<FieldKind> {
        model::field(name).map(|field| field.kind)
    }

    /// Registers a listener for refresh notifications.
    pub fn add_listener<L: CacheListener + 'static>(&self, listener: L) -> ListenerId {
        self.listeners.add(Arc::new(listener))
    }

    /// Unregisters a listener; `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Count of successful refreshes.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Whether at least one refresh has succeeded.
    pub fn is_populated(&self) -> bool {
        self.generation() > 0
    }

    /// Number of memoized nodes.
    pub fn cached_nodes(&self) -> usize {
        self.state.lock().nodes.len()
    }

    /// Time since the node for `key` was memoized. Does not fetch.
    pub fn node_age(&self, key: CategoryKey) -> Option<Duration> {
        self.state
            .lock()
            .nodes
            .get(&key)
            .map(|node| node.created_at.elapsed())
    }

    /// Copies the cache counters.
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn fetch(&self, key: CategoryKey) -> Result<Option<Category>> {
        self.metrics.store_fetch();
        match self.source.get_by_key(key) {
            Ok(category) => Ok(Some(category)),
            Err(err) if err.is_not_found() => {
                self.metrics.stale_lookup();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Memoizes `key` and any missing ancestors; `false` if the store does
    /// not know `key`.
    fn resolve(&self, state: &mut CacheState, key: CategoryKey) -> Result<bool> {
        if state.nodes.contains_key(&key) {
            self.metrics.node_hit();
            trace!(%key, "tree cache hit");
            return Ok(true);
        }
        self.metrics.node_miss();
        trace!(%key, "tree cache miss");

        let mut pending: Vec<Category> = Vec::new();
        let mut next = Some(key);
        while let Some(current) = next {
            if state.nodes.contains_key(&current) {
                break;
            }
            if pending.iter().any(|c| c.key() == current) {
                return Err(CanopyError::DataIntegrityViolation(format!(
                    "parent chain of {key} loops through {current}"
                )));
            }
            match self.fetch(current)? {
                Some(category) => {
                    next = category.parent;
                    pending.push(category);
                }
                None if pending.is_empty() => return Ok(false),
                None => {
                    warn!(%key, parent = %current, "parent vanished from store");
                    break;
                }
            }
        }

        // top-down, so every parent is registered before its child
        for category in pending.into_iter().rev() {
            let parent = category.parent.filter(|p| state.nodes.contains_key(p));
            state.nodes.insert(category.key(), Node::new(category, parent));
        }
        Ok(true)
    }

    fn load_children(
        &self,
        state: &mut CacheState,
        key: CategoryKey,
    ) -> Result<Option<Vec<CategoryKey>>> {
        if !self.resolve(state, key)? {
            return Ok(None);
        }
        if let Some(children) = state.nodes.get(&key).and_then(|n| n.children.as_ref()) {
            return Ok(Some(children.clone()));
        }

        self.metrics.store_fetch();
        let fetched = match self.source.children(key) {
            Ok(children) => children,
            Err(err) if err.is_not_found() => {
                self.metrics.stale_lookup();
                trace!(%key, "children requested for a category the store dropped");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        self.metrics.child_load();
        trace!(%key, count = fetched.len(), "loaded children");

        let keys: Vec<CategoryKey> = fetched.iter().map(Category::key).collect();
        for child in fetched {
            state
                .nodes
                .entry(child.key())
                .or_insert_with(|| Node::new(child, Some(key)));
        }
        if let Some(node) = state.nodes.get_mut(&key) {
            node.children = Some(keys.clone());
        }
        Ok(Some(keys))
    }
}

impl<S> fmt::Debug for TreeCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TreeCache")
            .field("generation", &state.generation)
            .field("roots", &state.roots.len())
            .field("nodes", &state.nodes.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}
