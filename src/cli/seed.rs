use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CliError;
use crate::model::Category;
use crate::storage::{CategoryBackend, CategoryStore};
use crate::types::CategoryKey;

/// One category in a seed file, with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedNode {
    /// Category name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Child categories.
    #[serde(default)]
    pub children: Vec<SeedNode>,
}

/// Outcome of [`import_seed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Categories inserted.
    pub inserted: usize,
    /// Of which roots.
    pub roots: usize,
}

/// Parses a seed document: a JSON array of [`SeedNode`]s.
pub fn parse_seed(json: &str) -> Result<Vec<SeedNode>, CliError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a seed file.
pub fn load_seed(path: &Path) -> Result<Vec<SeedNode>, CliError> {
    let contents = fs::read_to_string(path)?;
    parse_seed(&contents)
}

/// Inserts every seed node, parents before children.
pub fn import_seed<B: CategoryBackend>(
    store: &mut CategoryStore<B>,
    nodes: &[SeedNode],
) -> Result<ImportSummary, CliError> {
    let mut summary = ImportSummary {
        roots: nodes.len(),
        ..ImportSummary::default()
    };
    let mut stack: Vec<(Option<CategoryKey>, &SeedNode)> =
        nodes.iter().rev().map(|node| (None, node)).collect();
    while let Some((parent, node)) = stack.pop() {
        let mut category = Category::new(node.name.clone());
        category.description = node.description.clone();
        category.parent = parent;
        let stored = store.insert(category)?;
        summary.inserted += 1;
        let key = stored.key();
        stack.extend(node.children.iter().rev().map(|child| (Some(key), child)));
    }
    debug!(inserted = summary.inserted, roots = summary.roots, "seed imported");
    Ok(summary)
}
