use crate::cache::TreeCache;
use crate::storage::CategorySource;
use crate::types::{CategoryKey, Result};

/// One visible row of a rendered hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Distance from the root, roots are `0`.
    pub depth: usize,
    /// Category key.
    pub key: CategoryKey,
    /// Category name.
    pub name: String,
    /// Category description.
    pub description: Option<String>,
    /// Whether the row would get an expander.
    pub has_children: bool,
}

/// Walks the cache depth-first from its roots, in listing order.
///
/// Keys that stopped resolving since the last refresh are skipped.
pub fn walk<S: CategorySource>(cache: &TreeCache<S>) -> Result<Vec<TreeLine>> {
    let mut lines = Vec::new();
    let mut stack: Vec<(usize, CategoryKey)> =
        cache.root_keys().into_iter().rev().map(|k| (0, k)).collect();
    while let Some((depth, key)) = stack.pop() {
        let Some(category) = cache.category(key)? else {
            continue;
        };
        let children = cache.children_of(key)?.unwrap_or_default();
        lines.push(TreeLine {
            depth,
            key,
            name: category.name,
            description: category.description,
            has_children: !children.is_empty(),
        });
        stack.extend(children.into_iter().rev().map(|child| (depth + 1, child)));
    }
    Ok(lines)
}

/// Keys of every walked row named `name`.
pub fn keys_named(lines: &[TreeLine], name: &str) -> Vec<CategoryKey> {
    lines
        .iter()
        .filter(|line| line.name == name)
        .map(|line| line.key)
        .collect()
}

/// Indented plain-text rendering, one row per line.
pub fn render_plain(lines: &[TreeLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&"  ".repeat(line.depth));
        out.push_str(if line.has_children { "+ " } else { "- " });
        out.push_str(&line.name);
        if let Some(description) = &line.description {
            out.push_str(": ");
            out.push_str(description);
        }
        out.push('\n');
    }
    out
}
