use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Category;

/// Order in which roots and children are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildOrder {
    /// Alphabetic by name; equal names keep insertion order.
    #[default]
    Name,
    /// Insertion order into the parent (or root) list.
    Insertion,
}

impl ChildOrder {
    /// Compares two categories under this order. Insertion order is kept by a
    /// stable sort, so only `Name` distinguishes entries here.
    pub fn compare(self, a: &Category, b: &Category) -> Ordering {
        match self {
            ChildOrder::Name => a.name.cmp(&b.name),
            ChildOrder::Insertion => Ordering::Equal,
        }
    }
}

impl fmt::Display for ChildOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildOrder::Name => f.write_str("name"),
            ChildOrder::Insertion => f.write_str("insertion"),
        }
    }
}

impl FromStr for ChildOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(ChildOrder::Name),
            "insertion" => Ok(ChildOrder::Insertion),
            other => Err(format!("unknown child order '{other}'")),
        }
    }
}

/// Configuration options supplied when creating a [`super::MemoryBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Listing order for roots and children.
    pub child_order: ChildOrder,
}
