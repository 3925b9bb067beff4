//! The category record and its statically declared field table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CanopyError, CategoryKey, EntityMeta, Result};

/// A node in the managed hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    meta: EntityMeta,
    /// Display name; must not be blank when written to a store.
    pub name: String,
    /// Free text description.
    pub description: Option<String>,
    /// Parent key, `None` for a root.
    pub parent: Option<CategoryKey>,
}

impl Category {
    /// Creates an unpersisted root category with a freshly generated key.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            description: None,
            parent: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Places the category under `parent`.
    pub fn with_parent(mut self, parent: CategoryKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The immutable key.
    pub fn key(&self) -> CategoryKey {
        self.meta.key()
    }

    /// The backend-assigned version, `0` if never persisted.
    pub fn version(&self) -> u64 {
        self.meta.version()
    }

    /// Identity and version metadata.
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    /// Records the version assigned by a backend.
    pub fn set_version(&mut self, version: u64) {
        self.meta.set_version(version);
    }

    /// Whether the category has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key())
    }
}

/// Type of a category property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A category key.
    Key,
    /// A version counter.
    Version,
    /// A required string.
    Text,
    /// An optional string.
    OptionalText,
    /// An optional category key.
    OptionalKey,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Key => "key",
            FieldKind::Version => "version",
            FieldKind::Text => "text",
            FieldKind::OptionalText => "optional text",
            FieldKind::OptionalKey => "optional key",
        })
    }
}

/// A property value read from or written to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Value of a [`FieldKind::Key`] field.
    Key(CategoryKey),
    /// Value of a [`FieldKind::Version`] field.
    Version(u64),
    /// Value of a [`FieldKind::Text`] field.
    Text(String),
    /// Value of a [`FieldKind::OptionalText`] field.
    OptionalText(Option<String>),
    /// Value of a [`FieldKind::OptionalKey`] field.
    OptionalKey(Option<CategoryKey>),
}

impl FieldValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Key(_) => FieldKind::Key,
            FieldValue::Version(_) => FieldKind::Version,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::OptionalText(_) => FieldKind::OptionalText,
            FieldValue::OptionalKey(_) => FieldKind::OptionalKey,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Key(key) => write!(f, "{key}"),
            FieldValue::Version(v) => write!(f, "{v}"),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::OptionalText(Some(text)) => f.write_str(text),
            FieldValue::OptionalKey(Some(key)) => write!(f, "{key}"),
            FieldValue::OptionalText(None) | FieldValue::OptionalKey(None) => f.write_str("-"),
        }
    }
}

/// Reader of one property.
pub type FieldReader = fn(&Category) -> FieldValue;
/// Writer of one property.
pub type FieldWriter = fn(&mut Category, FieldValue) -> Result<()>;

/// Static description of one category property.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    /// Property name as exposed to display layers.
    pub name: &'static str,
    /// Property type.
    pub kind: FieldKind,
    read: FieldReader,
    write: Option<FieldWriter>,
}

impl FieldDescriptor {
    /// Reads the property from `category`.
    pub fn get(&self, category: &Category) -> FieldValue {
        (self.read)(category)
    }

    /// Writes the property; read-only properties and mismatched kinds are rejected.
    pub fn set(&self, category: &mut Category, value: FieldValue) -> Result<()> {
        match self.write {
            Some(write) => write(category, value),
            None => Err(CanopyError::Invalid("field is read-only")),
        }
    }

    /// Whether [`FieldDescriptor::set`] can succeed.
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("writable", &self.is_writable())
            .finish()
    }
}

const WRONG_KIND: CanopyError = CanopyError::Invalid("field value has the wrong kind");

fn read_key(c: &Category) -> FieldValue {
    FieldValue::Key(c.key())
}

fn read_version(c: &Category) -> FieldValue {
    FieldValue::Version(c.version())
}

fn read_name(c: &Category) -> FieldValue {
    FieldValue::Text(c.name.clone())
}

fn write_name(c: &mut Category, value: FieldValue) -> Result<()> {
    match value {
        FieldValue::Text(name) => {
            c.name = name;
            Ok(())
        }
        _ => Err(WRONG_KIND),
    }
}

fn read_description(c: &Category) -> FieldValue {
    FieldValue::OptionalText(c.description.clone())
}

fn write_description(c: &mut Category, value: FieldValue) -> Result<()> {
    match value {
        FieldValue::OptionalText(description) => {
            c.description = description;
            Ok(())
        }
        _ => Err(WRONG_KIND),
    }
}

fn read_parent(c: &Category) -> FieldValue {
    FieldValue::OptionalKey(c.parent)
}

fn write_parent(c: &mut Category, value: FieldValue) -> Result<()> {
    match value {
        FieldValue::OptionalKey(parent) => {
            c.parent = parent;
            Ok(())
        }
        _ => Err(WRONG_KIND),
    }
}

/// Every property of [`Category`], in display order.
pub static CATEGORY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "key",
        kind: FieldKind::Key,
        read: read_key,
        write: None,
    },
    FieldDescriptor {
        name: "version",
        kind: FieldKind::Version,
        read: read_version,
        write: None,
    },
    FieldDescriptor {
        name: "name",
        kind: FieldKind::Text,
        read: read_name,
        write: Some(write_name),
    },
    FieldDescriptor {
        name: "description",
        kind: FieldKind::OptionalText,
        read: read_description,
        write: Some(write_description),
    },
    FieldDescriptor {
        name: "parent",
        kind: FieldKind::OptionalKey,
        read: read_parent,
        write: Some(write_parent),
    },
];

/// Looks a property up by name.
pub fn field(name: &str) -> Option<&'static FieldDescriptor> {
    CATEGORY_FIELDS.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_value(kind: FieldKind, seed: u32) -> FieldValue {
        match kind {
            FieldKind::Key => FieldValue::Key(CategoryKey::generate()),
            FieldKind::Version => FieldValue::Version(seed as u64),
            FieldKind::Text => FieldValue::Text(format!("text-{seed}")),
            FieldKind::OptionalText => FieldValue::OptionalText(Some(format!("opt-{seed}"))),
            FieldKind::OptionalKey => FieldValue::OptionalKey(Some(CategoryKey::generate())),
        }
    }

    #[test]
    fn table_lists_every_property_once() {
        let names: Vec<_> = CATEGORY_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names, ["key", "version", "name", "description", "parent"]);
        assert!(field("nonexistent").is_none());
        assert_eq!(field("parent").map(|f| f.kind), Some(FieldKind::OptionalKey));
    }

    #[test]
    fn writable_fields_read_back_what_was_written() {
        let mut category = Category::new("Root");
        for (seed, desc) in CATEGORY_FIELDS.iter().enumerate() {
            if !desc.is_writable() {
                continue;
            }
            let value = sample_value(desc.kind, seed as u32);
            desc.set(&mut category, value.clone()).unwrap();
            assert_eq!(desc.get(&category), value, "field {}", desc.name);
        }
    }

    #[test]
    fn differing_writable_field_breaks_equality() {
        let base = Category::new("Root");
        for (seed, desc) in CATEGORY_FIELDS.iter().enumerate() {
            if !desc.is_writable() {
                continue;
            }
            let mut other = base.clone();
            desc.set(&mut other, sample_value(desc.kind, seed as u32 + 100))
                .unwrap();
            assert_ne!(base, other, "field {}", desc.name);
            desc.set(&mut other, desc.get(&base)).unwrap();
            assert_eq!(base, other, "field {}", desc.name);
        }
    }

    #[test]
    fn read_only_fields_and_wrong_kinds_are_rejected() {
        let mut category = Category::new("Root");
        let key = category.key();
        let key_field = field("key").unwrap();
        assert!(matches!(
            key_field.set(&mut category, FieldValue::Key(CategoryKey::generate())),
            Err(CanopyError::Invalid(_))
        ));
        assert_eq!(category.key(), key);
        assert!(field("name")
            .unwrap()
            .set(&mut category, FieldValue::Version(3))
            .is_err());
        assert_eq!(category.name, "Root");
    }

    #[test]
    fn new_category_is_unpersisted_root() {
        let category = Category::new("Root").with_description("top");
        assert!(category.is_root());
        assert_eq!(category.version(), 0);
        assert_eq!(category.description.as_deref(), Some("top"));
    }
}
