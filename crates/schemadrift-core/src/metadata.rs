//! Metadata records and keyed collections of schema objects

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single property value as reported by introspection (SQL NULL is `None`)
pub type PropertyValue = Option<String>;

/// Kind of schema object a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A table (one row of table status)
    Table,

    /// A column of a table
    Field,

    /// An index of a table
    Index,
}

impl ObjectKind {
    /// Sub-object kinds compared for every table present on both sides, in traversal order
    pub const NESTED: [ObjectKind; 2] = [ObjectKind::Field, ObjectKind::Index];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Field => "field",
            Self::Index => "index",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered property map describing one schema object
///
/// Property order is the order the source reported them in. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    properties: IndexMap<String, PropertyValue>,
}

impl MetadataRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-null property
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), Some(value.into()));
        self
    }

    /// Add a NULL property
    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.properties.insert(name.into(), None);
        self
    }

    /// Insert or replace a property, keeping its original position if it existed
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    /// Look up a property.
    ///
    /// Returns `None` when the property is absent and `Some(None)` when it is NULL.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.properties.get(name).map(|v| v.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Copy of this record without the listed properties, order preserved
    pub fn without<'a, I>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut properties = self.properties.clone();
        for name in names {
            properties.shift_remove(name);
        }
        Self { properties }
    }

    /// Iterate properties in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyValue)> for MetadataRecord {
    fn from_iter<T: IntoIterator<Item = (K, PropertyValue)>>(iter: T) -> Self {
        Self {
            properties: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// All objects of one kind within one scope, keyed by their unique name
///
/// Names iterate in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedMetadataSet {
    entries: BTreeMap<String, MetadataRecord>,
}

impl NamedMetadataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; a later record with the same name replaces the earlier one
    pub fn insert(&mut self, name: impl Into<String>, record: MetadataRecord) {
        self.entries.insert(name.into(), record);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, record: MetadataRecord) -> Self {
        self.insert(name, record);
        self
    }

    pub fn get(&self, name: &str) -> Option<&MetadataRecord> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only entries whose name satisfies the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|name, _| keep(name));
    }

    /// Apply a transformation to every record
    pub fn map_records(self, mut f: impl FnMut(MetadataRecord) -> MetadataRecord) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(name, record)| (name, f(record)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, MetadataRecord)> for NamedMetadataSet {
    fn from_iter<T: IntoIterator<Item = (K, MetadataRecord)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for NamedMetadataSet {
    type Item = (String, MetadataRecord);
    type IntoIter = std::collections::btree_map::IntoIter<String, MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
