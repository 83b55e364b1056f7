//! Stripping of volatile, non-structural metadata
//!
//! Row counts, sizes, timestamps and index statistics change with every write
//! and must never show up as drift.

use schemadrift_core::{IgnoreRules, MetadataRecord, NamedMetadataSet, ObjectKind};

/// Table status properties that vary independently of the table definition
pub const TABLE_VOLATILE: &[&str] = &[
    "Rows",
    "Avg_row_length",
    "Data_length",
    "Max_data_length",
    "Index_length",
    "Data_free",
    "Auto_increment",
    "Create_time",
    "Update_time",
    "Check_time",
    "Checksum",
];

/// Index properties that are runtime statistics
pub const INDEX_VOLATILE: &[&str] = &["Cardinality"];

/// Built-in volatile properties for a kind (columns have none)
pub fn volatile_properties(kind: ObjectKind) -> &'static [&'static str] {
    match kind {
        ObjectKind::Table => TABLE_VOLATILE,
        ObjectKind::Field => &[],
        ObjectKind::Index => INDEX_VOLATILE,
    }
}

/// Strip the built-in volatile properties of `kind` from a raw record
///
/// Unknown properties pass through in their original order.
pub fn normalize(kind: ObjectKind, raw: &MetadataRecord) -> MetadataRecord {
    raw.without(volatile_properties(kind).iter().copied())
}

/// Normalizer with optional operator-configured properties on top of the built-in lists
#[derive(Debug, Clone, Default)]
pub struct MetadataNormalizer {
    table: Vec<String>,
    field: Vec<String>,
    index: Vec<String>,
}

impl MetadataNormalizer {
    /// Normalizer that strips only the built-in volatile properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer honouring the `[ignore]` section of the config
    pub fn from_rules(rules: &IgnoreRules) -> Self {
        Self {
            table: rules.table.clone(),
            field: rules.field.clone(),
            index: rules.index.clone(),
        }
    }

    /// Also strip `names` from records of `kind`
    pub fn with_ignored<I, S>(mut self, kind: ObjectKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_mut(kind).extend(names.into_iter().map(Into::into));
        self
    }

    fn extra(&self, kind: ObjectKind) -> &[String] {
        match kind {
            ObjectKind::Table => &self.table,
            ObjectKind::Field => &self.field,
            ObjectKind::Index => &self.index,
        }
    }

    fn extra_mut(&mut self, kind: ObjectKind) -> &mut Vec<String> {
        match kind {
            ObjectKind::Table => &mut self.table,
            ObjectKind::Field => &mut self.field,
            ObjectKind::Index => &mut self.index,
        }
    }

    /// Strip built-in and configured properties from one record
    pub fn normalize(&self, kind: ObjectKind, raw: &MetadataRecord) -> MetadataRecord {
        let extra = self.extra(kind).iter().map(String::as_str);
        raw.without(volatile_properties(kind).iter().copied().chain(extra))
    }

    /// Normalize every record of a set
    pub fn normalize_set(&self, kind: ObjectKind, set: NamedMetadataSet) -> NamedMetadataSet {
        set.map_records(|record| self.normalize(kind, &record))
    }
}
