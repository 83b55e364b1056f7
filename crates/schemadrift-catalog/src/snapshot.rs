//! JSON snapshots of a database schema
//!
//! A snapshot holds the raw records a live source returned, so two databases
//! can be compared later without network access:
//!
//! ```json
//! {
//!   "tables": {
//!     "users": {
//!       "metadata": { "Name": "users", "Engine": "InnoDB" },
//!       "fields":   { "email": { "Field": "email", "Type": "varchar(255)" } },
//!       "indexes":  { "PRIMARY": { "Key_name": "PRIMARY", "Column_name": "id" } }
//!     }
//!   }
//! }
//! ```

use crate::source::{FetchError, SchemaSource};
use schemadrift_core::{MetadataRecord, NamedMetadataSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Everything known about one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    #[serde(default)]
    pub metadata: MetadataRecord,

    #[serde(default)]
    pub fields: NamedMetadataSet,

    #[serde(default)]
    pub indexes: NamedMetadataSet,
}

/// Captured schema of one database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tables: BTreeMap<String, TableSnapshot>,
}

impl Snapshot {
    /// Read every table, column and index from a source
    pub async fn capture(source: &dyn SchemaSource) -> Result<Self, FetchError> {
        let mut tables = BTreeMap::new();

        for (name, metadata) in source.list_tables().await? {
            tracing::debug!(table = %name, "capturing table");
            let fields = source.list_columns(&name).await?;
            let indexes = source.list_indexes(&name).await?;
            tables.insert(
                name,
                TableSnapshot {
                    metadata,
                    fields,
                    indexes,
                },
            );
        }

        tracing::info!(tables = tables.len(), source = source.name(), "snapshot captured");
        Ok(Self { tables })
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        serde_json::from_str(json).map_err(|e| FetchError::SnapshotError(e.to_string()))
    }

    /// Load a snapshot from a file
    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| FetchError::SnapshotError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Schema source backed by a [`Snapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Load the snapshot stored at `path`
    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        Ok(Self::new(Snapshot::from_file(path)?))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn table(&self, table: &str) -> Result<&TableSnapshot, FetchError> {
        self.snapshot
            .tables
            .get(table)
            .ok_or_else(|| FetchError::TableNotFound(table.to_string()))
    }
}

#[async_trait::async_trait]
impl SchemaSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "Snapshot"
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        Ok(())
    }

    async fn list_tables(&self) -> Result<NamedMetadataSet, FetchError> {
        Ok(self
            .snapshot
            .tables
            .iter()
            .map(|(name, table)| (name.clone(), table.metadata.clone()))
            .collect())
    }

    async fn list_columns(&self, table: &str) -> Result<NamedMetadataSet, FetchError> {
        Ok(self.table(table)?.fields.clone())
    }

    async fn list_indexes(&self, table: &str) -> Result<NamedMetadataSet, FetchError> {
        Ok(self.table(table)?.indexes.clone())
    }
}
