//! Mock schema source for testing
//!
//! This source returns predefined metadata without connecting to any database.
//! It's useful for:
//! - Unit testing the comparison engine
//! - Simulating tables that disappear mid-run or unreachable servers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemadrift_catalog::{MockSourceBuilder, SchemaSource};
//! use schemadrift_core::MetadataRecord;
//!
//! let source = MockSourceBuilder::new()
//!     .with_table("users", MetadataRecord::new().with("Engine", "InnoDB"))
//!     .with_field("users", "email", MetadataRecord::new().with("Type", "varchar(255)"))
//!     .build();
//!
//! let tables = source.list_tables().await?;
//! ```

use crate::source::{FetchError, SchemaSource};
use schemadrift_core::{MetadataRecord, NamedMetadataSet, ObjectKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory schema source
///
/// Clones share state, so a test can keep a handle and inspect the call log
/// after handing the source to the engine.
#[derive(Clone)]
pub struct MockSource {
    tables: Arc<RwLock<NamedMetadataSet>>,

    /// Columns and indexes by table name
    fields: Arc<RwLock<HashMap<String, NamedMetadataSet>>>,
    indexes: Arc<RwLock<HashMap<String, NamedMetadataSet>>>,

    /// Errors to return for a (kind, table) listing; `Table` kind fails `list_tables`
    errors: Arc<RwLock<HashMap<(ObjectKind, String), FetchError>>>,

    /// Every listing call, in order, as `kind:table`
    calls: Arc<RwLock<Vec<String>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,
}

impl MockSource {
    /// Create an empty mock source
    pub fn new() -> Self {
        MockSourceBuilder::new().build()
    }

    /// Add or replace a table record
    pub async fn add_table(&self, name: &str, record: MetadataRecord) {
        self.tables.write().await.insert(name, record);
    }

    /// Add or replace a column of a table
    pub async fn add_field(&self, table: &str, name: &str, record: MetadataRecord) {
        self.fields
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(name, record);
    }

    /// Add or replace an index of a table
    pub async fn add_index(&self, table: &str, name: &str, record: MetadataRecord) {
        self.indexes
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(name, record);
    }

    /// Remove a table and everything under it, as if it was dropped
    pub async fn drop_table(&self, name: &str) {
        self.tables.write().await.retain(|t| t != name);
        self.fields.write().await.remove(name);
        self.indexes.write().await.remove(name);
    }

    /// Configure an error for a listing call
    pub async fn add_error(&self, kind: ObjectKind, table: &str, error: FetchError) {
        self.errors
            .write()
            .await
            .insert((kind, table.to_string()), error);
    }

    /// Listing calls made so far, formatted `kind:table` (`table:*` for the table listing)
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Simulate latency if configured
    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }

    async fn record_call(&self, kind: ObjectKind, table: &str) -> Result<(), FetchError> {
        self.simulate_latency().await;
        self.calls.write().await.push(format!("{}:{}", kind, table));

        if let Some(error) = self.errors.read().await.get(&(kind, table.to_string())) {
            return Err(error.clone());
        }
        Ok(())
    }

    async fn nested(
        &self,
        kind: ObjectKind,
        store: &RwLock<HashMap<String, NamedMetadataSet>>,
        table: &str,
    ) -> Result<NamedMetadataSet, FetchError> {
        self.record_call(kind, table).await?;

        if let Some(set) = store.read().await.get(table) {
            return Ok(set.clone());
        }

        // A known table without registered sub-objects simply has none
        if self.tables.read().await.contains(table) {
            Ok(NamedMetadataSet::new())
        } else {
            Err(FetchError::TableNotFound(table.to_string()))
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SchemaSource for MockSource {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(FetchError::ConnectionError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn list_tables(&self) -> Result<NamedMetadataSet, FetchError> {
        self.record_call(ObjectKind::Table, "*").await?;
        Ok(self.tables.read().await.clone())
    }

    async fn list_columns(&self, table: &str) -> Result<NamedMetadataSet, FetchError> {
        self.nested(ObjectKind::Field, &self.fields, table).await
    }

    async fn list_indexes(&self, table: &str) -> Result<NamedMetadataSet, FetchError> {
        self.nested(ObjectKind::Index, &self.indexes, table).await
    }
}

/// Builder for creating MockSource with predefined metadata
///
/// # Example
///
/// ```rust,ignore
/// let source = MockSourceBuilder::new()
///     .with_table("users", MetadataRecord::new().with("Engine", "InnoDB"))
///     .with_index("users", "PRIMARY", MetadataRecord::new().with("Non_unique", "0"))
///     .with_error(ObjectKind::Field, "orders", FetchError::TableNotFound("orders".into()))
///     .build();
/// ```
#[derive(Default)]
pub struct MockSourceBuilder {
    tables: NamedMetadataSet,
    fields: HashMap<String, NamedMetadataSet>,
    indexes: HashMap<String, NamedMetadataSet>,
    errors: HashMap<(ObjectKind, String), FetchError>,
    fail_connection: bool,
    latency_ms: u64,
}

impl MockSourceBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table
    pub fn with_table(mut self, name: &str, record: MetadataRecord) -> Self {
        self.tables.insert(name, record);
        self
    }

    /// Add a column of a table
    pub fn with_field(mut self, table: &str, name: &str, record: MetadataRecord) -> Self {
        self.fields
            .entry(table.to_string())
            .or_default()
            .insert(name, record);
        self
    }

    /// Add an index of a table
    pub fn with_index(mut self, table: &str, name: &str, record: MetadataRecord) -> Self {
        self.indexes
            .entry(table.to_string())
            .or_default()
            .insert(name, record);
        self
    }

    /// Add an error for a listing call
    pub fn with_error(mut self, kind: ObjectKind, table: &str, error: FetchError) -> Self {
        self.errors.insert((kind, table.to_string()), error);
        self
    }

    /// Configure connection failure
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Build the MockSource
    pub fn build(self) -> MockSource {
        MockSource {
            tables: Arc::new(RwLock::new(self.tables)),
            fields: Arc::new(RwLock::new(self.fields)),
            indexes: Arc::new(RwLock::new(self.indexes)),
            errors: Arc::new(RwLock::new(self.errors)),
            calls: Arc::new(RwLock::new(Vec::new())),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
        }
    }
}
