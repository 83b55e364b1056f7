//! Schema source trait for listing tables, columns and indexes

use schemadrift_core::{NamedMetadataSet, ObjectKind};

/// Errors that can occur when reading metadata from a schema source
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FetchError {
    /// Whether the source could not be reached or logged into at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::AuthenticationError(_) | Self::ConnectionError(_))
    }
}

/// Anything that can list schema metadata for one database
///
/// Listings return raw records; volatile properties are stripped by the engine.
#[async_trait::async_trait]
pub trait SchemaSource: Send + Sync {
    /// Get the source name (e.g., "PostgreSQL", "Snapshot")
    fn name(&self) -> &'static str;

    /// Check that the source is reachable and credentials are valid
    async fn test_connection(&self) -> Result<(), FetchError>;

    /// All tables of the database, keyed by table name
    async fn list_tables(&self) -> Result<NamedMetadataSet, FetchError>;

    /// Columns of one table, keyed by column name
    async fn list_columns(&self, table: &str) -> Result<NamedMetadataSet, FetchError>;

    /// Indexes of one table, keyed by index name
    async fn list_indexes(&self, table: &str) -> Result<NamedMetadataSet, FetchError>;

    /// List the sub-objects of `kind` belonging to a table
    async fn list_nested(&self, kind: ObjectKind, table: &str) -> Result<NamedMetadataSet, FetchError> {
        match kind {
            ObjectKind::Field => self.list_columns(table).await,
            ObjectKind::Index => self.list_indexes(table).await,
            ObjectKind::Table => Err(FetchError::ConfigError(format!(
                "tables are not nested under table '{}'",
                table
            ))),
        }
    }
}
