//! PostgreSQL schema source using pg_catalog
//!
//! Catalog rows are projected into SHOW-style records so that the same
//! property names (and the same volatile-property lists) apply regardless of
//! where the metadata came from:
//!
//! | kind  | properties |
//! |-------|------------|
//! | table | `Name`, `Engine`, `Rows`, `Data_length`, `Index_length`, `Persistence`, `Create_options`, `Comment` |
//! | field | `Field`, `Type`, `Collation`, `Null`, `Key`, `Default`, `Extra`, `Comment` |
//! | index | `Table`, `Non_unique`, `Key_name`, `Column_name`, `Cardinality`, `Index_type`, `Predicate`, `Comment` |
//!
//! ## Usage
//!
//! ```rust,ignore
//! let source = PostgresSource::connect(
//!     "host=localhost port=5432 dbname=mydb user=postgres password=secret",
//!     "public",
//! ).await?;
//!
//! // With TLS
//! let source = PostgresSource::connect_with_tls(
//!     "host=db.example.com dbname=mydb user=postgres password=secret",
//!     "public",
//! ).await?;
//! ```

use crate::rows::keyed_set;
use crate::source::{FetchError, SchemaSource};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use schemadrift_core::{MetadataRecord, NamedMetadataSet};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Config as PgConfig, NoTls, Row};

const TABLES_QUERY: &str = r#"
    SELECT
        c.relname::text AS "Name",
        COALESCE(am.amname, 'heap')::text AS "Engine",
        c.reltuples::bigint::text AS "Rows",
        pg_relation_size(c.oid)::text AS "Data_length",
        pg_indexes_size(c.oid)::text AS "Index_length",
        CASE c.relpersistence
            WHEN 'u' THEN 'unlogged'
            WHEN 't' THEN 'temporary'
            ELSE 'permanent'
        END AS "Persistence",
        array_to_string(c.reloptions, ',') AS "Create_options",
        obj_description(c.oid, 'pg_class') AS "Comment"
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    LEFT JOIN pg_am am ON am.oid = c.relam
    WHERE n.nspname = $1
      AND c.relkind IN ('r', 'p')
    ORDER BY c.relname
"#;

const TABLE_OID_QUERY: &str = r#"
    SELECT c.oid
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1
      AND c.relname = $2
      AND c.relkind IN ('r', 'p')
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        a.attname::text AS "Field",
        format_type(a.atttypid, a.atttypmod) AS "Type",
        co.collname::text AS "Collation",
        CASE WHEN a.attnotnull THEN 'NO' ELSE 'YES' END AS "Null",
        CASE
            WHEN EXISTS (SELECT 1 FROM pg_index i
                         WHERE i.indrelid = a.attrelid AND i.indisprimary
                           AND a.attnum = ANY(i.indkey)) THEN 'PRI'
            WHEN EXISTS (SELECT 1 FROM pg_index i
                         WHERE i.indrelid = a.attrelid AND i.indisunique
                           AND i.indkey[0] = a.attnum) THEN 'UNI'
            WHEN EXISTS (SELECT 1 FROM pg_index i
                         WHERE i.indrelid = a.attrelid
                           AND i.indkey[0] = a.attnum) THEN 'MUL'
            ELSE ''
        END AS "Key",
        pg_get_expr(d.adbin, d.adrelid) AS "Default",
        CASE
            WHEN a.attidentity = 'a' THEN 'identity always'
            WHEN a.attidentity = 'd' THEN 'identity by default'
            WHEN a.attgenerated = 's' THEN 'stored generated'
            ELSE ''
        END AS "Extra",
        col_description(a.attrelid, a.attnum) AS "Comment"
    FROM pg_attribute a
    LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
    LEFT JOIN pg_collation co ON co.oid = a.attcollation AND a.attcollation <> 0
    WHERE a.attrelid = $1
      AND a.attnum > 0
      AND NOT a.attisdropped
    ORDER BY a.attnum
"#;

const INDEXES_QUERY: &str = r#"
    SELECT
        c.relname::text AS "Table",
        CASE WHEN i.indisunique THEN '0' ELSE '1' END AS "Non_unique",
        ic.relname::text AS "Key_name",
        (SELECT string_agg(pg_get_indexdef(i.indexrelid, k, true), ',' ORDER BY k)
           FROM generate_series(1, i.indnkeyatts) AS k) AS "Column_name",
        ic.reltuples::bigint::text AS "Cardinality",
        am.amname::text AS "Index_type",
        pg_get_expr(i.indpred, i.indrelid) AS "Predicate",
        obj_description(ic.oid, 'pg_class') AS "Comment"
    FROM pg_index i
    JOIN pg_class ic ON ic.oid = i.indexrelid
    JOIN pg_class c ON c.oid = i.indrelid
    JOIN pg_am am ON am.oid = ic.relam
    WHERE i.indrelid = $1
    ORDER BY ic.relname
"#;

/// PostgreSQL schema source
///
/// Lists the tables of one namespace (schema) of one database.
pub struct PostgresSource {
    client: Client,

    /// Database name (from the connection string)
    database: String,

    /// Namespace whose tables are listed
    namespace: String,
}

impl PostgresSource {
    /// Connect without TLS
    ///
    /// # Arguments
    ///
    /// * `conn_str` - libpq key/value string or `postgres://` URL
    /// * `namespace` - schema to list tables from (usually `public`)
    pub async fn connect(conn_str: &str, namespace: impl Into<String>) -> Result<Self, FetchError> {
        let database = Self::database_name(conn_str)?;

        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(|e| Self::connect_error(&database, e))?;

        // Spawn connection handler in background
        let db = database.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(database = %db, error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self {
            client,
            database,
            namespace: namespace.into(),
        })
    }

    /// Connect with TLS (sslmode in the string is ignored, TLS is always used)
    pub async fn connect_with_tls(
        conn_str: &str,
        namespace: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let database = Self::database_name(conn_str)?;

        let connector = TlsConnector::builder().build().map_err(|e| {
            FetchError::ConfigError(format!("Failed to create TLS connector: {}", e))
        })?;
        let tls = MakeTlsConnector::new(connector);

        let (client, connection) = tokio_postgres::connect(conn_str, tls)
            .await
            .map_err(|e| Self::connect_error(&database, e))?;

        let db = database.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(database = %db, error = %e, "PostgreSQL TLS connection error");
            }
        });

        Ok(Self {
            client,
            database,
            namespace: namespace.into(),
        })
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.database
    }

    fn database_name(conn_str: &str) -> Result<String, FetchError> {
        let config: PgConfig = conn_str
            .parse()
            .map_err(|e| FetchError::ConfigError(format!("Invalid connection string: {}", e)))?;

        Ok(config
            .get_dbname()
            .or_else(|| config.get_user())
            .unwrap_or("postgres")
            .to_string())
    }

    fn connect_error(database: &str, e: tokio_postgres::Error) -> FetchError {
        match e.code() {
            Some(code)
                if *code == SqlState::INVALID_PASSWORD
                    || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION =>
            {
                FetchError::AuthenticationError(format!("{}: {}", database, e))
            }
            _ => FetchError::ConnectionError(format!(
                "Failed to connect to PostgreSQL database {}: {}",
                database, e
            )),
        }
    }

    fn query_error(&self, table: &str, e: tokio_postgres::Error) -> FetchError {
        if e.is_closed() {
            return FetchError::ConnectionError(e.to_string());
        }
        match e.code() {
            Some(code) if *code == SqlState::UNDEFINED_TABLE => {
                FetchError::TableNotFound(format!("{}.{}", self.namespace, table))
            }
            Some(code) if *code == SqlState::INSUFFICIENT_PRIVILEGE => FetchError::PermissionDenied(
                format!("Cannot access {}.{}: {}", self.namespace, table, e),
            ),
            _ => FetchError::QueryError(e.to_string()),
        }
    }

    /// Resolve a table name to its oid, failing if the table no longer exists
    async fn table_oid(&self, table: &str) -> Result<u32, FetchError> {
        let row = self
            .client
            .query_opt(TABLE_OID_QUERY, &[&self.namespace, &table])
            .await
            .map_err(|e| self.query_error(table, e))?
            .ok_or_else(|| FetchError::TableNotFound(format!("{}.{}", self.namespace, table)))?;

        row.try_get(0)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }

    async fn nested(&self, query: &str, table: &str, key: &str) -> Result<NamedMetadataSet, FetchError> {
        let oid = self.table_oid(table).await?;
        let rows = self
            .client
            .query(query, &[&oid])
            .await
            .map_err(|e| self.query_error(table, e))?;

        rows_to_set(&rows, key)
    }
}

/// Turn text-only rows into a keyed set, using `key` as the name column
fn rows_to_set(rows: &[Row], key: &str) -> Result<NamedMetadataSet, FetchError> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let mut record = MetadataRecord::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let value: Option<String> = row
                .try_get(idx)
                .map_err(|e| FetchError::InvalidResponse(format!("{}: {}", column.name(), e)))?;
            record.insert(column.name(), value);
        }
        records.push(record);
    }

    keyed_set(records, key)
}

#[async_trait::async_trait]
impl SchemaSource for PostgresSource {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        self.client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| FetchError::ConnectionError(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    async fn list_tables(&self) -> Result<NamedMetadataSet, FetchError> {
        let rows = self
            .client
            .query(TABLES_QUERY, &[&self.namespace])
            .await
            .map_err(|e| self.query_error("*", e))?;

        tracing::debug!(database = %self.database, tables = rows.len(), "listed tables");
        rows_to_set(&rows, "Name")
    }

    async fn list_columns(&self, table: &str) -> Result<NamedMetadataSet, FetchError> {
        self.nested(COLUMNS_QUERY, table, "Field").await
    }

    async fn list_indexes(&self, table: &str) -> Result<NamedMetadataSet, FetchError> {
        self.nested(INDEXES_QUERY, table, "Key_name").await
    }
}
