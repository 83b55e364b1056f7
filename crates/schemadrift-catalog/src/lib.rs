//! SchemaDrift catalog - schema sources for drift comparison
//!
//! A [`SchemaSource`] lists the raw table, column and index metadata of one
//! database. The engine never issues queries itself; it only talks to sources.
//!
//! ## Features
//!
//! - `postgres` - PostgreSQL support via `tokio-postgres`
//! - `mysql` - MySQL / MariaDB support via `sqlx`
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemadrift_catalog::{SchemaSource, SnapshotSource};
//!
//! let source = SnapshotSource::from_file("staging.json".as_ref())?;
//! let tables = source.list_tables().await?;
//! ```

pub mod source;
pub mod mock;
pub mod snapshot;
pub mod rows;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "mysql")]
pub mod mysql;

pub use source::{SchemaSource, FetchError};
pub use mock::{MockSource, MockSourceBuilder};
pub use snapshot::{Snapshot, SnapshotSource, TableSnapshot};
#[cfg(feature = "postgres")]
pub use postgres::PostgresSource;
#[cfg(feature = "mysql")]
pub use mysql::MysqlSource;
#[cfg(feature = "mysql")]
pub use sqlx::mysql::MySqlConnectOptions;
