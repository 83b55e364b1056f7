//! SchemaDrift Core
//!
//! Core domain model shared by the catalog, engine and CLI crates.
//! Finding codes are part of the public API and are never renamed.

pub mod metadata;
pub mod finding;
pub mod report;
pub mod config;

pub use metadata::{MetadataRecord, NamedMetadataSet, ObjectKind, PropertyValue};
pub use finding::{ActualValue, Finding, FindingCode, Scope, Side};
pub use report::{Report, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, FilterRules, IgnoreRules, SourceConfig};
