//! Configuration schema (schemadrift.toml)

use crate::metadata::ObjectKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connection settings for one side of the comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display label used in findings (defaults to the database name)
    #[serde(default)]
    pub label: Option<String>,

    /// libpq-style connection string or postgres:// URL
    #[serde(default)]
    pub url: Option<String>,

    /// Path to a JSON snapshot to read instead of a live database
    #[serde(default)]
    pub snapshot: Option<PathBuf>,

    /// Connect with TLS
    #[serde(default)]
    pub tls: bool,
}

/// Extra properties to strip before comparison, per object kind
///
/// These are added on top of the built-in volatile properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRules {
    #[serde(default)]
    pub table: Vec<String>,

    #[serde(default)]
    pub field: Vec<String>,

    #[serde(default)]
    pub index: Vec<String>,
}

impl IgnoreRules {
    /// Ignored property names for a kind
    pub fn for_kind(&self, kind: ObjectKind) -> &[String] {
        match kind {
            ObjectKind::Table => &self.table,
            ObjectKind::Field => &self.field,
            ObjectKind::Index => &self.index,
        }
    }
}

/// Table selection rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRules {
    /// Tables to leave out of the comparison entirely (glob patterns)
    #[serde(default)]
    pub skip_tables: Vec<String>,
}

impl FilterRules {
    /// Check if a table should be skipped
    pub fn is_table_skipped(&self, table: &str) -> bool {
        self.skip_tables.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, table)
            } else {
                pattern == table
            }
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Reference (template) database
    #[serde(default)]
    pub reference: Option<SourceConfig>,

    /// Database checked against the reference
    #[serde(default)]
    pub compared: Option<SourceConfig>,

    #[serde(default)]
    pub ignore: IgnoreRules,

    #[serde(default)]
    pub filter: FilterRules,

    /// Directory of the config file (for resolving relative snapshot paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference: None,
            compared: None,
            ignore: IgnoreRules::default(),
            filter: FilterRules::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Resolve a path from the config relative to the config file's directory
    pub fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Simple glob matching (`*` matches any run of characters)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };

    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };

    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };

    for part in middle {
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }

    remaining.len() >= last.len() && remaining.ends_with(last)
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
