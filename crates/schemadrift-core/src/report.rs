//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use crate::finding::{Finding, FindingCode};
use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of findings
    pub total: usize,

    pub missing_objects: usize,

    pub unexpected_objects: usize,

    pub missing_properties: usize,

    pub property_mismatches: usize,

    /// Number of tables present on both sides and compared in depth
    pub tables_compared: usize,
}

impl ReportSummary {
    fn record(&mut self, code: FindingCode) {
        match code {
            FindingCode::MissingObject => self.missing_objects += 1,
            FindingCode::UnexpectedObject => self.unexpected_objects += 1,
            FindingCode::MissingProperty => self.missing_properties += 1,
            FindingCode::PropertyMismatch => self.property_mismatches += 1,
        }
        self.total += 1;
    }
}

/// Comparison report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Label of the reference database
    pub reference: String,

    /// Label of the compared database
    pub compared: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All findings, in traversal order
    pub findings: Vec<Finding>,
}

impl Report {
    /// Create an empty report for a pair of databases
    pub fn new(reference: impl Into<String>, compared: impl Into<String>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            reference: reference.into(),
            compared: compared.into(),
            summary: ReportSummary::default(),
            findings: Vec::new(),
        }
    }

    /// Create a report from findings
    pub fn from_findings(
        reference: impl Into<String>,
        compared: impl Into<String>,
        findings: Vec<Finding>,
    ) -> Self {
        let mut report = Self::new(reference, compared);
        for finding in findings {
            report.add_finding(finding);
        }
        report
    }

    /// Set the number of tables compared in depth
    pub fn with_tables_compared(mut self, tables: usize) -> Self {
        self.summary.tables_compared = tables;
        self
    }

    /// Add a finding to the report
    pub fn add_finding(&mut self, finding: Finding) {
        self.summary.record(finding.code());
        self.findings.push(finding);
    }

    /// Check if the schemas differ at all
    pub fn has_drift(&self) -> bool {
        self.summary.total > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
