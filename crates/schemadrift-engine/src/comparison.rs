//! Three-level schema comparison: tables, then each shared table's fields and indexes
//!
//! Sources are read strictly one call at a time, reference side first. Any
//! failure aborts the whole run and discards the findings collected so far.

use crate::key_diff::diff_keys;
use crate::normalize::MetadataNormalizer;
use crate::property_diff::compare_properties;
use schemadrift_catalog::{FetchError, SchemaSource};
use schemadrift_core::{FilterRules, Finding, MetadataRecord, NamedMetadataSet, ObjectKind, Scope, Side};

/// Errors that abort a comparison run
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// A source could not be reached before the comparison started
    #[error("cannot reach {side} database '{label}': {source}")]
    Connectivity {
        side: Side,
        label: String,
        source: FetchError,
    },

    /// A listing call failed during the traversal
    #[error("failed to list {kind}s of '{scope}' on the {side} side: {source}")]
    Fetch {
        side: Side,
        kind: ObjectKind,
        scope: String,
        source: FetchError,
    },
}

/// Display labels for the two databases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub reference: String,
    pub compared: String,
}

impl Labels {
    pub fn new(reference: impl Into<String>, compared: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            compared: compared.into(),
        }
    }

    fn for_side(&self, side: Side) -> &str {
        match side {
            Side::Reference => &self.reference,
            Side::Compared => &self.compared,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonOutcome {
    /// Findings in traversal order
    pub findings: Vec<Finding>,

    /// Tables present on both sides
    pub tables_compared: usize,
}

impl ComparisonOutcome {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// A configured comparison between a reference and a compared source
pub struct Comparison<'a> {
    reference: &'a dyn SchemaSource,
    compared: &'a dyn SchemaSource,
    labels: Labels,
    normalizer: MetadataNormalizer,
    filter: FilterRules,
}

impl<'a> Comparison<'a> {
    pub fn new(reference: &'a dyn SchemaSource, compared: &'a dyn SchemaSource, labels: Labels) -> Self {
        Self {
            reference,
            compared,
            labels,
            normalizer: MetadataNormalizer::new(),
            filter: FilterRules::default(),
        }
    }

    /// Use a normalizer with extra ignored properties
    pub fn with_normalizer(mut self, normalizer: MetadataNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Leave matching tables out on both sides
    pub fn with_filter(mut self, filter: FilterRules) -> Self {
        self.filter = filter;
        self
    }

    fn source(&self, side: Side) -> &'a dyn SchemaSource {
        match side {
            Side::Reference => self.reference,
            Side::Compared => self.compared,
        }
    }

    /// Run the comparison to completion
    pub async fn run(&self) -> Result<ComparisonOutcome, CompareError> {
        tracing::info!(
            reference = %self.labels.reference,
            compared = %self.labels.compared,
            "comparing schemas"
        );

        for side in [Side::Reference, Side::Compared] {
            self.source(side)
                .test_connection()
                .await
                .map_err(|source| CompareError::Connectivity {
                    side,
                    label: self.labels.for_side(side).to_string(),
                    source,
                })?;
        }

        let mut findings = Vec::new();
        let db_scope = Scope::database(&self.labels.compared);

        let tables_a = self.fetch_tables(Side::Reference).await?;
        let tables_b = self.fetch_tables(Side::Compared).await?;
        let shared = compare_level(ObjectKind::Table, &db_scope, &tables_a, &tables_b, &mut findings);

        for table in &shared {
            tracing::debug!(table = %table, "comparing table");
            let table_scope = db_scope.child(table.as_str());

            if let (Some(a), Some(b)) = (tables_a.get(table), tables_b.get(table)) {
                compare_object(ObjectKind::Table, &table_scope, table, a, b, &mut findings);
            }

            for kind in ObjectKind::NESTED {
                let sub_a = self.fetch_nested(Side::Reference, kind, table, &table_scope).await?;
                let sub_b = self.fetch_nested(Side::Compared, kind, table, &table_scope).await?;

                for name in compare_level(kind, &table_scope, &sub_a, &sub_b, &mut findings) {
                    if let (Some(a), Some(b)) = (sub_a.get(&name), sub_b.get(&name)) {
                        compare_object(kind, &table_scope.child(name.as_str()), &name, a, b, &mut findings);
                    }
                }
            }
        }

        tracing::info!(
            findings = findings.len(),
            tables_compared = shared.len(),
            "comparison finished"
        );

        Ok(ComparisonOutcome {
            findings,
            tables_compared: shared.len(),
        })
    }

    async fn fetch_tables(&self, side: Side) -> Result<NamedMetadataSet, CompareError> {
        let label = self.labels.for_side(side);
        let mut tables = self.source(side).list_tables().await.map_err(|source| {
            if source.is_connectivity() {
                CompareError::Connectivity {
                    side,
                    label: label.to_string(),
                    source,
                }
            } else {
                CompareError::Fetch {
                    side,
                    kind: ObjectKind::Table,
                    scope: label.to_string(),
                    source,
                }
            }
        })?;

        tables.retain(|name| {
            let skipped = self.filter.is_table_skipped(name);
            if skipped {
                tracing::debug!(table = %name, side = %side, "skipping table");
            }
            !skipped
        });

        tracing::debug!(side = %side, tables = tables.len(), "listed tables");
        Ok(self.normalizer.normalize_set(ObjectKind::Table, tables))
    }

    async fn fetch_nested(
        &self,
        side: Side,
        kind: ObjectKind,
        table: &str,
        scope: &Scope,
    ) -> Result<NamedMetadataSet, CompareError> {
        let set = self
            .source(side)
            .list_nested(kind, table)
            .await
            .map_err(|source| {
                tracing::warn!(side = %side, kind = %kind, table = %table, error = %source, "listing failed");
                CompareError::Fetch {
                    side,
                    kind,
                    scope: scope.path(),
                    source,
                }
            })?;

        Ok(self.normalizer.normalize_set(kind, set))
    }
}

/// Emit existence findings for one level and return the names present on both sides
fn compare_level(
    kind: ObjectKind,
    scope: &Scope,
    a: &NamedMetadataSet,
    b: &NamedMetadataSet,
    findings: &mut Vec<Finding>,
) -> Vec<String> {
    let diff = diff_keys(a, b);

    for name in diff.only_in_a {
        findings.push(Finding::missing_in(Side::Compared, kind, scope.clone(), name));
    }
    for name in diff.only_in_b {
        findings.push(Finding::missing_in(Side::Reference, kind, scope.clone(), name));
    }

    diff.in_both
}

/// Emit property findings for one object present on both sides
fn compare_object(
    kind: ObjectKind,
    scope: &Scope,
    name: &str,
    a: &MetadataRecord,
    b: &MetadataRecord,
    findings: &mut Vec<Finding>,
) {
    findings.extend(compare_properties(a, b).into_iter().map(|delta| {
        Finding::property_mismatch(kind, scope.clone(), name, delta.property, delta.expected, delta.actual)
    }));
}

/// Compare two sources with default settings and return the findings
pub async fn compare(
    reference: &dyn SchemaSource,
    compared: &dyn SchemaSource,
    labels: Labels,
) -> Result<Vec<Finding>, CompareError> {
    Comparison::new(reference, compared, labels)
        .run()
        .await
        .map(|outcome| outcome.findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadrift_catalog::MockSourceBuilder;
    use schemadrift_core::ActualValue;

    fn labels() -> Labels {
        Labels::new("A", "B")
    }

    #[tokio::test]
    async fn missing_table_on_compared_side() {
        let a = MockSourceBuilder::new()
            .with_table("users", MetadataRecord::new())
            .with_table("orders", MetadataRecord::new())
            .build();
        let b = MockSourceBuilder::new()
            .with_table("users", MetadataRecord::new())
            .build();

        let findings = compare(&a, &b, labels()).await.unwrap();

        assert_eq!(
            findings,
            vec![Finding::missing_in(
                Side::Compared,
                ObjectKind::Table,
                Scope::database("B"),
                "orders"
            )]
        );
    }

    #[tokio::test]
    async fn field_type_mismatch() {
        let a = MockSourceBuilder::new()
            .with_table("users", MetadataRecord::new())
            .with_field("users", "email", MetadataRecord::new().with("Type", "varchar(255)"))
            .build();
        let b = MockSourceBuilder::new()
            .with_table("users", MetadataRecord::new())
            .with_field("users", "email", MetadataRecord::new().with("Type", "varchar(100)"))
            .build();

        let findings = compare(&a, &b, labels()).await.unwrap();

        assert_eq!(
            findings,
            vec![Finding::property_mismatch(
                ObjectKind::Field,
                Scope::database("B").child("users").child("email"),
                "email",
                "Type",
                Some("varchar(255)".to_string()),
                ActualValue::Present(Some("varchar(100)".to_string())),
            )]
        );
        assert_eq!(findings[0].scope().path(), "B.users.email");
    }

    #[tokio::test]
    async fn extra_objects_are_missing_in_reference() {
        let a = MockSourceBuilder::new()
            .with_table("users", MetadataRecord::new())
            .build();
        let b = MockSourceBuilder::new()
            .with_table("users", MetadataRecord::new())
            .with_index("users", "idx_tmp", MetadataRecord::new())
            .with_table("scratch", MetadataRecord::new())
            .build();

        let findings = compare(&a, &b, labels()).await.unwrap();

        assert_eq!(
            findings,
            vec![
                Finding::missing_in(Side::Reference, ObjectKind::Table, Scope::database("B"), "scratch"),
                Finding::missing_in(
                    Side::Reference,
                    ObjectKind::Index,
                    Scope::database("B").child("users"),
                    "idx_tmp"
                ),
            ]
        );
    }

    #[tokio::test]
    async fn outcome_counts_shared_tables() {
        let a = MockSourceBuilder::new()
            .with_table("users", MetadataRecord::new())
            .with_table("orders", MetadataRecord::new())
            .build();
        let b = a.clone();

        let outcome = Comparison::new(&a, &b, labels()).run().await.unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.tables_compared, 2);
    }

    #[tokio::test]
    async fn connection_failure_is_connectivity_error() {
        let a = MockSourceBuilder::new().build();
        let b = MockSourceBuilder::new().with_connection_failure().build();

        let err = compare(&a, &b, labels()).await.unwrap_err();
        assert!(matches!(
            err,
            CompareError::Connectivity { side: Side::Compared, ref label, .. } if label == "B"
        ));
    }
}
