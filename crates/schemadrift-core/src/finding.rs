//! Findings produced by a schema comparison
//!
//! IMPORTANT: Finding codes are stable.
//! NEVER rename or remove codes - they appear in JSON reports consumed by CI jobs.

use crate::metadata::{ObjectKind, PropertyValue};
use serde::{Deserialize, Serialize};

/// Finding code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    /// An object of the reference database is missing from the compared database
    MissingObject,

    /// The compared database has an object the reference database does not
    UnexpectedObject,

    /// A reference property is absent from the compared object
    MissingProperty,

    /// A property value differs between the two objects
    PropertyMismatch,
}

impl FindingCode {
    /// Get the finding code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingObject => "MISSING_OBJECT",
            Self::UnexpectedObject => "UNEXPECTED_OBJECT",
            Self::MissingProperty => "MISSING_PROPERTY",
            Self::PropertyMismatch => "PROPERTY_MISMATCH",
        }
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Database used as the template (A)
    Reference,

    /// Database checked against the template (B)
    Compared,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Compared => write!(f, "compared"),
        }
    }
}

/// Where a finding occurred: `database`, `database.table` or `database.table.object`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Display label of the database
    pub database: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Column or index name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl Scope {
    /// Database-level scope
    pub fn database(label: impl Into<String>) -> Self {
        Self {
            database: label.into(),
            table: None,
            object: None,
        }
    }

    /// Narrow this scope by one level.
    ///
    /// A scope that is already at object level is returned unchanged.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut scope = self.clone();
        match (&scope.table, &scope.object) {
            (None, _) => scope.table = Some(name.into()),
            (Some(_), None) => scope.object = Some(name.into()),
            (Some(_), Some(_)) => {}
        }
        scope
    }

    /// Dot-joined path
    pub fn path(&self) -> String {
        let mut path = self.database.clone();
        for segment in [&self.table, &self.object].into_iter().flatten() {
            path.push('.');
            path.push_str(segment);
        }
        path
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Value observed on the compared side of a property comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum ActualValue {
    /// The compared record has no such property
    Absent,

    /// The compared record has the property (possibly NULL)
    Present(PropertyValue),
}

/// A single detected discrepancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    /// The object exists on one side only; `side` is the side lacking it
    MissingIn {
        side: Side,
        kind: ObjectKind,
        scope: Scope,
        name: String,
    },

    /// A reference property differs on, or is absent from, the compared object
    PropertyMismatch {
        side: Side,
        kind: ObjectKind,
        scope: Scope,
        name: String,
        property: String,
        expected: PropertyValue,
        actual: ActualValue,
    },
}

impl Finding {
    /// Object present on the opposite side only
    pub fn missing_in(side: Side, kind: ObjectKind, scope: Scope, name: impl Into<String>) -> Self {
        Self::MissingIn {
            side,
            kind,
            scope,
            name: name.into(),
        }
    }

    /// Property difference seen on the compared side
    pub fn property_mismatch(
        kind: ObjectKind,
        scope: Scope,
        name: impl Into<String>,
        property: impl Into<String>,
        expected: PropertyValue,
        actual: ActualValue,
    ) -> Self {
        Self::PropertyMismatch {
            side: Side::Compared,
            kind,
            scope,
            name: name.into(),
            property: property.into(),
            expected,
            actual,
        }
    }

    pub fn code(&self) -> FindingCode {
        match self {
            Self::MissingIn { side: Side::Compared, .. } => FindingCode::MissingObject,
            Self::MissingIn { side: Side::Reference, .. } => FindingCode::UnexpectedObject,
            Self::PropertyMismatch { actual: ActualValue::Absent, .. } => FindingCode::MissingProperty,
            Self::PropertyMismatch { .. } => FindingCode::PropertyMismatch,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Self::MissingIn { side, .. } | Self::PropertyMismatch { side, .. } => *side,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::MissingIn { kind, .. } | Self::PropertyMismatch { kind, .. } => *kind,
        }
    }

    pub fn scope(&self) -> &Scope {
        match self {
            Self::MissingIn { scope, .. } | Self::PropertyMismatch { scope, .. } => scope,
        }
    }

    /// Name of the object the finding is about
    pub fn name(&self) -> &str {
        match self {
            Self::MissingIn { name, .. } | Self::PropertyMismatch { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finding_code_stability() {
        assert_eq!(FindingCode::MissingObject.as_str(), "MISSING_OBJECT");
        assert_eq!(FindingCode::PropertyMismatch.as_str(), "PROPERTY_MISMATCH");
    }

    #[test]
    fn scope_paths() {
        let db = Scope::database("prod");
        let table = db.child("users");
        let column = table.child("email");

        assert_eq!(db.path(), "prod");
        assert_eq!(table.path(), "prod.users");
        assert_eq!(column.to_string(), "prod.users.email");
        assert_eq!(column.child("ignored"), column);
    }

    #[test]
    fn codes_follow_side_and_actual() {
        let scope = Scope::database("prod");
        let missing = Finding::missing_in(Side::Compared, ObjectKind::Table, scope.clone(), "orders");
        let extra = Finding::missing_in(Side::Reference, ObjectKind::Table, scope.clone(), "tmp");
        let absent = Finding::property_mismatch(
            ObjectKind::Table,
            scope.child("users"),
            "users",
            "Collation",
            Some("utf8_general_ci".to_string()),
            ActualValue::Absent,
        );
        let differs = Finding::property_mismatch(
            ObjectKind::Table,
            scope.child("users"),
            "users",
            "Engine",
            Some("InnoDB".to_string()),
            ActualValue::Present(Some("MyISAM".to_string())),
        );

        assert_eq!(missing.code(), FindingCode::MissingObject);
        assert_eq!(extra.code(), FindingCode::UnexpectedObject);
        assert_eq!(absent.code(), FindingCode::MissingProperty);
        assert_eq!(differs.code(), FindingCode::PropertyMismatch);
        assert_eq!(differs.side(), Side::Compared);
    }

    #[test]
    fn finding_serialization() {
        let finding = Finding::property_mismatch(
            ObjectKind::Field,
            Scope::database("prod").child("users").child("email"),
            "email",
            "Type",
            Some("varchar(255)".to_string()),
            ActualValue::Present(Some("varchar(100)".to_string())),
        );

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["finding"], "property_mismatch");
        assert_eq!(json["kind"], "field");
        assert_eq!(json["actual"]["state"], "present");
        assert_eq!(json["actual"]["value"], "varchar(100)");
        assert_eq!(json["scope"]["object"], "email");
    }
}
