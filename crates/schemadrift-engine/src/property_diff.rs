//! Directional property comparison between two records of the same object

use schemadrift_core::{ActualValue, MetadataRecord, PropertyValue};

/// One property of the reference record that the compared record does not match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDelta {
    pub property: String,

    /// Value in the reference record
    pub expected: PropertyValue,

    /// Value in the compared record, or `Absent`
    pub actual: ActualValue,
}

/// Compare `b` against the reference record `a`, property by property
///
/// Only properties of `a` are checked, in `a`'s order. Properties that exist
/// only in `b` are not reported. Values are compared exactly: no trimming,
/// case folding or numeric coercion, and NULL only equals NULL.
pub fn compare_properties(a: &MetadataRecord, b: &MetadataRecord) -> Vec<PropertyDelta> {
    a.iter()
        .filter_map(|(property, expected)| {
            let actual = match b.get(property) {
                None => ActualValue::Absent,
                Some(actual) if actual == expected => return None,
                Some(actual) => ActualValue::Present(actual.map(str::to_string)),
            };

            Some(PropertyDelta {
                property: property.to_string(),
                expected: expected.map(str::to_string),
                actual,
            })
        })
        .collect()
}
