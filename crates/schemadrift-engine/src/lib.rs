//! SchemaDrift engine - schema comparison
//!
//! This crate turns two [`SchemaSource`](schemadrift_catalog::SchemaSource)s into
//! an ordered list of findings:
//! - Metadata normalization
//! - Key (existence) diff
//! - Directional property diff
//! - The three-level comparison run

pub mod comparison;
pub mod key_diff;
pub mod normalize;
pub mod property_diff;

pub use comparison::{compare, CompareError, Comparison, ComparisonOutcome, Labels};
pub use key_diff::{diff_keys, KeyDiff};
pub use normalize::{normalize, volatile_properties, MetadataNormalizer};
pub use property_diff::{compare_properties, PropertyDelta};
