//! Existence diff between two keyed collections
//!
//! Works the same for tables, columns and indexes.

use schemadrift_core::NamedMetadataSet;
use std::cmp::Ordering;

/// Classification of every name from two sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    /// Names only in the first set, sorted
    pub only_in_a: Vec<String>,

    /// Names only in the second set, sorted
    pub only_in_b: Vec<String>,

    /// Names in both sets, sorted
    pub in_both: Vec<String>,
}

impl KeyDiff {
    /// True when both sets have exactly the same names
    pub fn is_balanced(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty()
    }
}

/// Split the names of `a` and `b` into one-sided and shared names
///
/// Both sets iterate in sorted order, so this is a single merge pass.
pub fn diff_keys(a: &NamedMetadataSet, b: &NamedMetadataSet) -> KeyDiff {
    let mut diff = KeyDiff::default();
    let mut left = a.names().peekable();
    let mut right = b.names().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (Some(l), Some(r)) => match l.cmp(r) {
                Ordering::Less => {
                    diff.only_in_a.push(l.to_string());
                    left.next();
                }
                Ordering::Greater => {
                    diff.only_in_b.push(r.to_string());
                    right.next();
                }
                Ordering::Equal => {
                    diff.in_both.push(l.to_string());
                    left.next();
                    right.next();
                }
            },
            (Some(l), None) => {
                diff.only_in_a.push(l.to_string());
                left.next();
            }
            (None, Some(r)) => {
                diff.only_in_b.push(r.to_string());
                right.next();
            }
            (None, None) => break,
        }
    }

    diff
}
