//! Assembling listing rows into keyed sets

use crate::source::FetchError;
use schemadrift_core::{MetadataRecord, NamedMetadataSet};
use std::collections::BTreeMap;

/// `SHOW INDEX` properties that describe one column of the index
pub const INDEX_COLUMN_PROPERTIES: &[&str] = &[
    "Seq_in_index",
    "Column_name",
    "Collation",
    "Cardinality",
    "Sub_part",
    "Null",
    "Expression",
];

/// Key every record by the value of its `key` property
pub fn keyed_set(records: Vec<MetadataRecord>, key: &str) -> Result<NamedMetadataSet, FetchError> {
    let mut set = NamedMetadataSet::new();

    for record in records {
        let name = record_name(&record, key)?;
        set.insert(name, record);
    }

    Ok(set)
}

/// Fold `SHOW INDEX` rows (one per indexed column) into one record per index
///
/// Rows are ordered by `Seq_in_index`. Per-column properties are joined with
/// `,` in that order, NULL parts becoming empty; a property that is NULL on
/// every row stays NULL. All other properties come from the first column's
/// row, so a single-column index keeps its row unchanged.
pub fn fold_index_rows(rows: Vec<MetadataRecord>) -> Result<NamedMetadataSet, FetchError> {
    let mut grouped: BTreeMap<String, Vec<(u32, MetadataRecord)>> = BTreeMap::new();

    for row in rows {
        let name = record_name(&row, "Key_name")?;
        let seq = match row.get("Seq_in_index") {
            Some(Some(seq)) => seq.parse::<u32>().map_err(|e| {
                FetchError::InvalidResponse(format!("index {}: bad Seq_in_index '{}': {}", name, seq, e))
            })?,
            _ => {
                return Err(FetchError::InvalidResponse(format!(
                    "index {}: row without Seq_in_index",
                    name
                )))
            }
        };
        grouped.entry(name).or_default().push((seq, row));
    }

    let mut set = NamedMetadataSet::new();
    for (name, mut rows) in grouped {
        rows.sort_by_key(|(seq, _)| *seq);
        let rows: Vec<MetadataRecord> = rows.into_iter().map(|(_, row)| row).collect();
        set.insert(name, fold_rows(&rows));
    }

    Ok(set)
}

fn fold_rows(rows: &[MetadataRecord]) -> MetadataRecord {
    let Some(first) = rows.first() else {
        return MetadataRecord::new();
    };
    if rows.len() == 1 {
        return first.clone();
    }

    first
        .iter()
        .map(|(property, value)| {
            if !INDEX_COLUMN_PROPERTIES.contains(&property) {
                return (property, value.map(str::to_string));
            }

            let parts: Vec<Option<&str>> = rows
                .iter()
                .map(|row| row.get(property).flatten())
                .collect();
            let joined = if parts.iter().all(Option::is_none) {
                None
            } else {
                Some(
                    parts
                        .iter()
                        .map(|part| part.unwrap_or(""))
                        .collect::<Vec<_>>()
                        .join(","),
                )
            };
            (property, joined)
        })
        .collect()
}

fn record_name(record: &MetadataRecord, key: &str) -> Result<String, FetchError> {
    match record.get(key) {
        Some(Some(name)) => Ok(name.to_string()),
        _ => Err(FetchError::InvalidResponse(format!("row without a {} value", key))),
    }
}
