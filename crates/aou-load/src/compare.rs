//! Participant-level comparison of two exports.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use aou_model::{OutputRecord, PMI_ID_COLUMN};
use serde::Serialize;

use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChange {
    pub column: String,
    pub left: String,
    pub right: String,
}

/// Every shared column whose value differs for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantDiff {
    pub pmi_id: String,
    pub changes: Vec<ColumnChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub differing: Vec<ParticipantDiff>,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
    pub matched: usize,
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        self.differing.is_empty() && self.only_left.is_empty() && self.only_right.is_empty()
    }
}

/// Reads a CSV export back into records.
pub fn read_export(path: &Path) -> Result<Vec<OutputRecord>, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| LoadError::csv(path, err))?;
    let headers = reader
        .headers()
        .map_err(|err| LoadError::csv(path, err))?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();
    if !headers.iter().any(|header| header == PMI_ID_COLUMN) {
        return Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: PMI_ID_COLUMN.to_string(),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| LoadError::csv(path, err))?;
        records.push(headers.iter().cloned().zip(row.iter()).collect());
    }
    Ok(records)
}

/// Compares two exports keyed by `PMI ID`.
///
/// Only columns present on both sides are compared. Output follows the
/// left export's row order and the right export's column order.
pub fn compare(left: &[OutputRecord], right: &[OutputRecord]) -> Comparison {
    let right_by_id: HashMap<&str, &OutputRecord> = right
        .iter()
        .filter_map(|record| Some((record.get(PMI_ID_COLUMN)?, record)))
        .collect();

    let mut comparison = Comparison::default();
    let mut seen = HashSet::with_capacity(left.len());
    for left_record in left {
        let Some(pmi_id) = left_record.get(PMI_ID_COLUMN) else {
            continue;
        };
        seen.insert(pmi_id);
        let Some(right_record) = right_by_id.get(pmi_id) else {
            comparison.only_left.push(pmi_id.to_string());
            continue;
        };

        comparison.matched += 1;
        let changes: Vec<ColumnChange> = right_record
            .iter()
            .filter_map(|(column, right_value)| {
                let left_value = left_record.get(column)?;
                (left_value != right_value).then(|| ColumnChange {
                    column: column.to_string(),
                    left: left_value.to_string(),
                    right: right_value.to_string(),
                })
            })
            .collect();
        if !changes.is_empty() {
            comparison.differing.push(ParticipantDiff {
                pmi_id: pmi_id.to_string(),
                changes,
            });
        }
    }

    comparison.only_right = right
        .iter()
        .filter_map(|record| record.get(PMI_ID_COLUMN))
        .filter(|pmi_id| !seen.contains(pmi_id))
        .map(str::to_string)
        .collect();
    comparison
}
