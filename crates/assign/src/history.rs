use std::collections::BTreeMap;

use crate::config::{ColumnMapping, GroupBy};
use crate::filter::normalize_position;
use crate::model::{non_empty, GroupKey, Label, PriorCounts, Table};

/// Prior label counts per grouping key, from a previous run's export.
#[derive(Debug, Clone, Default)]
pub struct HistoricalCounts {
    pub counts: BTreeMap<GroupKey, PriorCounts>,
    /// Sum over every key.
    pub totals: PriorCounts,
    /// Rows whose label cell was neither label.
    pub ignored_rows: usize,
}

impl HistoricalCounts {
    /// Counts for `key`; keys never seen before start from zero.
    pub fn prior_for(&self, key: &GroupKey) -> PriorCounts {
        self.counts.get(key).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum HistoryOutcome {
    Usable(HistoricalCounts),
    /// No historical data usable; the caller degrades to another policy.
    Unusable { reason: String },
}

/// Tally prior labels per grouping key.
///
/// The historical table needs the label column and every key column of the
/// configured grouping. When any of them is missing the history is reported as
/// unusable instead of failing the run.
pub fn extract_prior_counts(table: &Table, columns: &ColumnMapping, group_by: GroupBy) -> HistoryOutcome {
    let Some(label_idx) = table.column_index(&columns.label) else {
        return HistoryOutcome::Unusable {
            reason: format!("history table has no '{}' column", columns.label),
        };
    };

    let mut key_idx = Vec::new();
    for column in group_by.key_columns(columns) {
        match table.column_index(column) {
            Some(idx) => key_idx.push(idx),
            None => {
                return HistoryOutcome::Unusable {
                    reason: format!("history table has no '{column}' column"),
                }
            }
        }
    }

    let mut out = HistoricalCounts::default();
    for row in 0..table.rows.len() {
        let Some(label) = Label::parse(table.cell(row, label_idx)) else {
            out.ignored_rows += 1;
            continue;
        };

        let key = match group_by {
            GroupBy::Cluster => GroupKey(vec![non_empty(table.cell(row, key_idx[0]))]),
            GroupBy::Extended => {
                let raw_position = table.cell(row, key_idx[1]);
                let position = match normalize_position(raw_position) {
                    Some(p) => Some(p.as_str().to_string()),
                    None => non_empty(raw_position),
                };
                GroupKey(vec![
                    non_empty(table.cell(row, key_idx[0])),
                    position,
                    non_empty(table.cell(row, key_idx[2])),
                ])
            }
        };

        out.counts.entry(key).or_default().record(label);
        out.totals.record(label);
    }

    HistoryOutcome::Usable(out)
}
