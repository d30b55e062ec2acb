use crate::config::ColumnMapping;
use crate::error::AssignError;
use crate::model::{non_empty, Position, RequirementRow, Table};

/// Requirement rows that passed the position filter, plus how many did not.
#[derive(Debug, Clone, Default)]
pub struct FilteredRequirements {
    pub rows: Vec<RequirementRow>,
    pub dropped: usize,
    /// Whether the table carried the commercial-force column at all.
    pub has_commercial_force: bool,
}

/// Collapse a raw position cell to its canonical form, or `None` if it is not
/// one of the experiment's positions.
///
/// Case is folded, the cell is trimmed and internal runs of whitespace become a
/// single space, so `"ASESOR DE NEGOCIOS  2  "` matches `"ASESOR DE NEGOCIOS 2"`.
/// Roman numerals (`I`, `II`, `III`) are accepted as well.
pub fn normalize_position(raw: &str) -> Option<Position> {
    let upper = raw.to_uppercase();
    let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
    let grade = collapsed.strip_prefix("ASESOR DE NEGOCIOS ")?;
    match grade {
        "1" | "I" => Some(Position::AdvisorI),
        "2" | "II" => Some(Position::AdvisorII),
        "3" | "III" => Some(Position::AdvisorIII),
        _ => None,
    }
}

pub(crate) fn require_column(table: &Table, table_name: &str, column: &str) -> Result<usize, AssignError> {
    table
        .column_index(column)
        .ok_or_else(|| AssignError::MissingColumn {
            table: table_name.into(),
            column: column.into(),
        })
}

/// Read requirement rows, keeping only valid positions.
///
/// The commercial-force column is optional unless `require_force` is set.
pub fn load_requirements(
    table: &Table,
    columns: &ColumnMapping,
    require_force: bool,
) -> Result<FilteredRequirements, AssignError> {
    let cost_center_idx = require_column(table, "requirements", &columns.cost_center)?;
    let request_code_idx = require_column(table, "requirements", &columns.request_code)?;
    let position_idx = require_column(table, "requirements", &columns.position)?;
    let force_idx = if require_force {
        Some(require_column(table, "requirements", &columns.commercial_force)?)
    } else {
        table.column_index(&columns.commercial_force)
    };

    let mut out = FilteredRequirements {
        has_commercial_force: force_idx.is_some(),
        ..Default::default()
    };

    for row in 0..table.rows.len() {
        let Some(position) = normalize_position(table.cell(row, position_idx)) else {
            out.dropped += 1;
            continue;
        };

        out.rows.push(RequirementRow {
            source_row: row,
            cost_center: table.cell(row, cost_center_idx).trim().to_string(),
            request_code: table.cell(row, request_code_idx).trim().to_string(),
            position,
            commercial_force: force_idx.and_then(|i| non_empty(table.cell(row, i))),
        });
    }

    Ok(out)
}
