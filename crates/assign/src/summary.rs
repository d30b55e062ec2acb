use crate::model::{AssignSummary, GroupSummary, PriorCounts};

/// Run-level totals from the per-group outcomes.
pub fn compute_summary(
    groups: &[GroupSummary],
    filtered_rows: usize,
    unmapped_rows: usize,
    history_totals: Option<PriorCounts>,
) -> AssignSummary {
    let mut adam = 0;
    let mut manpower = 0;
    let mut total_rows = 0;

    for g in groups {
        adam += g.adam;
        manpower += g.manpower;
        total_rows += g.rows;
    }

    AssignSummary {
        total_rows,
        total_groups: groups.len(),
        adam,
        manpower,
        filtered_rows,
        unmapped_rows,
        history_totals,
    }
}
