use tracing::{debug, info, warn};

use crate::assign::assign_group;
use crate::config::{AssignConfig, ColumnMapping, GroupBy};
use crate::error::{AssignError, AssignWarning};
use crate::filter::{load_requirements, require_column};
use crate::group::group_rows;
use crate::history::{extract_prior_counts, HistoricalCounts, HistoryOutcome};
use crate::join::{join_clusters, load_cluster_map};
use crate::model::{
    AssignInput, AssignMeta, AssignResult, AssignedRow, GroupSummary, Label, Table,
};
use crate::policy::{select_policy, GroupPolicy};
use crate::summary::compute_summary;

/// Run the assignment per config. Returns labelled rows, per-group outcomes,
/// a summary and any degraded-mode warnings.
pub fn run(config: &AssignConfig, input: &AssignInput) -> Result<AssignResult, AssignError> {
    config.validate()?;
    let columns = &config.columns;

    // The join key must exist on both sides before anything else is read.
    require_column(&input.requirements, "requirements", &columns.cost_center)?;
    require_column(&input.clusters, "clusters", &columns.cost_center)?;

    let requirements = load_requirements(
        &input.requirements,
        columns,
        config.group_by == GroupBy::Extended,
    )?;
    let cluster_map = load_cluster_map(&input.clusters, columns)?;
    debug!(
        kept = requirements.rows.len(),
        dropped = requirements.dropped,
        mapped_cost_centers = cluster_map.len(),
        "requirements loaded"
    );

    let mut warnings = Vec::new();

    if !cluster_map.duplicates.is_empty() {
        warn!(cost_centers = ?cluster_map.duplicates, "duplicate cluster mappings");
        warnings.push(AssignWarning::DuplicateClusterMapping {
            cost_centers: cluster_map.duplicates.clone(),
        });
    }

    let joined = join_clusters(requirements.rows, &cluster_map);
    let unmapped_rows = joined.unmapped_rows();
    if unmapped_rows > 0 {
        let cost_centers: Vec<String> = joined.unmapped.keys().cloned().collect();
        warn!(rows = unmapped_rows, cost_centers = ?cost_centers, "cost centers without cluster");
        warnings.push(AssignWarning::UnmappedCostCenters {
            cost_centers,
            rows: unmapped_rows,
        });
    }

    let history = resolve_history(config, input.history.as_ref(), &mut warnings);
    let history_totals = history.as_ref().map(|h| h.totals);
    let policy = select_policy(config.weighted, history);
    info!(
        policy = %policy.kind(),
        group_by = %config.group_by,
        seed = config.seed,
        rows = joined.rows.len(),
        "assigning labels"
    );

    let mut groups = Vec::new();
    let mut rows = Vec::with_capacity(joined.rows.len());

    for group in group_rows(joined.rows, config.group_by) {
        let group_policy = policy.for_group(&group.key);
        let assignment = assign_group(group.rows.len(), group_policy, config.seed);

        let adam = assignment.labels.iter().filter(|l| **l == Label::AdamMilo).count();
        let manpower = assignment.labels.len() - adam;
        debug!(key = %group.key, rows = group.rows.len(), adam, manpower, "group assigned");

        groups.push(GroupSummary {
            key: group.key,
            policy: policy.kind(),
            rows: assignment.labels.len(),
            adam,
            manpower,
            prior: match group_policy {
                GroupPolicy::Historical { prior } => Some(prior),
                _ => None,
            },
        });

        rows.extend(
            group
                .rows
                .into_iter()
                .zip(assignment.labels)
                .map(|(row, label)| AssignedRow { row, label }),
        );
    }

    // Groups fix the draw order only; the table comes back in input order.
    rows.sort_by_key(|assigned| assigned.row.requirement.source_row);

    let summary = compute_summary(&groups, requirements.dropped, unmapped_rows, history_totals);

    Ok(AssignResult {
        meta: AssignMeta {
            config_name: config.name.clone(),
            group_by: config.group_by,
            policy: policy.kind(),
            seed: config.seed,
            includes_commercial_force: requirements.has_commercial_force,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        groups,
        rows,
        warnings,
    })
}

/// Extract prior counts, degrading to `None` (with a warning) when unusable.
fn resolve_history(
    config: &AssignConfig,
    table: Option<&Table>,
    warnings: &mut Vec<AssignWarning>,
) -> Option<HistoricalCounts> {
    let table = table?;
    if !config.history.enabled {
        debug!("history supplied but disabled by config");
        return None;
    }

    match extract_prior_counts(table, &config.columns, config.group_by) {
        HistoryOutcome::Usable(counts) => {
            if counts.ignored_rows > 0 {
                warn!(rows = counts.ignored_rows, "historical rows without a recognised label");
                warnings.push(AssignWarning::HistoryRowsIgnored {
                    rows: counts.ignored_rows,
                });
            }
            info!(
                adam = counts.totals.adam,
                manpower = counts.totals.manpower,
                keys = counts.counts.len(),
                "history loaded"
            );
            Some(counts)
        }
        HistoryOutcome::Unusable { reason } => {
            warn!(%reason, "history ignored");
            warnings.push(AssignWarning::HistoryUnusable { reason });
            None
        }
    }
}

/// Render the result as the joined table plus the label column.
///
/// Columns: cost center, request code, position, commercial force (only when the
/// requirements table had it), cluster, label. Null cells are written empty.
pub fn output_table(result: &AssignResult, columns: &ColumnMapping) -> Table {
    let with_force = result.meta.includes_commercial_force;

    let mut headers = vec![
        columns.cost_center.clone(),
        columns.request_code.clone(),
        columns.position.clone(),
    ];
    if with_force {
        headers.push(columns.commercial_force.clone());
    }
    headers.push(columns.cluster.clone());
    headers.push(columns.label.clone());

    let rows = result
        .rows
        .iter()
        .map(|assigned| {
            let req = &assigned.row.requirement;
            let mut cells = vec![
                req.cost_center.clone(),
                req.request_code.clone(),
                req.position.as_str().to_string(),
            ];
            if with_force {
                cells.push(req.commercial_force.clone().unwrap_or_default());
            }
            cells.push(assigned.row.cluster.clone().unwrap_or_default());
            cells.push(assigned.label.as_str().to_string());
            cells
        })
        .collect();

    Table::new(headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeightedConfig;
    use crate::model::PriorCounts;
    use crate::policy::PolicyKind;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn requirements() -> Table {
        table(
            &["NUMERO CENTRO COSTO", "CODIGO RQ", "PUESTO REQUERIDO"],
            &[
                &["101", "RQ1", "ASESOR DE NEGOCIOS 1"],
                &["101", "RQ2", "ASESOR DE NEGOCIOS  2  "],
                &["102", "RQ3", "ASESOR DE NEGOCIOS 3"],
                &["999", "RQ4", "ASESOR DE NEGOCIOS 1"],
                &["102", "RQ5", "GERENTE"],
            ],
        )
    }

    fn clusters() -> Table {
        table(&["NUMERO CENTRO COSTO", "cluster"], &[&["101", "1"], &["102", "1"]])
    }

    fn input(history: Option<Table>) -> AssignInput {
        AssignInput {
            requirements: requirements(),
            clusters: clusters(),
            history,
        }
    }

    #[test]
    fn even_run_labels_every_kept_row() {
        let result = run(&AssignConfig::default(), &input(None)).unwrap();
        assert_eq!(result.meta.policy, PolicyKind::Even);
        assert_eq!(result.summary.total_rows, 4);
        assert_eq!(result.summary.filtered_rows, 1);
        assert_eq!(result.summary.unmapped_rows, 1);
        assert_eq!(result.summary.total_groups, 2);
        // Null cluster group first
        assert_eq!(result.groups[0].key.parts(), &[None]);
        assert_eq!(result.groups[0].rows, 1);
        assert_eq!(result.groups[1].rows, 3);
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            AssignWarning::UnmappedCostCenters { rows: 1, .. }
        ));
    }

    #[test]
    fn missing_cost_center_in_clusters_halts() {
        let mut inp = input(None);
        inp.clusters = table(&["CECO", "cluster"], &[&["101", "1"]]);
        let err = run(&AssignConfig::default(), &inp).unwrap_err();
        assert!(err.is_input_shape());
        assert!(err.to_string().contains("clusters table"));
    }

    #[test]
    fn history_without_label_column_degrades_to_even() {
        let history = table(&["cluster", "Marca"], &[&["1", "Adam Milo"]]);
        let result = run(&AssignConfig::default(), &input(Some(history))).unwrap();
        assert_eq!(result.meta.policy, PolicyKind::Even);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, AssignWarning::HistoryUnusable { .. })));
        assert!(result.summary.history_totals.is_none());
    }

    #[test]
    fn usable_history_selects_historical_policy() {
        let history = table(
            &["cluster", "Prueba"],
            &[&["1", "Manpower"], &["1", "Manpower"], &["1", "Manpower"]],
        );
        let result = run(&AssignConfig::default(), &input(Some(history))).unwrap();
        assert_eq!(result.meta.policy, PolicyKind::Historical);
        let cluster_1 = &result.groups[1];
        assert_eq!(cluster_1.prior, Some(PriorCounts::new(0, 3)));
        // Three rows, Adam trails by three: all Adam.
        assert_eq!(cluster_1.adam, 3);
        // Unmapped group has no history: cold start.
        assert_eq!(result.groups[0].prior, Some(PriorCounts::default()));
        assert_eq!(result.summary.history_totals, Some(PriorCounts::new(0, 3)));
    }

    #[test]
    fn disabled_history_is_not_read() {
        let mut config = AssignConfig::default();
        config.history.enabled = false;
        let history = table(&["cluster", "Prueba"], &[&["1", "Manpower"]]);
        let result = run(&config, &input(Some(history))).unwrap();
        assert_eq!(result.meta.policy, PolicyKind::Even);
        assert!(result.warnings.iter().all(|w| !matches!(w, AssignWarning::HistoryUnusable { .. })));
    }

    #[test]
    fn weighted_overrides_history() {
        let config = AssignConfig {
            weighted: Some(WeightedConfig { pct_adam: 100 }),
            ..AssignConfig::default()
        };
        let history = table(&["cluster", "Prueba"], &[&["1", "Adam Milo"]]);
        let result = run(&config, &input(Some(history))).unwrap();
        assert_eq!(result.meta.policy, PolicyKind::Weighted);
        assert!(result.rows.iter().all(|r| r.label == Label::AdamMilo));
    }

    #[test]
    fn output_table_shape() {
        let config = AssignConfig::default();
        let result = run(&config, &input(None)).unwrap();
        let out = output_table(&result, &config.columns);
        assert_eq!(
            out.headers,
            vec!["NUMERO CENTRO COSTO", "CODIGO RQ", "PUESTO REQUERIDO", "cluster", "Prueba"]
        );
        assert_eq!(out.rows.len(), 4);
        // Input order, unmapped row keeps its place with an empty cluster cell
        let codes: Vec<&str> = out.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(codes, vec!["RQ1", "RQ2", "RQ3", "RQ4"]);
        assert_eq!(out.rows[3][0], "999");
        assert_eq!(out.rows[3][3], "");
        // Canonical position text
        assert_eq!(out.rows[1][2], "ASESOR DE NEGOCIOS 2");
        for row in &out.rows {
            assert!(row[4] == "Adam Milo" || row[4] == "Manpower");
        }
    }
}
