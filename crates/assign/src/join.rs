use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::ColumnMapping;
use crate::error::AssignError;
use crate::filter::require_column;
use crate::model::{non_empty, JoinedRow, RequirementRow, Table};

/// Cost center -> cluster lookup.
#[derive(Debug, Clone, Default)]
pub struct ClusterMap {
    clusters: HashMap<String, Option<String>>,
    /// Cost centers that appeared more than once, in first-repeat order.
    pub duplicates: Vec<String>,
}

impl ClusterMap {
    pub fn get(&self, cost_center: &str) -> Option<&str> {
        self.clusters.get(cost_center).and_then(|c| c.as_deref())
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Build the lookup from the cluster-mapping table. First mapping wins.
pub fn load_cluster_map(table: &Table, columns: &ColumnMapping) -> Result<ClusterMap, AssignError> {
    let cost_center_idx = require_column(table, "clusters", &columns.cost_center)?;
    let cluster_idx = require_column(table, "clusters", &columns.cluster)?;

    let mut map = ClusterMap::default();
    let mut repeated = HashSet::new();
    for row in 0..table.rows.len() {
        let Some(cost_center) = non_empty(table.cell(row, cost_center_idx)) else {
            continue;
        };
        let cluster = non_empty(table.cell(row, cluster_idx));
        if map.clusters.contains_key(&cost_center) {
            if repeated.insert(cost_center.clone()) {
                map.duplicates.push(cost_center);
            }
            continue;
        }
        map.clusters.insert(cost_center, cluster);
    }
    Ok(map)
}

/// Left join: every requirement row is kept, unmapped ones get a null cluster.
#[derive(Debug, Clone, Default)]
pub struct JoinOutput {
    pub rows: Vec<JoinedRow>,
    /// Unmapped cost center -> number of rows, sorted by cost center.
    pub unmapped: BTreeMap<String, usize>,
}

impl JoinOutput {
    pub fn unmapped_rows(&self) -> usize {
        self.unmapped.values().sum()
    }
}

pub fn join_clusters(requirements: Vec<RequirementRow>, clusters: &ClusterMap) -> JoinOutput {
    let mut out = JoinOutput::default();
    for requirement in requirements {
        let cluster = clusters.get(&requirement.cost_center).map(str::to_string);
        if cluster.is_none() {
            *out.unmapped.entry(requirement.cost_center.clone()).or_insert(0) += 1;
        }
        out.rows.push(JoinedRow { requirement, cluster });
    }
    out
}
