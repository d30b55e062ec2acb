use std::collections::BTreeMap;

use crate::config::GroupBy;
use crate::model::{GroupKey, JoinedRow};

/// Rows sharing one grouping-key tuple, in input order.
#[derive(Debug, Clone)]
pub struct Group {
    pub key: GroupKey,
    pub rows: Vec<JoinedRow>,
}

/// Partition rows by key. Groups come back in ascending [`GroupKey`] order;
/// that order feeds the per-group generator and is part of the output contract.
pub fn group_rows(rows: Vec<JoinedRow>, group_by: GroupBy) -> Vec<Group> {
    let mut groups: BTreeMap<GroupKey, Vec<JoinedRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(GroupKey::for_row(&row, group_by)).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|(key, rows)| Group { key, rows })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, RequirementRow};

    fn row(code: &str, force: Option<&str>, position: Position, cluster: Option<&str>) -> JoinedRow {
        JoinedRow {
            requirement: RequirementRow {
                source_row: 0,
                cost_center: "101".into(),
                request_code: code.into(),
                position,
                commercial_force: force.map(str::to_string),
            },
            cluster: cluster.map(str::to_string),
        }
    }

    fn codes(group: &Group) -> Vec<&str> {
        group.rows.iter().map(|r| r.requirement.request_code.as_str()).collect()
    }

    #[test]
    fn cluster_grouping_sorted_with_null_first() {
        let rows = vec![
            row("a", None, Position::AdvisorI, Some("10")),
            row("b", None, Position::AdvisorI, Some("2")),
            row("c", None, Position::AdvisorI, None),
            row("d", None, Position::AdvisorII, Some("10")),
        ];
        let groups = group_rows(rows, GroupBy::Cluster);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, GroupKey(vec![None]));
        assert_eq!(groups[1].key, GroupKey(vec![Some("2".into())]));
        assert_eq!(groups[2].key, GroupKey(vec![Some("10".into())]));
        // Input order preserved inside a group
        assert_eq!(codes(&groups[2]), vec!["a", "d"]);
    }

    #[test]
    fn extended_grouping_splits_by_force_and_position() {
        let rows = vec![
            row("a", Some("MYPE"), Position::AdvisorI, Some("1")),
            row("b", Some("MYPE"), Position::AdvisorII, Some("1")),
            row("c", Some("PYME"), Position::AdvisorI, Some("1")),
            row("d", Some("MYPE"), Position::AdvisorI, Some("1")),
        ];
        let groups = group_rows(rows, GroupBy::Extended);
        assert_eq!(groups.len(), 3);
        assert_eq!(codes(&groups[0]), vec!["a", "d"]);
        assert_eq!(codes(&groups[1]), vec!["b"]);
        assert_eq!(codes(&groups[2]), vec!["c"]);
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(group_rows(Vec::new(), GroupBy::Cluster).is_empty());
    }
}
