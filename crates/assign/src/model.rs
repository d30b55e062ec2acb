use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::GroupBy;
use crate::error::AssignWarning;
use crate::policy::PolicyKind;

// ---------------------------------------------------------------------------
// Labels + positions
// ---------------------------------------------------------------------------

/// The two arms of the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Label {
    #[serde(rename = "Adam Milo")]
    AdamMilo,
    #[serde(rename = "Manpower")]
    Manpower,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdamMilo => "Adam Milo",
            Self::Manpower => "Manpower",
        }
    }

    /// Exact label text only; surrounding whitespace is tolerated.
    pub fn parse(cell: &str) -> Option<Self> {
        match cell.trim() {
            "Adam Milo" => Some(Self::AdamMilo),
            "Manpower" => Some(Self::Manpower),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positions taking part in the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    AdvisorI,
    AdvisorII,
    AdvisorIII,
}

impl Position {
    /// Canonical cell text written to the output table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdvisorI => "ASESOR DE NEGOCIOS 1",
            Self::AdvisorII => "ASESOR DE NEGOCIOS 2",
            Self::AdvisorIII => "ASESOR DE NEGOCIOS 3",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Rectangular string grid exchanged with the IO layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first header equal to `name`. Headers are compared trimmed.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell text; short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Trimmed cell value, `None` when blank.
pub fn non_empty(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// A requirement row that passed the position filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementRow {
    /// 0-based data row index in the requirements table.
    pub source_row: usize,
    pub cost_center: String,
    pub request_code: String,
    pub position: Position,
    pub commercial_force: Option<String>,
}

/// Requirement row after the left join against the cluster mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedRow {
    #[serde(flatten)]
    pub requirement: RequirementRow,
    pub cluster: Option<String>,
}

/// Pre-loaded tables handed to [`crate::run`].
pub struct AssignInput {
    pub requirements: Table,
    pub clusters: Table,
    pub history: Option<Table>,
}

// ---------------------------------------------------------------------------
// Grouping key
// ---------------------------------------------------------------------------

/// Tuple of key parts; `None` is a null cell (e.g. an unmapped cluster).
///
/// Ordering pins group iteration: part by part, null first, numbers compared
/// numerically and placed before text, text compared byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupKey(pub Vec<Option<String>>);

impl GroupKey {
    pub fn for_row(row: &JoinedRow, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Cluster => Self(vec![row.cluster.clone()]),
            GroupBy::Extended => Self(vec![
                row.requirement.commercial_force.clone(),
                Some(row.requirement.position.as_str().to_string()),
                row.cluster.clone(),
            ]),
        }
    }

    pub fn parts(&self) -> &[Option<String>] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .0
            .iter()
            .map(|p| p.as_deref().unwrap_or("<null>"))
            .collect();
        write!(f, "({})", parts.join(", "))
    }
}

fn compare_part(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        },
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let ord = compare_part(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Label tallies: carried over from history, or produced by a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorCounts {
    pub adam: usize,
    pub manpower: usize,
}

impl PriorCounts {
    pub fn new(adam: usize, manpower: usize) -> Self {
        Self { adam, manpower }
    }

    pub fn record(&mut self, label: Label) {
        match label {
            Label::AdamMilo => self.adam += 1,
            Label::Manpower => self.manpower += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.adam + self.manpower
    }

    /// The label with the lower tally, `None` on a tie.
    pub fn lagging(&self) -> Option<Label> {
        match self.adam.cmp(&self.manpower) {
            Ordering::Less => Some(Label::AdamMilo),
            Ordering::Greater => Some(Label::Manpower),
            Ordering::Equal => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedRow {
    #[serde(flatten)]
    pub row: JoinedRow,
    pub label: Label,
}

/// Outcome for a single group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub policy: PolicyKind,
    pub rows: usize,
    pub adam: usize,
    pub manpower: usize,
    /// Counts seeded from history (historical policy only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior: Option<PriorCounts>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignSummary {
    pub total_rows: usize,
    pub total_groups: usize,
    pub adam: usize,
    pub manpower: usize,
    /// Requirement rows dropped by the position filter.
    pub filtered_rows: usize,
    /// Rows kept with a null cluster.
    pub unmapped_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_totals: Option<PriorCounts>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignMeta {
    pub config_name: String,
    pub group_by: GroupBy,
    pub policy: PolicyKind,
    pub seed: u64,
    /// Whether the requirements table carried the commercial-force column.
    pub includes_commercial_force: bool,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignResult {
    pub meta: AssignMeta,
    pub summary: AssignSummary,
    pub groups: Vec<GroupSummary>,
    pub rows: Vec<AssignedRow>,
    pub warnings: Vec<AssignWarning>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
