use std::fmt;

use serde::Serialize;

/// Fatal failures. No partial output is produced when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (percentage out of range, empty column name, etc.).
    ConfigValidation(String),
    /// Missing required column in an input table.
    MissingColumn { table: String, column: String },
}

impl AssignError {
    /// True when the input tables themselves have the wrong shape.
    pub fn is_input_shape(&self) -> bool {
        matches!(self, Self::MissingColumn { .. })
    }
}

impl fmt::Display for AssignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, column } => {
                write!(f, "{table} table: missing column '{column}'")
            }
        }
    }
}

impl std::error::Error for AssignError {}

/// Recoverable conditions. The run completes; these travel with the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignWarning {
    /// Historical table could not be used; assignment fell back to another policy.
    HistoryUnusable { reason: String },
    /// Historical rows whose label cell was neither label.
    HistoryRowsIgnored { rows: usize },
    /// Requirement rows whose cost center has no cluster mapping.
    UnmappedCostCenters { cost_centers: Vec<String>, rows: usize },
    /// Cost centers mapped more than once; the first mapping is used.
    DuplicateClusterMapping { cost_centers: Vec<String> },
}

impl fmt::Display for AssignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HistoryUnusable { reason } => {
                write!(f, "historical data ignored: {reason}")
            }
            Self::HistoryRowsIgnored { rows } => {
                write!(f, "{rows} historical row(s) without a recognised label were skipped")
            }
            Self::UnmappedCostCenters { cost_centers, rows } => write!(
                f,
                "{rows} row(s) from {} cost center(s) have no cluster: {}",
                cost_centers.len(),
                cost_centers.join(", ")
            ),
            Self::DuplicateClusterMapping { cost_centers } => write!(
                f,
                "cost center(s) mapped more than once, first mapping used: {}",
                cost_centers.join(", ")
            ),
        }
    }
}
