use serde::{Deserialize, Serialize};

use crate::error::AssignError;

/// Seed used when the config does not name one.
pub const DEFAULT_SEED: u64 = 2025;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AssignConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Seed for the per-group generator. Every group starts from this value.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub group_by: GroupBy,
    /// Presence of this table enables the weighted policy.
    #[serde(default)]
    pub weighted: Option<WeightedConfig>,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub columns: ColumnMapping,
}

fn default_name() -> String {
    "assignment".into()
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: DEFAULT_SEED,
            group_by: GroupBy::default(),
            weighted: None,
            history: HistoryConfig::default(),
            columns: ColumnMapping::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Which columns form the grouping-key tuple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// `{cluster}`
    #[default]
    Cluster,
    /// `{commercial force, position, cluster}`
    Extended,
}

impl GroupBy {
    /// Column names of the key parts, in key order.
    pub fn key_columns<'a>(&self, columns: &'a ColumnMapping) -> Vec<&'a str> {
        match self {
            Self::Cluster => vec![columns.cluster.as_str()],
            Self::Extended => vec![
                columns.commercial_force.as_str(),
                columns.position.as_str(),
                columns.cluster.as_str(),
            ],
        }
    }
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cluster => write!(f, "cluster"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cluster" => Ok(Self::Cluster),
            "extended" => Ok(Self::Extended),
            other => Err(format!(
                "unknown grouping '{other}' (expected \"cluster\" or \"extended\")"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WeightedConfig {
    /// Share of Adam Milo labels, 0..=100.
    pub pct_adam: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub cost_center: String,
    pub request_code: String,
    pub position: String,
    pub commercial_force: String,
    pub cluster: String,
    pub label: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            cost_center: "NUMERO CENTRO COSTO".into(),
            request_code: "CODIGO RQ".into(),
            position: "PUESTO REQUERIDO".into(),
            commercial_force: "FUERZA COMERCIAL".into(),
            cluster: "cluster".into(),
            label: "Prueba".into(),
        }
    }
}

impl ColumnMapping {
    fn named(&self) -> [(&'static str, &str); 6] {
        [
            ("cost_center", self.cost_center.as_str()),
            ("request_code", self.request_code.as_str()),
            ("position", self.position.as_str()),
            ("commercial_force", self.commercial_force.as_str()),
            ("cluster", self.cluster.as_str()),
            ("label", self.label.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AssignConfig {
    pub fn from_toml(input: &str) -> Result<Self, AssignError> {
        let config: AssignConfig =
            toml::from_str(input).map_err(|e| AssignError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AssignError> {
        if let Some(weighted) = self.weighted {
            if weighted.pct_adam > 100 {
                return Err(AssignError::ConfigValidation(format!(
                    "weighted.pct_adam must be between 0 and 100, got {}",
                    weighted.pct_adam
                )));
            }
        }

        for (key, name) in self.columns.named() {
            if name.trim().is_empty() {
                return Err(AssignError::ConfigValidation(format!(
                    "columns.{key} must not be empty"
                )));
            }
            // Headers are matched after trimming, so a padded name could never match.
            if name.trim() != name {
                return Err(AssignError::ConfigValidation(format!(
                    "columns.{key} '{name}' has leading or trailing whitespace"
                )));
            }
        }

        // The label column is appended to the output; it must not shadow an input column.
        for (key, name) in &self.columns.named()[..5] {
            if *name == self.columns.label {
                return Err(AssignError::ConfigValidation(format!(
                    "columns.label '{}' collides with columns.{key}",
                    self.columns.label
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
