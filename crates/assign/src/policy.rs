use serde::Serialize;

use crate::config::WeightedConfig;
use crate::history::HistoricalCounts;
use crate::model::{GroupKey, PriorCounts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Weighted,
    Historical,
    Even,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weighted => write!(f, "weighted"),
            Self::Historical => write!(f, "historical"),
            Self::Even => write!(f, "even"),
        }
    }
}

/// Run-wide policy, chosen once before any group is assigned.
#[derive(Debug, Clone)]
pub enum Policy {
    Weighted { pct_adam: u8 },
    Historical(HistoricalCounts),
    Even,
}

/// What a single group is assigned under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPolicy {
    Weighted { pct_adam: u8 },
    Historical { prior: PriorCounts },
    Even,
}

/// Precedence: weighted > historical > even.
pub fn select_policy(weighted: Option<WeightedConfig>, history: Option<HistoricalCounts>) -> Policy {
    match (weighted, history) {
        (Some(w), _) => Policy::Weighted { pct_adam: w.pct_adam },
        (None, Some(counts)) => Policy::Historical(counts),
        (None, None) => Policy::Even,
    }
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Weighted { .. } => PolicyKind::Weighted,
            Self::Historical(_) => PolicyKind::Historical,
            Self::Even => PolicyKind::Even,
        }
    }

    /// Resolve the policy for one group. Historical counters are copied out per
    /// key, so nothing assigned in one group leaks into another.
    pub fn for_group(&self, key: &GroupKey) -> GroupPolicy {
        match self {
            Self::Weighted { pct_adam } => GroupPolicy::Weighted { pct_adam: *pct_adam },
            Self::Historical(counts) => GroupPolicy::Historical {
                prior: counts.prior_for(key),
            },
            Self::Even => GroupPolicy::Even,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(key: &GroupKey, prior: PriorCounts) -> HistoricalCounts {
        let mut h = HistoricalCounts::default();
        h.counts.insert(key.clone(), prior);
        h.totals = prior;
        h
    }

    #[test]
    fn weighted_wins_over_history() {
        let key = GroupKey(vec![Some("1".into())]);
        let policy = select_policy(
            Some(WeightedConfig { pct_adam: 70 }),
            Some(history_with(&key, PriorCounts::new(1, 1))),
        );
        assert_eq!(policy.kind(), PolicyKind::Weighted);
        assert_eq!(policy.for_group(&key), GroupPolicy::Weighted { pct_adam: 70 });
    }

    #[test]
    fn history_when_not_weighted() {
        let key = GroupKey(vec![Some("1".into())]);
        let policy = select_policy(None, Some(history_with(&key, PriorCounts::new(3, 5))));
        assert_eq!(policy.kind(), PolicyKind::Historical);
        assert_eq!(
            policy.for_group(&key),
            GroupPolicy::Historical { prior: PriorCounts::new(3, 5) }
        );
        // Unknown key: cold start
        assert_eq!(
            policy.for_group(&GroupKey(vec![None])),
            GroupPolicy::Historical { prior: PriorCounts::default() }
        );
    }

    #[test]
    fn even_otherwise() {
        let policy = select_policy(None, None);
        assert_eq!(policy.kind(), PolicyKind::Even);
        assert_eq!(policy.for_group(&GroupKey(vec![None])), GroupPolicy::Even);
    }
}
