//! The balanced assigner.
//!
//! Each group gets its own generator, seeded from the same constant, so a
//! group's labels depend only on its size, its policy and the seed. Re-running
//! on identical input reproduces identical output.
//!
//! Pinned choices:
//! - weighted targets round half up: `adam = (n * pct + 50) / 100`;
//! - even split gives Adam Milo `floor(n / 2)` and Manpower `ceil(n / 2)`,
//!   laid out Adam-first before the shuffle;
//! - historical ties are broken with `gen_bool(0.5)`, `true` meaning Adam Milo.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::{Label, PriorCounts};
use crate::policy::GroupPolicy;

/// Labels for one group plus the tallies after assignment.
///
/// For the historical policy `counts` includes the prior counts it started
/// from; for the others it counts this run only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    pub labels: Vec<Label>,
    pub counts: PriorCounts,
}

/// Fresh generator for one group.
pub fn group_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Number of Adam Milo labels for `n` rows at `pct_adam` percent, rounded half up.
pub fn weighted_adam_target(n: usize, pct_adam: u8) -> usize {
    let pct = usize::from(pct_adam.min(100));
    (n * pct + 50) / 100
}

/// `(adam, manpower)` for an even split; Manpower takes the odd row.
pub fn even_split(n: usize) -> (usize, usize) {
    let adam = n / 2;
    (adam, n - adam)
}

/// Assign `n` labels under `policy`. Pure: same arguments, same labels.
pub fn assign_group(n: usize, policy: GroupPolicy, seed: u64) -> GroupAssignment {
    let mut rng = group_rng(seed);
    match policy {
        GroupPolicy::Weighted { pct_adam } => {
            let adam = weighted_adam_target(n, pct_adam);
            fixed_mix(adam, n - adam, &mut rng)
        }
        GroupPolicy::Even => {
            let (adam, manpower) = even_split(n);
            fixed_mix(adam, manpower, &mut rng)
        }
        GroupPolicy::Historical { prior } => balance_against(n, prior, &mut rng),
    }
}

/// Exact multiset of labels in shuffled order.
fn fixed_mix(adam: usize, manpower: usize, rng: &mut StdRng) -> GroupAssignment {
    let mut labels = Vec::with_capacity(adam + manpower);
    labels.extend(std::iter::repeat(Label::AdamMilo).take(adam));
    labels.extend(std::iter::repeat(Label::Manpower).take(manpower));
    labels.shuffle(rng);
    GroupAssignment {
        labels,
        counts: PriorCounts::new(adam, manpower),
    }
}

/// One row at a time, always to whichever label trails; coin flip on a tie.
fn balance_against(n: usize, prior: PriorCounts, rng: &mut StdRng) -> GroupAssignment {
    let mut counts = prior;
    let mut labels = Vec::with_capacity(n);
    for _ in 0..n {
        let label = counts.lagging().unwrap_or_else(|| {
            if rng.gen_bool(0.5) {
                Label::AdamMilo
            } else {
                Label::Manpower
            }
        });
        counts.record(label);
        labels.push(label);
    }
    GroupAssignment { labels, counts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SEED;

    use crate::model::Label::{AdamMilo as A, Manpower as M};

    fn count(labels: &[Label], label: Label) -> usize {
        labels.iter().filter(|l| **l == label).count()
    }

    #[test]
    fn weighted_70_of_10() {
        let out = assign_group(10, GroupPolicy::Weighted { pct_adam: 70 }, DEFAULT_SEED);
        assert_eq!(out.labels.len(), 10);
        assert_eq!(count(&out.labels, A), 7);
        assert_eq!(count(&out.labels, M), 3);
        assert_eq!(out.counts, PriorCounts::new(7, 3));
    }

    #[test]
    fn weighted_rounds_half_up() {
        assert_eq!(weighted_adam_target(5, 50), 3);
        assert_eq!(weighted_adam_target(3, 50), 2);
        assert_eq!(weighted_adam_target(4, 25), 1);
        assert_eq!(weighted_adam_target(3, 30), 1);
        assert_eq!(weighted_adam_target(7, 70), 5);
        assert_eq!(weighted_adam_target(0, 70), 0);
    }

    #[test]
    fn weighted_extremes_fill_one_label() {
        let all_adam = assign_group(4, GroupPolicy::Weighted { pct_adam: 100 }, DEFAULT_SEED);
        assert_eq!(all_adam.labels, vec![A; 4]);
        let all_manpower = assign_group(4, GroupPolicy::Weighted { pct_adam: 0 }, DEFAULT_SEED);
        assert_eq!(all_manpower.labels, vec![M; 4]);
    }

    #[test]
    fn even_split_gives_odd_row_to_manpower() {
        assert_eq!(even_split(0), (0, 0));
        assert_eq!(even_split(1), (0, 1));
        assert_eq!(even_split(4), (2, 2));
        assert_eq!(even_split(5), (2, 3));
    }

    #[test]
    fn even_split_reference_sequences() {
        // Groups of 5, 4 and 1 under the default seed.
        assert_eq!(
            assign_group(5, GroupPolicy::Even, DEFAULT_SEED).labels,
            vec![M, A, M, M, A]
        );
        assert_eq!(
            assign_group(4, GroupPolicy::Even, DEFAULT_SEED).labels,
            vec![M, A, M, A]
        );
        assert_eq!(assign_group(1, GroupPolicy::Even, DEFAULT_SEED).labels, vec![M]);
    }

    #[test]
    fn empty_group_is_valid() {
        for policy in [
            GroupPolicy::Even,
            GroupPolicy::Weighted { pct_adam: 70 },
            GroupPolicy::Historical { prior: PriorCounts::new(2, 9) },
        ] {
            let out = assign_group(0, policy, DEFAULT_SEED);
            assert!(out.labels.is_empty());
        }
    }

    #[test]
    fn same_seed_same_labels() {
        for n in [2, 7, 31] {
            let a = assign_group(n, GroupPolicy::Even, DEFAULT_SEED);
            let b = assign_group(n, GroupPolicy::Even, DEFAULT_SEED);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn historical_catches_up_before_tie_break() {
        let out = assign_group(
            4,
            GroupPolicy::Historical { prior: PriorCounts::new(3, 5) },
            DEFAULT_SEED,
        );
        // Adam trails by two: the first two rows go to Adam Milo.
        assert_eq!(&out.labels[..2], &[A, A]);
        // Counts are level after row 2, so rows 3 and 4 split one each.
        assert_ne!(out.labels[2], out.labels[3]);
        assert_eq!(out.counts, PriorCounts::new(6, 6));
    }

    #[test]
    fn historical_never_diverges_by_more_than_one_after_catch_up() {
        let out = assign_group(
            9,
            GroupPolicy::Historical { prior: PriorCounts::new(0, 0) },
            DEFAULT_SEED,
        );
        let mut running = PriorCounts::default();
        for label in &out.labels {
            running.record(*label);
            assert!(running.adam.abs_diff(running.manpower) <= 1);
        }
        assert_eq!(running, out.counts);
    }

    #[test]
    fn historical_large_deficit_all_to_trailing_label() {
        let out = assign_group(
            3,
            GroupPolicy::Historical { prior: PriorCounts::new(4, 1) },
            DEFAULT_SEED,
        );
        assert_eq!(out.labels, vec![M, M, M]);
        assert_eq!(out.counts, PriorCounts::new(4, 4));
    }
}
