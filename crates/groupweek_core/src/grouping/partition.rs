//! Base group partitioning.
//!
//! # Responsibility
//! - Split the present set into base groups after a uniform shuffle.
//! - Choose group sizes from the policy: exact fit first, chunking second.
//!
//! # Invariants
//! - Output groups partition the input exactly.
//! - With default policy and `n >= 3`, every group size is in `3..=5`.
//! - Sizing is deterministic in `n`; only membership is randomized.

use crate::model::participant::ParticipantId;
use crate::model::week::BaseGroup;
use crate::policy::GroupingPolicy;
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Partitions `present` into base groups.
///
/// Returns an empty list for an empty input. Rosters smaller than the
/// minimum group size come back as one undersized group.
pub fn partition<R: Rng + ?Sized>(
    present: &BTreeSet<ParticipantId>,
    policy: &GroupingPolicy,
    rng: &mut R,
) -> Vec<BaseGroup> {
    let mut order: Vec<ParticipantId> = present.iter().cloned().collect();
    order.shuffle(rng);

    let sizes = group_sizes(order.len(), policy);
    if sizes.len() > policy.max_group_count {
        warn!(
            "event=partition module=grouping status=warn reason=group_cap_exceeded participants={} groups={} cap={}",
            order.len(),
            sizes.len(),
            policy.max_group_count
        );
    }

    let mut members = order.into_iter();
    sizes
        .into_iter()
        .map(|size| members.by_ref().take(size).collect::<BaseGroup>())
        .collect()
}

/// Group sizes for a roster of `n`, in output order.
pub fn group_sizes(n: usize, policy: &GroupingPolicy) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }

    match exact_fit_count(n, policy) {
        Some(count) => even_split(n, count),
        None => chunked_sizes(n, policy),
    }
}

/// Smallest group count whose even split lands on the preferred size, or on
/// the minimum size with no remainder.
fn exact_fit_count(n: usize, policy: &GroupingPolicy) -> Option<usize> {
    let preferred = policy.preferred_group_size;
    let min = policy.min_group_size;
    if preferred == 0 || min == 0 {
        return None;
    }

    let lower = (n / preferred).max(1);
    let upper = (n / min).min(policy.max_group_count);
    (lower..=upper).find(|&count| {
        let base = n / count;
        let remainder = n % count;
        let preferred_fit =
            base == preferred && (remainder == 0 || base + 1 <= policy.max_group_size);
        let min_fit = base == min && remainder == 0;
        preferred_fit || min_fit
    })
}

/// Consecutive chunks of the preferred size.
///
/// An undersized tail is spread one member per leading group when enough
/// groups exist and the grown size stays within the maximum. Failing that,
/// the roster is split evenly over a group count that keeps every size in
/// bounds; the tail is kept as its own group only when no such count exists.
fn chunked_sizes(n: usize, policy: &GroupingPolicy) -> Vec<usize> {
    let preferred = policy.preferred_group_size.max(1);
    let mut sizes = vec![preferred; n / preferred];
    let tail = n % preferred;
    if tail == 0 || tail >= policy.min_group_size {
        if tail > 0 {
            sizes.push(tail);
        }
        return sizes;
    }

    if sizes.len() >= tail && preferred < policy.max_group_size {
        for size in sizes.iter_mut().take(tail) {
            *size += 1;
        }
        return sizes;
    }

    match balanced_count(n, policy) {
        Some(count) => even_split(n, count),
        None => {
            sizes.push(tail);
            sizes
        }
    }
}

/// Group count in `ceil(n / max)..=n / min` closest to `n / preferred`.
fn balanced_count(n: usize, policy: &GroupingPolicy) -> Option<usize> {
    let max = policy.max_group_size.max(1);
    let min = policy.min_group_size.max(1);
    let preferred = policy.preferred_group_size.max(1);
    (n.div_ceil(max)..=n / min)
        .filter(|&count| count > 0)
        .min_by_key(|&count| (n.abs_diff(count * preferred), count))
}

/// `count` sizes summing to `n`, larger ones first.
fn even_split(n: usize, count: usize) -> Vec<usize> {
    let base = n / count;
    let larger = n % count;
    (0..count)
        .map(|index| if index < larger { base + 1 } else { base })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{group_sizes, partition};
    use crate::model::participant::ParticipantId;
    use crate::policy::GroupingPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn roster(n: usize) -> BTreeSet<ParticipantId> {
        (0..n)
            .map(|index| ParticipantId::new(format!("p{index:02}")).unwrap())
            .collect()
    }

    fn sorted_sizes(n: usize) -> Vec<usize> {
        let mut sizes = group_sizes(n, &GroupingPolicy::default());
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }

    #[test]
    fn sizes_for_small_rosters() {
        assert_eq!(sorted_sizes(1), vec![1]);
        assert_eq!(sorted_sizes(2), vec![2]);
        assert_eq!(sorted_sizes(3), vec![3]);
        assert_eq!(sorted_sizes(4), vec![4]);
        assert_eq!(sorted_sizes(5), vec![5]);
        assert_eq!(sorted_sizes(6), vec![3, 3]);
        assert_eq!(sorted_sizes(7), vec![4, 3]);
        assert_eq!(sorted_sizes(9), vec![5, 4]);
        assert_eq!(sorted_sizes(10), vec![5, 5]);
        assert_eq!(sorted_sizes(11), vec![4, 4, 3]);
        assert_eq!(sorted_sizes(14), vec![5, 5, 4]);
    }

    #[test]
    fn multiples_of_four_give_quartets() {
        for n in (4..=40).step_by(4) {
            let sizes = group_sizes(n, &GroupingPolicy::default());
            assert_eq!(sizes.len(), n / 4, "n={n}");
            assert!(sizes.iter().all(|&size| size == 4), "n={n}: {sizes:?}");
        }
    }

    #[test]
    fn sizes_stay_in_bounds_from_three_up() {
        for n in 3..=40 {
            let sizes = group_sizes(n, &GroupingPolicy::default());
            assert_eq!(sizes.iter().sum::<usize>(), n, "n={n}");
            assert!(
                sizes.iter().all(|size| (3..=5).contains(size)),
                "n={n}: {sizes:?}"
            );
        }
    }

    #[test]
    fn larger_groups_come_first_in_exact_fit() {
        assert_eq!(group_sizes(13, &GroupingPolicy::default()), vec![5, 4, 4]);
    }

    #[test]
    fn partition_is_exact_for_every_roster_size() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 0..=40 {
            let present = roster(n);
            let groups = partition(&present, &GroupingPolicy::default(), &mut rng);

            let flattened: Vec<&ParticipantId> = groups.iter().flatten().collect();
            assert_eq!(flattened.len(), n, "n={n}");
            let unique: BTreeSet<&ParticipantId> = flattened.into_iter().collect();
            assert_eq!(unique.len(), n, "n={n}");
            assert!(unique.into_iter().eq(present.iter()), "n={n}");
        }
    }

    #[test]
    fn empty_roster_yields_no_groups() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(partition(&BTreeSet::new(), &GroupingPolicy::default(), &mut rng).is_empty());
    }

    #[test]
    fn same_seed_reproduces_membership() {
        let present = roster(13);
        let first = partition(
            &present,
            &GroupingPolicy::default(),
            &mut StdRng::seed_from_u64(42),
        );
        let second = partition(
            &present,
            &GroupingPolicy::default(),
            &mut StdRng::seed_from_u64(42),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn shuffle_rotates_membership_across_seeds() {
        let present = roster(16);
        let policy = GroupingPolicy::default();
        let baseline = partition(&present, &policy, &mut StdRng::seed_from_u64(0));
        let rotated = (1..20u64)
            .any(|seed| partition(&present, &policy, &mut StdRng::seed_from_u64(seed)) != baseline);
        assert!(rotated);
    }

    #[test]
    fn custom_policy_respects_preferred_size() {
        let policy = GroupingPolicy {
            preferred_group_size: 3,
            min_group_size: 2,
            max_group_size: 4,
            max_group_count: 10,
            fallback_track_count: 3,
        };
        assert_eq!(group_sizes(9, &policy), vec![3, 3, 3]);
        assert_eq!(group_sizes(10, &policy), vec![4, 3, 3]);
    }

    #[test]
    fn custom_policies_keep_sizes_in_bounds_when_a_split_exists() {
        let policies = [
            (5, 3, 5),
            (3, 2, 4),
            (4, 2, 6),
            (5, 4, 6),
            (3, 3, 3),
        ];
        for (preferred, min, max) in policies {
            let policy = GroupingPolicy {
                preferred_group_size: preferred,
                min_group_size: min,
                max_group_size: max,
                max_group_count: 6,
                fallback_track_count: 4,
            };
            for n in min..=40 {
                let sizes = group_sizes(n, &policy);
                assert_eq!(sizes.iter().sum::<usize>(), n, "{policy:?} n={n}");
                if n.div_ceil(max) <= n / min {
                    assert!(
                        sizes.iter().all(|size| (min..=max).contains(size)),
                        "{policy:?} n={n}: {sizes:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn unspreadable_tail_rebalances_groups() {
        let policy = GroupingPolicy {
            preferred_group_size: 5,
            min_group_size: 3,
            max_group_size: 5,
            max_group_count: 6,
            fallback_track_count: 4,
        };
        assert_eq!(group_sizes(7, &policy), vec![4, 3]);
        assert_eq!(group_sizes(11, &policy), vec![4, 4, 3]);
        assert_eq!(group_sizes(16, &policy), vec![4, 4, 4, 4]);
        assert_eq!(group_sizes(27, &policy), vec![5, 5, 5, 4, 4, 4]);
    }
}
