//! Weekly grouping algorithm.
//!
//! # Responsibility
//! - Partition present participants into base groups.
//! - Assign tracks on top of the partition and diagnose in-group repeats.
//!
//! # Invariants
//! - Functions here are pure apart from the injected rng and log output.
//! - Nothing in this module touches storage.

pub mod assign;
pub mod overlap;
pub mod partition;

pub use assign::{assign_tracks, normalize_tracks, NormalizedTracks, TrackSource};
pub use overlap::{find_overlaps, TrackOverlap};
pub use partition::{group_sizes, partition};

use crate::model::participant::ParticipantId;
use crate::model::track::Track;
use crate::model::week::{WeekNumber, WeekRecord};
use crate::policy::GroupingPolicy;
use rand::Rng;
use std::collections::BTreeSet;

/// Uncommitted result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekPlan {
    pub record: WeekRecord,
    pub track_source: TrackSource,
    /// In-group repeats, for warnings only.
    pub overlaps: Vec<TrackOverlap>,
}

/// Runs partition then assignment for one week.
///
/// Returns `None` when nobody is present; there is nothing to assign.
pub fn plan_week<R: Rng + ?Sized>(
    week: WeekNumber,
    present: &BTreeSet<ParticipantId>,
    registered: &[Track],
    policy: &GroupingPolicy,
    rng: &mut R,
) -> Option<WeekPlan> {
    if present.is_empty() {
        return None;
    }

    let tracks = normalize_tracks(registered, policy);
    let base_groups = partition(present, policy, rng);
    let assignment = assign_tracks(&base_groups, &tracks, rng);
    let overlaps = find_overlaps(&base_groups, &assignment);
    let track_source = tracks.source();

    Some(WeekPlan {
        record: WeekRecord::new(week, tracks.into_vec(), base_groups, assignment),
        track_source,
        overlaps,
    })
}

#[cfg(test)]
mod tests {
    use super::{plan_week, TrackSource};
    use crate::model::participant::ParticipantId;
    use crate::model::track::{Track, TrackId};
    use crate::model::week::WeekNumber;
    use crate::policy::GroupingPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn roster(ids: &[&str]) -> BTreeSet<ParticipantId> {
        ids.iter().map(|id| ParticipantId::new(id).unwrap()).collect()
    }

    fn tracks() -> Vec<Track> {
        ["T1", "T2", "T3", "T4"]
            .iter()
            .map(|id| Track::new(TrackId::new(id).unwrap(), format!("article {id}")))
            .collect()
    }

    #[test]
    fn eight_present_yields_two_overlap_free_quartets() {
        let present = roster(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let plan = plan_week(
            WeekNumber::new(1).unwrap(),
            &present,
            &tracks(),
            &GroupingPolicy::default(),
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();

        assert_eq!(plan.track_source, TrackSource::Registered);
        assert_eq!(plan.record.base_groups.len(), 2);
        assert!(plan.record.base_groups.iter().all(|group| group.len() == 4));
        assert!(plan.overlaps.is_empty());
        for group in &plan.record.base_groups {
            let distinct: BTreeSet<&TrackId> =
                group.iter().map(|member| &plan.record.assignment[member]).collect();
            assert_eq!(distinct.len(), 4);
        }
        plan.record.validate().unwrap();
    }

    #[test]
    fn seven_present_splits_into_four_and_three() {
        let present = roster(&["a", "b", "c", "d", "e", "f", "g"]);
        for seed in 0..20 {
            let plan = plan_week(
                WeekNumber::new(2).unwrap(),
                &present,
                &tracks(),
                &GroupingPolicy::default(),
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
            let sizes: Vec<usize> = plan.record.base_groups.iter().map(Vec::len).collect();
            assert_eq!(sizes, vec![4, 3]);
            // A trio under the per-track cap cannot repeat a track.
            assert!(plan.overlaps.is_empty());
        }
    }

    #[test]
    fn nobody_present_plans_nothing() {
        let plan = plan_week(
            WeekNumber::new(3).unwrap(),
            &BTreeSet::new(),
            &tracks(),
            &GroupingPolicy::default(),
            &mut StdRng::seed_from_u64(0),
        );
        assert!(plan.is_none());
    }
}
