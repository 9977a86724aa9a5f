//! Track assignment on top of a base group partition.
//!
//! # Responsibility
//! - Normalize the week's registered tracks to the policy's fixed length.
//! - Give every grouped participant exactly one track.
//!
//! # Invariants
//! - A group whose size equals the track count receives a bijection.
//! - Any other group never holds more than `ceil(size / tracks)` members on
//!   one track.
//! - Assignment is pure over its inputs and the supplied rng.

use crate::model::track::{placeholder_tracks, Track, TrackId};
use crate::model::week::{BaseGroup, TrackAssignment};
use crate::policy::GroupingPolicy;
use rand::seq::SliceRandom;
use rand::Rng;

/// Where a normalized track list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    /// Titled tracks from the week's registry.
    Registered,
    /// The fixed placeholder set.
    Placeholder,
}

/// Non-empty, fixed-length track list accepted by [`assign_tracks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTracks {
    ids: Vec<TrackId>,
    source: TrackSource,
}

impl NormalizedTracks {
    pub fn as_slice(&self) -> &[TrackId] {
        &self.ids
    }

    pub fn source(&self) -> TrackSource {
        self.source
    }

    pub fn into_vec(self) -> Vec<TrackId> {
        self.ids
    }
}

/// Keeps the first `fallback_track_count` titled tracks, or substitutes the
/// placeholder set when too few are titled.
pub fn normalize_tracks(registered: &[Track], policy: &GroupingPolicy) -> NormalizedTracks {
    let count = policy.fallback_track_count.max(1);
    let valid: Vec<TrackId> = registered
        .iter()
        .filter(|track| track.is_valid())
        .map(|track| track.id.clone())
        .collect();

    if valid.len() >= count {
        NormalizedTracks {
            ids: valid.into_iter().take(count).collect(),
            source: TrackSource::Registered,
        }
    } else {
        NormalizedTracks {
            ids: placeholder_tracks(count),
            source: TrackSource::Placeholder,
        }
    }
}

/// Assigns one track to every member of every group.
///
/// Tracks are shared freely across groups; only in-group repeats are limited.
pub fn assign_tracks<R: Rng + ?Sized>(
    groups: &[BaseGroup],
    tracks: &NormalizedTracks,
    rng: &mut R,
) -> TrackAssignment {
    let mut assignment = TrackAssignment::new();
    for group in groups {
        assign_group(group, tracks.as_slice(), rng, &mut assignment);
    }
    assignment
}

fn assign_group<R: Rng + ?Sized>(
    group: &BaseGroup,
    tracks: &[TrackId],
    rng: &mut R,
    assignment: &mut TrackAssignment,
) {
    if tracks.is_empty() {
        return;
    }

    if group.len() == tracks.len() {
        // Group order is already shuffled, so slot order stays fixed.
        for (member, track) in group.iter().zip(tracks) {
            assignment.insert(member.clone(), track.clone());
        }
        return;
    }

    let cap = group.len().div_ceil(tracks.len());
    let mut used = vec![0usize; tracks.len()];
    for member in group {
        let open: Vec<usize> = (0..tracks.len()).filter(|&i| used[i] < cap).collect();
        // cap * tracks >= group size, so `open` is never empty here.
        let index = open.choose(rng).copied().unwrap_or(0);
        used[index] += 1;
        assignment.insert(member.clone(), tracks[index].clone());
    }
}

#[cfg(test)]
mod tests {
    use super::{assign_tracks, normalize_tracks, TrackSource};
    use crate::model::participant::ParticipantId;
    use crate::model::track::{Track, TrackId};
    use crate::model::week::BaseGroup;
    use crate::policy::GroupingPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn group(ids: &[&str]) -> BaseGroup {
        ids.iter().map(|id| ParticipantId::new(id).unwrap()).collect()
    }

    fn titled(ids: &[&str]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track::new(TrackId::new(id).unwrap(), format!("title {id}")))
            .collect()
    }

    fn per_track_counts(
        group: &BaseGroup,
        assignment: &BTreeMap<ParticipantId, TrackId>,
    ) -> Vec<usize> {
        let mut counts: BTreeMap<&TrackId, usize> = BTreeMap::new();
        for member in group {
            *counts.entry(&assignment[member]).or_default() += 1;
        }
        counts.into_values().collect()
    }

    #[test]
    fn normalize_uses_registered_when_enough_titled() {
        let registered = titled(&["T1", "T2", "T3", "T4"]);
        let tracks = normalize_tracks(&registered, &GroupingPolicy::default());
        assert_eq!(tracks.source(), TrackSource::Registered);
        let ids: Vec<&str> = tracks.as_slice().iter().map(TrackId::as_str).collect();
        assert_eq!(ids, vec!["T1", "T2", "T3", "T4"]);
    }

    #[test]
    fn normalize_falls_back_when_titles_missing() {
        let mut registered = titled(&["T1", "T2", "T3", "T4"]);
        registered[2].title = "   ".to_string();
        let tracks = normalize_tracks(&registered, &GroupingPolicy::default());
        assert_eq!(tracks.source(), TrackSource::Placeholder);
        let ids: Vec<&str> = tracks.as_slice().iter().map(TrackId::as_str).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn quartet_gets_slot_order_bijection() {
        let registered = titled(&["T1", "T2", "T3", "T4"]);
        let tracks = normalize_tracks(&registered, &GroupingPolicy::default());
        let groups = vec![group(&["a", "b", "c", "d"]), group(&["e", "f", "g", "h"])];
        let assignment = assign_tracks(&groups, &tracks, &mut StdRng::seed_from_u64(3));

        let labels: Vec<(String, String)> = assignment
            .iter()
            .map(|(member, track)| (member.to_string(), track.to_string()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("a".into(), "T1".into()),
                ("b".into(), "T2".into()),
                ("c".into(), "T3".into()),
                ("d".into(), "T4".into()),
                ("e".into(), "T1".into()),
                ("f".into(), "T2".into()),
                ("g".into(), "T3".into()),
                ("h".into(), "T4".into()),
            ]
        );
    }

    #[test]
    fn mismatched_groups_respect_per_track_cap() {
        let tracks = normalize_tracks(&[], &GroupingPolicy::default());
        let trio = group(&["a", "b", "c"]);
        let quintet = group(&["d", "e", "f", "g", "h"]);
        for seed in 0..50 {
            let groups = vec![trio.clone(), quintet.clone()];
            let assignment = assign_tracks(&groups, &tracks, &mut StdRng::seed_from_u64(seed));
            assert_eq!(assignment.len(), 8);
            assert!(per_track_counts(&trio, &assignment).iter().all(|&n| n == 1));
            let quintet_counts = per_track_counts(&quintet, &assignment);
            assert!(quintet_counts.iter().all(|&n| n <= 2));
            assert!(quintet_counts.len() >= 3);
        }
    }

    #[test]
    fn every_member_receives_a_listed_track() {
        let tracks = normalize_tracks(&[], &GroupingPolicy::default());
        let groups = vec![group(&["x"]), group(&["y", "z"])];
        let assignment = assign_tracks(&groups, &tracks, &mut StdRng::seed_from_u64(9));
        assert_eq!(assignment.len(), 3);
        assert!(assignment
            .values()
            .all(|track| tracks.as_slice().contains(track)));
    }
}
