//! Read-only in-group overlap diagnostics.

use crate::model::participant::ParticipantId;
use crate::model::track::TrackId;
use crate::model::week::{BaseGroup, TrackAssignment};
use std::collections::BTreeMap;

/// Two or more members of one base group sharing a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOverlap {
    /// Zero-based index into the base group list.
    pub group_index: usize,
    pub track: TrackId,
    pub members: Vec<ParticipantId>,
}

/// Lists every in-group track repeat, ordered by group then track.
pub fn find_overlaps(groups: &[BaseGroup], assignment: &TrackAssignment) -> Vec<TrackOverlap> {
    let mut overlaps = Vec::new();
    for (group_index, group) in groups.iter().enumerate() {
        let mut by_track: BTreeMap<&TrackId, Vec<ParticipantId>> = BTreeMap::new();
        for member in group {
            if let Some(track) = assignment.get(member) {
                by_track.entry(track).or_default().push(member.clone());
            }
        }
        overlaps.extend(
            by_track
                .into_iter()
                .filter(|(_, members)| members.len() > 1)
                .map(|(track, members)| TrackOverlap {
                    group_index,
                    track: track.clone(),
                    members,
                }),
        );
    }
    overlaps
}
