//! Week record: one run's partition plus track assignment.
//!
//! # Responsibility
//! - Define the unit of persistence and overwrite for weekly history.
//! - Validate the partition and assignment invariants of a record.
//!
//! # Invariants
//! - Base groups are pairwise disjoint and non-empty.
//! - The assignment is total over, and only over, base group members.
//! - Every assigned track belongs to the record's track list.

use super::participant::ParticipantId;
use super::track::TrackId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Ordered members of one base group.
pub type BaseGroup = Vec<ParticipantId>;

/// Total mapping from present participant to track.
pub type TrackAssignment = BTreeMap<ParticipantId, TrackId>;

/// Identifies one algorithm run, for log correlation.
pub type RunId = Uuid;

/// Positive week index within the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekNumber(u32);

impl WeekNumber {
    pub fn new(value: u32) -> Result<Self, ModelValidationError> {
        if value == 0 {
            return Err(ModelValidationError::ZeroWeek);
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Display for WeekNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted snapshot of one week's grouping.
///
/// Created or replaced only by a complete run; never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRecord {
    pub week: WeekNumber,
    pub run_id: RunId,
    /// Normalized track list the assignment was drawn from.
    pub tracks: Vec<TrackId>,
    pub base_groups: Vec<BaseGroup>,
    pub assignment: TrackAssignment,
}

impl WeekRecord {
    /// Creates a record with a fresh run id.
    pub fn new(
        week: WeekNumber,
        tracks: Vec<TrackId>,
        base_groups: Vec<BaseGroup>,
        assignment: TrackAssignment,
    ) -> Self {
        Self {
            week,
            run_id: Uuid::new_v4(),
            tracks,
            base_groups,
            assignment,
        }
    }

    /// Checks partition and assignment invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        let mut members = BTreeSet::new();
        for (index, group) in self.base_groups.iter().enumerate() {
            if group.is_empty() {
                return Err(ModelValidationError::EmptyGroup(index));
            }
            for member in group {
                if !members.insert(member) {
                    return Err(ModelValidationError::DuplicateMember(member.to_string()));
                }
                if !self.assignment.contains_key(member) {
                    return Err(ModelValidationError::MissingAssignment(member.to_string()));
                }
            }
        }

        for (participant, track) in &self.assignment {
            if !members.contains(participant) {
                return Err(ModelValidationError::UnexpectedAssignment(
                    participant.to_string(),
                ));
            }
            if !self.tracks.contains(track) {
                return Err(ModelValidationError::UnknownTrack {
                    participant: participant.to_string(),
                    track: track.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Number of grouped participants.
    pub fn participant_count(&self) -> usize {
        self.base_groups.iter().map(Vec::len).sum()
    }

    /// Track-major view: members of each track, in track order.
    ///
    /// Members are listed in base group order. Tracks nobody drew are kept
    /// with an empty member list.
    pub fn activity_groups(&self) -> Vec<(TrackId, Vec<ParticipantId>)> {
        let mut by_track: Vec<(TrackId, Vec<ParticipantId>)> = self
            .tracks
            .iter()
            .map(|track| (track.clone(), Vec::new()))
            .collect();
        for member in self.base_groups.iter().flatten() {
            let Some(track) = self.assignment.get(member) else {
                continue;
            };
            if let Some((_, members)) = by_track.iter_mut().find(|(id, _)| id == track) {
                members.push(member.clone());
            }
        }
        by_track
    }
}
