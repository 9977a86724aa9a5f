//! Roster use-case service: participants, attendance, tracks, summaries.
//!
//! # Responsibility
//! - Provide the record-keeping entry points around a weekly run.
//! - Resolve stored ids to display names for callers that show a week.
//!
//! # Invariants
//! - Track ids are assigned by slot (`A`, `B`, ...) when registering titles.
//! - Summaries never fail on participants removed after a run; the raw id
//!   stands in for the missing name.

use super::ServiceError;
use crate::model::attendance::AttendanceStatus;
use crate::model::participant::{Participant, ParticipantId};
use crate::model::track::{Track, TrackId};
use crate::model::week::{WeekNumber, WeekRecord};
use crate::repo::attendance_repo::AttendanceStore;
use crate::repo::participant_repo::ParticipantDirectory;
use crate::repo::track_repo::TrackRegistry;
use log::info;
use std::collections::BTreeMap;

/// Title and optional link for one track slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInput {
    pub title: String,
    pub link: Option<String>,
}

/// Attendance split for one week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub attending: Vec<ParticipantId>,
    pub absent_before: Vec<ParticipantId>,
    pub absent_day_of: Vec<ParticipantId>,
    /// Directory entries with no status recorded for the week.
    pub unrecorded: Vec<ParticipantId>,
}

/// One grouped participant with display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    pub id: ParticipantId,
    pub name: String,
    pub track: Option<TrackId>,
}

/// Participants drawn onto one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityGroupSummary {
    pub track: TrackId,
    /// Registered title, if the track is not a placeholder.
    pub title: Option<String>,
    pub members: Vec<MemberSummary>,
}

/// Name-resolved view of a stored week record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSummary {
    pub week: WeekNumber,
    pub base_groups: Vec<Vec<MemberSummary>>,
    pub activity_groups: Vec<ActivityGroupSummary>,
}

/// Record-keeping facade over directory, attendance and track stores.
pub struct RosterService<D, A, T>
where
    D: ParticipantDirectory,
    A: AttendanceStore,
    T: TrackRegistry,
{
    directory: D,
    attendance: A,
    tracks: T,
}

impl<D, A, T> RosterService<D, A, T>
where
    D: ParticipantDirectory,
    A: AttendanceStore,
    T: TrackRegistry,
{
    pub fn new(directory: D, attendance: A, tracks: T) -> Self {
        Self {
            directory,
            attendance,
            tracks,
        }
    }

    /// Adds a participant, or renames one that already exists.
    pub fn add_participant(&self, id: &str, name: &str) -> Result<Participant, ServiceError> {
        let participant = Participant::new(ParticipantId::new(id)?, name.trim());
        self.directory.upsert_participant(&participant)?;
        info!("event=participant_upsert module=service status=ok");
        Ok(participant)
    }

    pub fn remove_participant(&self, id: &ParticipantId) -> Result<(), ServiceError> {
        self.directory.remove_participant(id)?;
        info!("event=participant_remove module=service status=ok");
        Ok(())
    }

    pub fn list_participants(&self) -> Result<Vec<Participant>, ServiceError> {
        Ok(self.directory.list_participants()?)
    }

    pub fn mark_attendance(
        &self,
        week: WeekNumber,
        id: &ParticipantId,
        status: AttendanceStatus,
    ) -> Result<(), ServiceError> {
        self.attendance.set_status(week, id, status)?;
        Ok(())
    }

    /// Splits the directory by the week's recorded statuses.
    pub fn attendance_summary(&self, week: WeekNumber) -> Result<AttendanceSummary, ServiceError> {
        let statuses = self.attendance.statuses_for_week(week)?;
        let mut summary = AttendanceSummary::default();
        for participant in self.directory.list_participants()? {
            match statuses.get(&participant.id) {
                Some(AttendanceStatus::Attending) => summary.attending.push(participant.id),
                Some(AttendanceStatus::AbsentBefore) => summary.absent_before.push(participant.id),
                Some(AttendanceStatus::AbsentDayOf) => summary.absent_day_of.push(participant.id),
                None => summary.unrecorded.push(participant.id),
            }
        }
        Ok(summary)
    }

    /// Replaces the week's tracks; slot `i` gets id `TrackId::for_slot(i)`.
    pub fn register_tracks(
        &self,
        week: WeekNumber,
        inputs: &[TrackInput],
    ) -> Result<Vec<Track>, ServiceError> {
        let tracks: Vec<Track> = inputs
            .iter()
            .enumerate()
            .map(|(slot, input)| Track {
                id: TrackId::for_slot(slot),
                title: input.title.trim().to_string(),
                link: input
                    .link
                    .as_deref()
                    .map(str::trim)
                    .filter(|link| !link.is_empty())
                    .map(str::to_string),
            })
            .collect();
        self.tracks.set_week_tracks(week, &tracks)?;
        info!(
            "event=tracks_register module=service status=ok week={week} tracks={} titled={}",
            tracks.len(),
            tracks.iter().filter(|track| track.is_valid()).count()
        );
        Ok(tracks)
    }

    pub fn week_tracks(&self, week: WeekNumber) -> Result<Vec<Track>, ServiceError> {
        Ok(self.tracks.tracks_for_week(week)?)
    }

    /// Resolves a stored record's ids to names and track titles.
    pub fn describe_week(&self, record: &WeekRecord) -> Result<WeekSummary, ServiceError> {
        let names: BTreeMap<ParticipantId, String> = self
            .directory
            .list_participants()?
            .into_iter()
            .map(|participant| (participant.id, participant.name))
            .collect();
        let titles: BTreeMap<TrackId, String> = self
            .tracks
            .tracks_for_week(record.week)?
            .into_iter()
            .filter(|track| track.is_valid())
            .map(|track| (track.id, track.title))
            .collect();

        let member = |id: &ParticipantId| MemberSummary {
            id: id.clone(),
            name: names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            track: record.assignment.get(id).cloned(),
        };

        let base_groups: Vec<Vec<MemberSummary>> = record
            .base_groups
            .iter()
            .map(|group| group.iter().map(&member).collect())
            .collect();
        let activity_groups: Vec<ActivityGroupSummary> = record
            .activity_groups()
            .into_iter()
            .map(|(track, members)| ActivityGroupSummary {
                title: titles.get(&track).cloned(),
                members: members.iter().map(&member).collect(),
                track,
            })
            .collect();

        Ok(WeekSummary {
            week: record.week,
            base_groups,
            activity_groups,
        })
    }
}
