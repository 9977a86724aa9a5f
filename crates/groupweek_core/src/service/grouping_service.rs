//! Weekly grouping use-case.
//!
//! # Responsibility
//! - Read a week's attendance and tracks, plan the grouping, commit it.
//! - Surface the empty-roster, placeholder-track and overlap conditions as
//!   log events and outcome data, never as failures.
//!
//! # Invariants
//! - A run either commits one full `WeekRecord` or leaves history untouched.
//! - Re-running a week is the same operation as running it.

use super::ServiceError;
use crate::grouping::{plan_week, TrackSource, TrackOverlap, WeekPlan};
use crate::model::week::{WeekNumber, WeekRecord};
use crate::policy::GroupingPolicy;
use crate::repo::attendance_repo::AttendanceStore;
use crate::repo::history_repo::HistoryStore;
use crate::repo::track_repo::TrackRegistry;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Result of a committed or skipped run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nobody attending; history was not touched.
    NothingToAssign { week: WeekNumber },
    /// A new record replaced whatever the week held before.
    Committed {
        record: WeekRecord,
        track_source: TrackSource,
        overlaps: Vec<TrackOverlap>,
    },
}

/// Orchestrates attendance, tracks and history around the algorithm.
pub struct GroupingService<A, T, H>
where
    A: AttendanceStore,
    T: TrackRegistry,
    H: HistoryStore,
{
    attendance: A,
    tracks: T,
    history: H,
    policy: GroupingPolicy,
}

impl<A, T, H> GroupingService<A, T, H>
where
    A: AttendanceStore,
    T: TrackRegistry,
    H: HistoryStore,
{
    /// Creates a service after validating `policy`.
    pub fn new(
        attendance: A,
        tracks: T,
        history: H,
        policy: GroupingPolicy,
    ) -> Result<Self, ServiceError> {
        policy.validate()?;
        Ok(Self {
            attendance,
            tracks,
            history,
            policy,
        })
    }

    pub fn policy(&self) -> &GroupingPolicy {
        &self.policy
    }

    /// Computes a week's grouping without committing it.
    pub fn plan_week<R: Rng + ?Sized>(
        &self,
        week: WeekNumber,
        rng: &mut R,
    ) -> Result<Option<WeekPlan>, ServiceError> {
        let present = self.attendance.present_for_week(week)?;
        let registered = self.tracks.tracks_for_week(week)?;
        Ok(plan_week(week, &present, &registered, &self.policy, rng))
    }

    /// Plans and commits a week, replacing any earlier record for it.
    pub fn run_week<R: Rng + ?Sized>(
        &self,
        week: WeekNumber,
        rng: &mut R,
    ) -> Result<RunOutcome, ServiceError> {
        let started_at = Instant::now();
        info!("event=run_week module=service status=start week={week}");

        let Some(plan) = self.plan_week(week, rng)? else {
            warn!(
                "event=run_week module=service status=skipped week={week} reason=nothing_to_assign"
            );
            return Ok(RunOutcome::NothingToAssign { week });
        };

        if plan.track_source == TrackSource::Placeholder {
            info!(
                "event=track_fallback module=service status=ok week={week} tracks={}",
                plan.record.tracks.len()
            );
        }
        for overlap in &plan.overlaps {
            warn!(
                "event=track_overlap module=service status=warn week={week} run_id={} group={} track={} members={}",
                plan.record.run_id,
                overlap.group_index + 1,
                overlap.track,
                overlap.members.len()
            );
        }

        self.history.commit(&plan.record)?;

        info!(
            "event=run_week module=service status=ok week={week} run_id={} groups={} participants={} overlaps={} duration_ms={}",
            plan.record.run_id,
            plan.record.base_groups.len(),
            plan.record.participant_count(),
            plan.overlaps.len(),
            started_at.elapsed().as_millis()
        );

        Ok(RunOutcome::Committed {
            record: plan.record,
            track_source: plan.track_source,
            overlaps: plan.overlaps,
        })
    }

    /// Runs a week with a freshly seeded rng; every call rotates groups.
    pub fn run_week_from_entropy(&self, week: WeekNumber) -> Result<RunOutcome, ServiceError> {
        let mut rng = StdRng::from_entropy();
        self.run_week(week, &mut rng)
    }

    /// Reads the stored record for `week`.
    pub fn week_record(&self, week: WeekNumber) -> Result<Option<WeekRecord>, ServiceError> {
        Ok(self.history.get_week(week)?)
    }

    /// Weeks with stored history, newest first.
    pub fn history_weeks(&self) -> Result<Vec<WeekNumber>, ServiceError> {
        Ok(self.history.list_weeks()?)
    }
}
