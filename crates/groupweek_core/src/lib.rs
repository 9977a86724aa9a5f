//! Core logic for weekly base-group and track assignment.
//! This crate owns the grouping algorithm and its persistence contracts.

pub mod db;
pub mod grouping;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use grouping::{
    assign_tracks, find_overlaps, normalize_tracks, partition, plan_week, NormalizedTracks,
    TrackOverlap, TrackSource, WeekPlan,
};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget, LoggingError,
};
pub use model::attendance::AttendanceStatus;
pub use model::participant::{Participant, ParticipantId};
pub use model::track::{Track, TrackId};
pub use model::week::{BaseGroup, RunId, TrackAssignment, WeekNumber, WeekRecord};
pub use model::ModelValidationError;
pub use policy::{GroupingPolicy, PolicyError};
pub use repo::attendance_repo::{AttendanceStore, SqliteAttendanceStore};
pub use repo::history_repo::{HistoryStore, SqliteHistoryStore};
pub use repo::participant_repo::{ParticipantDirectory, SqliteParticipantDirectory};
pub use repo::track_repo::{SqliteTrackRegistry, TrackRegistry};
pub use repo::{RepoError, RepoResult};
pub use service::grouping_service::{GroupingService, RunOutcome};
pub use service::roster_service::{
    ActivityGroupSummary, AttendanceSummary, MemberSummary, RosterService, TrackInput,
    WeekSummary,
};
pub use service::ServiceError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
