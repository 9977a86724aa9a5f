//! Domain model for weekly grouping.
//!
//! # Responsibility
//! - Define participants, attendance, tracks and the persisted week record.
//! - Own validation of every invariant a stored record must satisfy.
//!
//! # Invariants
//! - Identifiers are trimmed, non-empty strings.
//! - A `WeekRecord` partitions its members exactly and assigns each one track.

use thiserror::Error;

pub mod attendance;
pub mod participant;
pub mod track;
pub mod week;

/// Validation failure for domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelValidationError {
    #[error("participant id cannot be empty")]
    EmptyParticipantId,
    #[error("participant name cannot be empty")]
    EmptyParticipantName,
    #[error("track id cannot be empty")]
    EmptyTrackId,
    #[error("week number must be positive")]
    ZeroWeek,
    #[error("week {week} has {count} tracks; at most {max} are allowed")]
    TooManyTracks { week: u32, count: usize, max: usize },
    #[error("track `{0}` is registered twice for the same week")]
    DuplicateTrack(String),
    #[error("base group {0} is empty")]
    EmptyGroup(usize),
    #[error("participant `{0}` appears in more than one base group")]
    DuplicateMember(String),
    #[error("participant `{0}` has no track assignment")]
    MissingAssignment(String),
    #[error("assignment for `{0}` has no matching base group member")]
    UnexpectedAssignment(String),
    #[error("track `{track}` assigned to `{participant}` is not in the week's track list")]
    UnknownTrack { participant: String, track: String },
}
