//! Repository contracts for the weekly grouping collaborators.
//!
//! # Responsibility
//! - Define the directory, attendance, track and history interfaces.
//! - Keep SQL details behind `Sqlite*` implementations.
//!
//! # Invariants
//! - Write paths validate model values before any SQL mutation.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::participant::ParticipantId;
use crate::model::week::WeekNumber;
use crate::model::ModelValidationError;
use rusqlite::Connection;
use thiserror::Error;

pub mod attendance_repo;
pub mod history_repo;
pub mod participant_repo;
pub mod track_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every store.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),
    #[error("no week record for week {0}")]
    WeekNotFound(WeekNumber),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("connection is missing required table `{0}`")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that skipped migrations.
pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

pub(crate) fn week_to_db(week: WeekNumber) -> i64 {
    i64::from(week.get())
}

pub(crate) fn parse_week(value: i64, column: &str) -> RepoResult<WeekNumber> {
    u32::try_from(value)
        .ok()
        .and_then(|raw| WeekNumber::new(raw).ok())
        .ok_or_else(|| RepoError::InvalidData(format!("invalid week `{value}` in {column}")))
}
