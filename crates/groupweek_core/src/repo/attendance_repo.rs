//! Attendance store contract and SQLite implementation.
//!
//! # Invariants
//! - One status per (week, participant); setting again replaces it.
//! - Attendance can only be recorded for participants in the directory.

use super::{ensure_tables, week_to_db, RepoError, RepoResult};
use crate::model::attendance::AttendanceStatus;
use crate::model::participant::ParticipantId;
use crate::model::week::WeekNumber;
use rusqlite::{params, Connection};
use std::collections::{BTreeMap, BTreeSet};

/// Per-week attendance record.
pub trait AttendanceStore {
    fn set_status(
        &self,
        week: WeekNumber,
        participant: &ParticipantId,
        status: AttendanceStatus,
    ) -> RepoResult<()>;

    /// Every recorded status for `week`, keyed by participant.
    fn statuses_for_week(
        &self,
        week: WeekNumber,
    ) -> RepoResult<BTreeMap<ParticipantId, AttendanceStatus>>;

    /// Participants marked attending for `week`.
    fn present_for_week(&self, week: WeekNumber) -> RepoResult<BTreeSet<ParticipantId>> {
        Ok(self
            .statuses_for_week(week)?
            .into_iter()
            .filter(|(_, status)| status.is_present())
            .map(|(participant, _)| participant)
            .collect())
    }
}

/// SQLite-backed attendance store.
pub struct SqliteAttendanceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["participants", "attendance"])?;
        Ok(Self { conn })
    }
}

impl AttendanceStore for SqliteAttendanceStore<'_> {
    fn set_status(
        &self,
        week: WeekNumber,
        participant: &ParticipantId,
        status: AttendanceStatus,
    ) -> RepoResult<()> {
        let known: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM participants WHERE id = ?1);",
            [participant.as_str()],
            |row| row.get(0),
        )?;
        if known != 1 {
            return Err(RepoError::ParticipantNotFound(participant.clone()));
        }

        self.conn.execute(
            "INSERT INTO attendance (week, participant_id, status)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(week, participant_id) DO UPDATE SET
                status = excluded.status,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![week_to_db(week), participant.as_str(), status.as_code()],
        )?;
        Ok(())
    }

    fn statuses_for_week(
        &self,
        week: WeekNumber,
    ) -> RepoResult<BTreeMap<ParticipantId, AttendanceStatus>> {
        let mut stmt = self.conn.prepare(
            "SELECT participant_id, status
             FROM attendance
             WHERE week = ?1
             ORDER BY participant_id ASC;",
        )?;
        let mut rows = stmt.query([week_to_db(week)])?;
        let mut statuses = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("participant_id")?;
            let participant = ParticipantId::new(&id_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid participant id `{id_text}` in attendance.participant_id"
                ))
            })?;
            let status_text: String = row.get("status")?;
            let status = AttendanceStatus::from_code(&status_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid attendance status `{status_text}` in attendance.status"
                ))
            })?;
            statuses.insert(participant, status);
        }
        Ok(statuses)
    }
}
