//! Weekly history store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist one `WeekRecord` per week and replace it on every commit.
//!
//! # Invariants
//! - A week has at most one stored record; commit is a single keyed upsert,
//!   so a reader sees either the previous record or the new one.
//! - Records are validated on write and again on read.

use super::{ensure_tables, parse_week, week_to_db, RepoError, RepoResult};
use crate::model::track::TrackId;
use crate::model::week::{BaseGroup, TrackAssignment, WeekNumber, WeekRecord};
use log::info;
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    week,
    run_id,
    tracks_json,
    base_groups_json,
    assignment_json
FROM week_records";

/// Durable last-run-wins history.
pub trait HistoryStore {
    /// Makes `record` the sole stored record for its week.
    fn commit(&self, record: &WeekRecord) -> RepoResult<()>;
    fn get_week(&self, week: WeekNumber) -> RepoResult<Option<WeekRecord>>;
    /// Weeks with a stored record, newest week first.
    fn list_weeks(&self) -> RepoResult<Vec<WeekNumber>>;
    fn delete_week(&self, week: WeekNumber) -> RepoResult<()>;
}

/// SQLite-backed history store.
pub struct SqliteHistoryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHistoryStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["week_records"])?;
        Ok(Self { conn })
    }
}

impl HistoryStore for SqliteHistoryStore<'_> {
    fn commit(&self, record: &WeekRecord) -> RepoResult<()> {
        record.validate()?;

        let replaced = self.conn.execute(
            "INSERT INTO week_records (
                week,
                run_id,
                tracks_json,
                base_groups_json,
                assignment_json
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(week) DO UPDATE SET
                run_id = excluded.run_id,
                tracks_json = excluded.tracks_json,
                base_groups_json = excluded.base_groups_json,
                assignment_json = excluded.assignment_json,
                committed_at = (strftime('%s', 'now') * 1000);",
            params![
                week_to_db(record.week),
                record.run_id.to_string(),
                to_json(&record.tracks, "tracks")?,
                to_json(&record.base_groups, "base_groups")?,
                to_json(&record.assignment, "assignment")?,
            ],
        )?;

        info!(
            "event=history_commit module=repo status=ok week={} run_id={} groups={} participants={} rows={}",
            record.week,
            record.run_id,
            record.base_groups.len(),
            record.participant_count(),
            replaced
        );
        Ok(())
    }

    fn get_week(&self, week: WeekNumber) -> RepoResult<Option<WeekRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE week = ?1;"))?;
        let mut rows = stmt.query([week_to_db(week)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn list_weeks(&self) -> RepoResult<Vec<WeekNumber>> {
        let mut stmt = self
            .conn
            .prepare("SELECT week FROM week_records ORDER BY week DESC;")?;
        let mut rows = stmt.query([])?;
        let mut weeks = Vec::new();
        while let Some(row) = rows.next()? {
            weeks.push(parse_week(row.get("week")?, "week_records.week")?);
        }
        Ok(weeks)
    }

    fn delete_week(&self, week: WeekNumber) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM week_records WHERE week = ?1;",
            [week_to_db(week)],
        )?;
        if changed == 0 {
            return Err(RepoError::WeekNotFound(week));
        }
        Ok(())
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<WeekRecord> {
    let week = parse_week(row.get("week")?, "week_records.week")?;

    let run_id_text: String = row.get("run_id")?;
    let run_id = Uuid::parse_str(&run_id_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid run id `{run_id_text}` in week_records.run_id"
        ))
    })?;

    let tracks: Vec<TrackId> = from_json(row.get("tracks_json")?, "tracks_json")?;
    let base_groups: Vec<BaseGroup> = from_json(row.get("base_groups_json")?, "base_groups_json")?;
    let assignment: TrackAssignment = from_json(row.get("assignment_json")?, "assignment_json")?;

    let record = WeekRecord {
        week,
        run_id,
        tracks,
        base_groups,
        assignment,
    };
    record.validate()?;
    Ok(record)
}

fn to_json<T: Serialize>(value: &T, field: &str) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode {field}: {err}")))
}

fn from_json<T: DeserializeOwned>(raw: String, column: &str) -> RepoResult<T> {
    serde_json::from_str(&raw).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in week_records.{column}: {err}"))
    })
}
