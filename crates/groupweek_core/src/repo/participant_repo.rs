//! Participant directory contract and SQLite implementation.
//!
//! # Invariants
//! - Ids are unique; adding an existing id replaces its display name.
//! - Removing a participant cascades to their attendance rows but leaves
//!   stored week records untouched.

use super::{ensure_tables, RepoError, RepoResult};
use crate::model::participant::{Participant, ParticipantId};
use rusqlite::{params, Connection, Row};

/// Id to display-name directory.
pub trait ParticipantDirectory {
    /// Inserts a participant or renames an existing one.
    fn upsert_participant(&self, participant: &Participant) -> RepoResult<()>;
    fn remove_participant(&self, id: &ParticipantId) -> RepoResult<()>;
    fn get_participant(&self, id: &ParticipantId) -> RepoResult<Option<Participant>>;
    /// All participants ordered by id.
    fn list_participants(&self) -> RepoResult<Vec<Participant>>;
}

/// SQLite-backed participant directory.
pub struct SqliteParticipantDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipantDirectory<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["participants"])?;
        Ok(Self { conn })
    }
}

impl ParticipantDirectory for SqliteParticipantDirectory<'_> {
    fn upsert_participant(&self, participant: &Participant) -> RepoResult<()> {
        participant.validate()?;

        self.conn.execute(
            "INSERT INTO participants (id, name)
             VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![participant.id.as_str(), participant.name.trim()],
        )?;
        Ok(())
    }

    fn remove_participant(&self, id: &ParticipantId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM participants WHERE id = ?1;", [id.as_str()])?;
        if changed == 0 {
            return Err(RepoError::ParticipantNotFound(id.clone()));
        }
        Ok(())
    }

    fn get_participant(&self, id: &ParticipantId) -> RepoResult<Option<Participant>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM participants WHERE id = ?1;")?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_participant_row(row)?));
        }
        Ok(None)
    }

    fn list_participants(&self) -> RepoResult<Vec<Participant>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM participants ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut participants = Vec::new();
        while let Some(row) = rows.next()? {
            participants.push(parse_participant_row(row)?);
        }
        Ok(participants)
    }
}

fn parse_participant_row(row: &Row<'_>) -> RepoResult<Participant> {
    let id_text: String = row.get("id")?;
    let id = ParticipantId::new(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid participant id `{id_text}` in participants.id"))
    })?;
    let participant = Participant::new(id, row.get::<_, String>("name")?);
    participant.validate()?;
    Ok(participant)
}
