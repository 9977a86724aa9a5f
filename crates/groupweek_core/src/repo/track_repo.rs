//! Track registry contract and SQLite implementation.
//!
//! # Invariants
//! - `set_week_tracks` replaces the week's whole list in one transaction.
//! - Tracks are returned in slot order.

use super::{ensure_tables, week_to_db, RepoError, RepoResult};
use crate::model::track::{validate_week_tracks, Track, TrackId};
use crate::model::week::WeekNumber;
use rusqlite::{params, Connection};

/// Ordered per-week track list.
pub trait TrackRegistry {
    fn set_week_tracks(&self, week: WeekNumber, tracks: &[Track]) -> RepoResult<()>;
    fn tracks_for_week(&self, week: WeekNumber) -> RepoResult<Vec<Track>>;
}

/// SQLite-backed track registry.
pub struct SqliteTrackRegistry<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTrackRegistry<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["week_tracks"])?;
        Ok(Self { conn })
    }
}

impl TrackRegistry for SqliteTrackRegistry<'_> {
    fn set_week_tracks(&self, week: WeekNumber, tracks: &[Track]) -> RepoResult<()> {
        validate_week_tracks(week.get(), tracks)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM week_tracks WHERE week = ?1;",
            [week_to_db(week)],
        )?;
        for (slot, track) in tracks.iter().enumerate() {
            tx.execute(
                "INSERT INTO week_tracks (week, slot, track_id, title, link)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    week_to_db(week),
                    slot as i64,
                    track.id.as_str(),
                    track.title.trim(),
                    track.link.as_deref(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn tracks_for_week(&self, week: WeekNumber) -> RepoResult<Vec<Track>> {
        let mut stmt = self.conn.prepare(
            "SELECT track_id, title, link
             FROM week_tracks
             WHERE week = ?1
             ORDER BY slot ASC;",
        )?;
        let mut rows = stmt.query([week_to_db(week)])?;
        let mut tracks = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("track_id")?;
            let id = TrackId::new(&id_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid track id `{id_text}` in week_tracks.track_id"
                ))
            })?;
            tracks.push(Track {
                id,
                title: row.get("title")?,
                link: row.get("link")?,
            });
        }
        Ok(tracks)
    }
}
