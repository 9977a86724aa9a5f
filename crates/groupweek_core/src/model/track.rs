//! Topic tracks ("activity groups") registered per week.
//!
//! # Invariants
//! - A week has at most `MAX_TRACKS_PER_WEEK` tracks, unique by id.
//! - Track order is meaningful: slot `i` is handed to group member `i`.

use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Upper bound of tracks the registry accepts for one week.
pub const MAX_TRACKS_PER_WEEK: usize = 4;

/// Identifier of one track.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackId(String);

impl TrackId {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ModelValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ModelValidationError::EmptyTrackId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Slot-lettered id: `0 -> A`, `1 -> B`, ...
    pub fn for_slot(slot: usize) -> Self {
        let letter = (b'A' + (slot % 26) as u8) as char;
        if slot < 26 {
            Self(letter.to_string())
        } else {
            Self(format!("{letter}{}", slot / 26))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrackId {
    type Error = ModelValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrackId> for String {
    fn from(value: TrackId) -> Self {
        value.0
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry entry for a week's track. Title and link are display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub link: Option<String>,
}

impl Track {
    pub fn new(id: TrackId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            link: None,
        }
    }

    /// A track only counts toward the week's set when it has a title.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Validates a week's full track list before it replaces the stored one.
pub fn validate_week_tracks(week: u32, tracks: &[Track]) -> Result<(), ModelValidationError> {
    if tracks.len() > MAX_TRACKS_PER_WEEK {
        return Err(ModelValidationError::TooManyTracks {
            week,
            count: tracks.len(),
            max: MAX_TRACKS_PER_WEEK,
        });
    }
    let mut seen = BTreeSet::new();
    for track in tracks {
        if !seen.insert(track.id.as_str()) {
            return Err(ModelValidationError::DuplicateTrack(track.id.to_string()));
        }
    }
    Ok(())
}

/// Fixed placeholder set used when a week lacks enough titled tracks.
pub fn placeholder_tracks(count: usize) -> Vec<TrackId> {
    (0..count).map(TrackId::for_slot).collect()
}

#[cfg(test)]
mod tests {
    use super::{placeholder_tracks, validate_week_tracks, Track, TrackId};
    use crate::model::ModelValidationError;

    fn track(id: &str, title: &str) -> Track {
        Track::new(TrackId::new(id).unwrap(), title)
    }

    #[test]
    fn placeholders_are_slot_letters() {
        let ids: Vec<String> = placeholder_tracks(4)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn week_tracks_reject_duplicates_and_overflow() {
        let duplicated = vec![track("A", "one"), track("A", "two")];
        assert_eq!(
            validate_week_tracks(1, &duplicated).unwrap_err(),
            ModelValidationError::DuplicateTrack("A".to_string())
        );

        let overflow: Vec<Track> = (0..5)
            .map(|slot| Track::new(TrackId::for_slot(slot), "t"))
            .collect();
        assert!(matches!(
            validate_week_tracks(2, &overflow).unwrap_err(),
            ModelValidationError::TooManyTracks { count: 5, .. }
        ));
    }

    #[test]
    fn blank_title_is_not_valid() {
        assert!(!track("A", "  ").is_valid());
        assert!(track("A", "Attention economy").is_valid());
    }
}
