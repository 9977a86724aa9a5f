//! Grouping policy constants and their loading.
//!
//! # Responsibility
//! - Name the size, cap and fallback constants the algorithm depends on.
//! - Load overrides from JSON and reject inconsistent combinations.
//!
//! # Invariants
//! - `1 <= min_group_size <= preferred_group_size <= max_group_size`.
//! - `max_group_count >= 1`.
//! - `1 <= fallback_track_count <= MAX_TRACKS_PER_WEEK`.

use crate::model::track::MAX_TRACKS_PER_WEEK;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_PREFERRED_GROUP_SIZE: usize = 4;
pub const DEFAULT_MIN_GROUP_SIZE: usize = 3;
pub const DEFAULT_MAX_GROUP_SIZE: usize = 5;
pub const DEFAULT_MAX_GROUP_COUNT: usize = 6;
pub const DEFAULT_FALLBACK_TRACK_COUNT: usize = 4;

/// Failure to load or validate a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("group sizes must satisfy 1 <= min ({min}) <= preferred ({preferred}) <= max ({max})")]
    InconsistentSizes {
        min: usize,
        preferred: usize,
        max: usize,
    },
    #[error("fallbackTrackCount ({count}) exceeds the {max} tracks a week can register")]
    TooManyTracks { count: usize, max: usize },
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
    #[error("failed to read policy file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid policy json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable constants for partitioning and track assignment.
///
/// Missing JSON fields fall back to the documented defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupingPolicy {
    pub preferred_group_size: usize,
    pub min_group_size: usize,
    pub max_group_size: usize,
    pub max_group_count: usize,
    /// Exact length of the normalized track list.
    pub fallback_track_count: usize,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self {
            preferred_group_size: DEFAULT_PREFERRED_GROUP_SIZE,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            max_group_size: DEFAULT_MAX_GROUP_SIZE,
            max_group_count: DEFAULT_MAX_GROUP_COUNT,
            fallback_track_count: DEFAULT_FALLBACK_TRACK_COUNT,
        }
    }
}

impl GroupingPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.min_group_size == 0
            || self.min_group_size > self.preferred_group_size
            || self.preferred_group_size > self.max_group_size
        {
            return Err(PolicyError::InconsistentSizes {
                min: self.min_group_size,
                preferred: self.preferred_group_size,
                max: self.max_group_size,
            });
        }
        if self.max_group_count == 0 {
            return Err(PolicyError::ZeroCount {
                field: "maxGroupCount",
            });
        }
        if self.fallback_track_count == 0 {
            return Err(PolicyError::ZeroCount {
                field: "fallbackTrackCount",
            });
        }
        if self.fallback_track_count > MAX_TRACKS_PER_WEEK {
            return Err(PolicyError::TooManyTracks {
                count: self.fallback_track_count,
                max: MAX_TRACKS_PER_WEEK,
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON policy document.
    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(raw)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reads a JSON policy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{GroupingPolicy, PolicyError};

    #[test]
    fn defaults_are_valid() {
        let policy = GroupingPolicy::default();
        policy.validate().unwrap();
        assert_eq!(policy.preferred_group_size, 4);
        assert_eq!(policy.max_group_count, 6);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let policy = GroupingPolicy::from_json_str(r#"{ "maxGroupCount": 8 }"#).unwrap();
        assert_eq!(policy.max_group_count, 8);
        assert_eq!(policy.fallback_track_count, 4);
    }

    #[test]
    fn inconsistent_sizes_are_rejected() {
        let err = GroupingPolicy::from_json_str(r#"{ "minGroupSize": 5, "preferredGroupSize": 4 }"#)
            .unwrap_err();
        assert!(matches!(err, PolicyError::InconsistentSizes { .. }));
    }

    #[test]
    fn track_count_above_weekly_limit_is_rejected() {
        let err = GroupingPolicy::from_json_str(r#"{ "fallbackTrackCount": 5 }"#).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::TooManyTracks { count: 5, max: 4 }
        ));
        GroupingPolicy::from_json_str(r#"{ "fallbackTrackCount": 3 }"#).unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = GroupingPolicy::from_json_str(r#"{ "groupSize": 4 }"#).unwrap_err();
        assert!(matches!(err, PolicyError::Parse(_)));
    }
}
