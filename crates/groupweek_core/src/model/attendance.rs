//! Weekly attendance status.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Attendance for one participant in one week.
///
/// Both absence kinds are excluded from grouping identically; the split only
/// matters for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present and eligible for grouping.
    Attending,
    /// Absence announced before the session day.
    #[serde(rename = "absent_pre")]
    AbsentBefore,
    /// Absence reported on the day itself.
    #[serde(rename = "absent_day")]
    AbsentDayOf,
}

impl AttendanceStatus {
    pub fn is_present(self) -> bool {
        matches!(self, Self::Attending)
    }

    /// Stable storage code.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Attending => "attending",
            Self::AbsentBefore => "absent_pre",
            Self::AbsentDayOf => "absent_day",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "attending" => Some(Self::Attending),
            "absent_pre" => Some(Self::AbsentBefore),
            "absent_day" => Some(Self::AbsentDayOf),
            _ => None,
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_code(value.trim().to_ascii_lowercase().as_str()).ok_or_else(|| {
            format!("unknown attendance status `{value}`; expected attending|absent_pre|absent_day")
        })
    }
}
