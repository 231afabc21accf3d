//! Schedule types: work/break intervals and the per-day schedule record.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// A single block on the day's timeline.
///
/// Serialized as `{"type":"work","task_id":..,"desc":..,"start":"HH:MM","end":"HH:MM"}`
/// or `{"type":"break","start":"HH:MM","end":"HH:MM"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScheduleInterval {
    /// Focused work on one task
    Work {
        task_id: String,
        desc: String,
        #[serde(with = "hhmm")]
        start: NaiveTime,
        #[serde(with = "hhmm")]
        end: NaiveTime,
    },
    /// Rest between two sessions of the same task
    Break {
        #[serde(with = "hhmm")]
        start: NaiveTime,
        #[serde(with = "hhmm")]
        end: NaiveTime,
    },
}

impl ScheduleInterval {
    pub fn start(&self) -> NaiveTime {
        match self {
            ScheduleInterval::Work { start, .. } | ScheduleInterval::Break { start, .. } => *start,
        }
    }

    pub fn end(&self) -> NaiveTime {
        match self {
            ScheduleInterval::Work { end, .. } | ScheduleInterval::Break { end, .. } => *end,
        }
    }

    /// Length in minutes. Intervals crossing midnight wrap around.
    pub fn duration_minutes(&self) -> i64 {
        let minutes = (self.end() - self.start()).num_minutes();
        if minutes < 0 {
            minutes + MINUTES_PER_DAY
        } else {
            minutes
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            ScheduleInterval::Work { task_id, .. } => Some(task_id.as_str()),
            ScheduleInterval::Break { .. } => None,
        }
    }

    pub fn is_work(&self) -> bool {
        matches!(self, ScheduleInterval::Work { .. })
    }
}

/// The full interval sequence for one user on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub user_id: i64,
    pub date: NaiveDate,
    pub intervals: Vec<ScheduleInterval>,
}

/// `HH:MM` (de)serialization for interval boundaries.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
