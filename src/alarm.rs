use std::{cmp::Ordering, fmt};

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// represents an alarm
/// contains the time that the alarm should go off at,
/// a label to show when it rings and how urgent it is.
///
/// alarms are never changed while they sit in a queue,
/// editing one means removing it and adding the new version.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Alarm {
    #[serde(with = "toml_datetime_compat")]
    pub time: NaiveDateTime,
    #[serde(default)]
    pub label: String,
    /// higher is more urgent, there is no enforced range
    #[serde(default)]
    pub priority: i64,
}

impl Alarm {
    #[must_use]
    pub fn new(time: NaiveDateTime, label: impl Into<String>, priority: i64) -> Self {
        Self {
            time,
            label: label.into(),
            priority,
        }
    }

    /// an alarm with the default priority of 0
    #[must_use]
    pub fn at(time: NaiveDateTime, label: impl Into<String>) -> Self {
        Self::new(time, label, 0)
    }

    /// chronological ordering, only for display purposes.
    /// queues order by priority and never call this.
    #[must_use]
    pub fn cmp_by_time(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time)
    }

    /// whether the alarm should ring at `now`.
    /// only the hour, minute and second are compared, the date is ignored
    #[must_use]
    pub fn is_due(&self, now: NaiveTime) -> bool {
        now.hour() == self.time.hour()
            && now.minute() == self.time.minute()
            && now.second() == self.time.second()
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.label, self.time.format("%H:%M:%S"))
    }
}
