use std::fmt::{Display, Formatter};

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a scheduled course stands relative to the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ScheduleStatus {
    /// Both bounds are inclusive: a course is ongoing on its first and on its
    /// last day.
    pub fn classify(today: NaiveDate, start: NaiveDate, end: NaiveDate) -> Self {
        if today < start {
            ScheduleStatus::Upcoming
        } else if today > end {
            ScheduleStatus::Completed
        } else {
            ScheduleStatus::Ongoing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Upcoming => "upcoming",
            ScheduleStatus::Ongoing => "ongoing",
            ScheduleStatus::Completed => "completed",
        }
    }
}

impl Display for ScheduleStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drops the time of day from a clock reading (ms since epoch) by converting
/// it to a calendar date in `offset`.
pub fn today(now_millis: u128, offset: FixedOffset) -> Result<NaiveDate> {
    let millis = i64::try_from(now_millis)?;
    let instant = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow!("Clock reading {} is out of range", now_millis))?;
    Ok(instant.with_timezone(&offset).date_naive())
}
