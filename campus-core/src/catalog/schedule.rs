use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::ScheduleStatus;
use crate::is_default;

/// A course run. `end_date` is always computed from the course duration and
/// the work calendar, never taken from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSchedule {
    pub id: String,
    pub course_id: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub trainer_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: u128,
}

/// Read model of a schedule, with its status as of the day it was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub id: String,
    pub course_id: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub trainer_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ScheduleStatus,
    pub created_at: u128,
}

impl CourseSchedule {
    pub fn status(&self, today: NaiveDate) -> ScheduleStatus {
        ScheduleStatus::classify(today, self.start_date, self.end_date)
    }

    pub fn view(&self, today: NaiveDate) -> ScheduleView {
        ScheduleView {
            id: self.id.clone(),
            course_id: self.course_id.clone(),
            trainer_id: self.trainer_id.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status(today),
            created_at: self.created_at,
        }
    }
}
