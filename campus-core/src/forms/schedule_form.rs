use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{date, duration, optional, required, ValidationErrors};
use crate::catalog::Holiday;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScheduleForm {
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub trainer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub course_id: String,
    pub start_date: NaiveDate,
    pub trainer_id: Option<String>,
}

impl ScheduleForm {
    pub fn validate(self) -> Result<ScheduleDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let course_id = required(&mut errors, "course_id", &self.course_id);
        let start_date = date(&mut errors, "start_date", &self.start_date);
        match start_date {
            Some(start_date) => errors.into_result(ScheduleDraft {
                course_id,
                start_date,
                trainer_id: optional(self.trainer_id),
            }),
            None => Err(errors),
        }
    }
}

/// Ad hoc span calculation that is not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchedulePreviewForm {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl SchedulePreviewForm {
    pub fn validate(self) -> Result<(NaiveDate, u32), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let start_date = date(&mut errors, "start_date", &self.start_date);
        let duration = duration(&mut errors, "duration", self.duration);
        match start_date {
            Some(start_date) => errors.into_result((start_date, duration)),
            None => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HolidayForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub name: String,
}

impl HolidayForm {
    pub fn validate(self) -> Result<Holiday, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let date = date(&mut errors, "date", &self.date);
        let name = required(&mut errors, "name", &self.name);
        match date {
            Some(date) => errors.into_result(Holiday { date, name }),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_form() {
        let form = ScheduleForm {
            course_id: "c1".to_string(),
            start_date: "2024-03-11".to_string(),
            trainer_id: Some("".to_string()),
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(draft.trainer_id, None);
    }

    #[test]
    fn test_schedule_form_bad_date() {
        let form = ScheduleForm {
            course_id: "".to_string(),
            start_date: "11/03/2024".to_string(),
            trainer_id: None,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("course_id"));
        assert!(errors.has("start_date"));
    }

    #[test]
    fn test_preview_form() {
        let form = SchedulePreviewForm {
            start_date: "2024-02-30".to_string(),
            duration: Some(0),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields.len(), 2);
    }

    #[test]
    fn test_holiday_form() {
        let form = HolidayForm {
            date: "2024-12-25".to_string(),
            name: " Christmas ".to_string(),
        };
        let holiday = form.validate().unwrap();
        assert_eq!(holiday.key(), "2024-12-25");
        assert_eq!(holiday.name, "Christmas");
    }
}
