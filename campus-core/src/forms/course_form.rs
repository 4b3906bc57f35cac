use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{duration, optional, required, ValidationErrors, MAX_TITLE_LEN};
use crate::catalog::{CourseType, DeliveryMode};

/// Course as submitted by a client. Every field is raw so that membership
/// and bounds can be reported per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CourseForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub course_type: String,
    #[serde(default)]
    pub curriculum: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub duration: u32,
    pub mode: DeliveryMode,
    pub course_type: CourseType,
    pub curriculum: Option<String>,
}

impl CourseForm {
    pub fn validate(self) -> Result<CourseDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = required(&mut errors, "title", &self.title);
        if title.chars().count() > MAX_TITLE_LEN {
            errors.push(
                "title",
                format!("must be at most {} characters", MAX_TITLE_LEN),
            );
        }
        let description = required(&mut errors, "description", &self.description);
        let duration = duration(&mut errors, "duration", self.duration);

        let mode = self.mode.parse::<DeliveryMode>();
        if mode.is_err() {
            errors.push("mode", "must be one of: Online, Remote");
        }
        let course_type = self.course_type.parse::<CourseType>();
        if course_type.is_err() {
            errors.push("course_type", "must be one of: Full time, Part time");
        }

        match (mode, course_type) {
            (Ok(mode), Ok(course_type)) => errors.into_result(CourseDraft {
                title,
                description,
                duration,
                mode,
                course_type,
                curriculum: optional(self.curriculum),
            }),
            _ => Err(errors),
        }
    }
}
