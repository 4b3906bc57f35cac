//! Parsing of submitted forms into typed drafts.
//!
//! Every form collects all failing fields before returning, so a client can
//! show each message next to its input in one round trip.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod course_form;
pub mod people_form;
pub mod schedule_form;

pub use course_form::{CourseDraft, CourseForm};
pub use people_form::{PersonDraft, StudentForm, TrainerForm};
pub use schedule_form::{HolidayForm, ScheduleDraft, ScheduleForm, SchedulePreviewForm};

pub const MAX_DURATION: i64 = 365;
const MAX_TITLE_LEN: usize = 120;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid");
    static ref PHONE: Regex = Regex::new(r"^\+?[0-9][0-9 \-]*$").expect("phone pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single<F: AsRef<str>, M: AsRef<str>>(field: F, message: M) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push<F: AsRef<str>, M: AsRef<str>>(&mut self, field: F, message: M) {
        self.fields.push(FieldError {
            field: field.as_ref().to_string(),
            message: message.as_ref().to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// `Ok(value)` when nothing was reported.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>();
        write!(f, "{}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

fn required(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, "is required");
    }
    value.to_string()
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn date(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, "is required");
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(field, "must be a date formatted as YYYY-MM-DD");
            None
        }
    }
}

fn duration(errors: &mut ValidationErrors, field: &str, value: Option<i64>) -> u32 {
    match value {
        None => {
            errors.push(field, "is required");
            0
        }
        Some(days) if !(1..=MAX_DURATION).contains(&days) => {
            errors.push(
                field,
                format!("must be between 1 and {} working days", MAX_DURATION),
            );
            0
        }
        Some(days) => days as u32,
    }
}

fn email(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
    let value = required(errors, field, value);
    if !value.is_empty() && !EMAIL.is_match(&value) {
        errors.push(field, "must be a valid email address");
    }
    value
}

fn phone(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<String> {
    let value = optional(value)?;
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !PHONE.is_match(&value) || !(7..=15).contains(&digits) {
        errors.push(field, "must be a phone number of 7 to 15 digits");
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        let mut errors = ValidationErrors::default();
        email(&mut errors, "email", "ada@example.org");
        email(&mut errors, "email", "first.last+tag@mail.example.co.uk");
        assert!(errors.is_empty());

        for bad in ["ada", "ada@", "@example.org", "ada@example", "a b@example.org"] {
            let mut errors = ValidationErrors::default();
            email(&mut errors, "email", bad);
            assert!(errors.has("email"), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_phone_pattern() {
        let mut errors = ValidationErrors::default();
        assert_eq!(phone(&mut errors, "phone", Some("  ".to_string())), None);
        phone(&mut errors, "phone", Some("+44 20 7946-0958".to_string()));
        assert!(errors.is_empty());

        phone(&mut errors, "phone", Some("12345".to_string()));
        phone(&mut errors, "phone", Some("call me".to_string()));
        assert_eq!(errors.fields.len(), 2);
    }

    #[test]
    fn test_duration_bounds() {
        let mut errors = ValidationErrors::default();
        assert_eq!(duration(&mut errors, "duration", Some(1)), 1);
        assert_eq!(duration(&mut errors, "duration", Some(365)), 365);
        assert!(errors.is_empty());
        duration(&mut errors, "duration", Some(0));
        duration(&mut errors, "duration", Some(366));
        duration(&mut errors, "duration", None);
        assert_eq!(errors.fields.len(), 3);
    }

    #[test]
    fn test_display() {
        let mut errors = ValidationErrors::single("title", "is required");
        errors.push("duration", "is required");
        assert_eq!(errors.to_string(), "title: is required, duration: is required");
    }
}
