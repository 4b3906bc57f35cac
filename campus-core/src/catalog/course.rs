use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::is_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DeliveryMode {
    Online,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CourseType {
    #[serde(rename = "Full time")]
    FullTime,
    #[serde(rename = "Part time")]
    PartTime,
}

impl FromStr for DeliveryMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(DeliveryMode::Online),
            "remote" => Ok(DeliveryMode::Remote),
            _ => Err(anyhow!("Unknown delivery mode: {}", s)),
        }
    }
}

impl Display for DeliveryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMode::Online => f.write_str("Online"),
            DeliveryMode::Remote => f.write_str("Remote"),
        }
    }
}

impl FromStr for CourseType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "full time" | "fulltime" => Ok(CourseType::FullTime),
            "part time" | "parttime" => Ok(CourseType::PartTime),
            _ => Err(anyhow!("Unknown course type: {}", s)),
        }
    }
}

impl Display for CourseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseType::FullTime => f.write_str("Full time"),
            CourseType::PartTime => f.write_str("Part time"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Length of the course in working days.
    pub duration: u32,
    pub mode: DeliveryMode,
    pub course_type: CourseType,
    /// Content id of the curriculum file, if one was uploaded.
    #[serde(default, skip_serializing_if = "is_default")]
    pub curriculum: Option<String>,
    pub created_at: u128,
}
