use serde::{Deserialize, Serialize};

use crate::is_default;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub phone: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub created_at: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub phone: Option<String>,
    /// Schedules the student is enrolled in.
    #[serde(default)]
    pub schedule_ids: Vec<String>,
    pub created_at: u128,
}
