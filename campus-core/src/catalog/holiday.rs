use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    /// Holidays are keyed by their ISO date.
    pub fn key(&self) -> String {
        self.date.to_string()
    }
}
