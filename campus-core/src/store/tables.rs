use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Course, CourseSchedule, Holiday, Student, Trainer};

/// Every table of the record store, keyed by record id (holidays by ISO
/// date). This is also the snapshot format written to storage.
#[derive(Default, Debug, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub courses: DashMap<String, Course>,
    #[serde(default)]
    pub schedules: DashMap<String, CourseSchedule>,
    #[serde(default)]
    pub trainers: DashMap<String, Trainer>,
    #[serde(default)]
    pub students: DashMap<String, Student>,
    #[serde(default)]
    pub holidays: DashMap<String, Holiday>,
}

impl Tables {
    pub fn from_json<T: AsRef<[u8]>>(json: T) -> Result<Self> {
        Ok(serde_json::from_slice(json.as_ref())?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Clones the values of `map` ordered by `key`.
pub fn sorted<T, K, F>(map: &DashMap<String, T>, key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut values = map.iter().map(|e| e.value().clone()).collect::<Vec<_>>();
    values.sort_by_key(|v| key(v));
    values
}
