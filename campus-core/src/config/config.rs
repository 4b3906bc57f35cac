use crate::is_default;
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 19194;
pub const DEFAULT_RECORDS: &str = "campus.json";
pub const DEFAULT_CURRICULUM: &str = "curriculum";

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "is_default")]
    pub server: Server,
    #[serde(default, skip_serializing_if = "is_default")]
    pub storage: Storage,
    #[serde(default, skip_serializing_if = "is_default")]
    pub calendar: Calendar,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        if pretty {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Server {
    /// Address to bind, `localhost` binds every interface.
    #[serde(default, skip_serializing_if = "is_default")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub port: Option<u16>,
    /// Worker threads of the server runtime, defaults to the CPU count.
    #[serde(default, skip_serializing_if = "is_default")]
    pub workers: Option<usize>,
}

impl Server {
    pub fn get_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }
}

/// Where records and curriculum files live. Each entry is either a local
/// path or an http(s) URL of a remote store.
#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Storage {
    #[serde(default, skip_serializing_if = "is_default")]
    pub records: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub curriculum: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Calendar {
    /// Non-working weekdays, e.g. `["Sat", "Sun"]` (the default).
    #[serde(default, skip_serializing_if = "is_default")]
    pub weekend: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub holidays: Vec<HolidayInfo>,
    /// Path or URL of a JSON array of holidays, relative paths resolve
    /// against the config file.
    #[serde(default, skip_serializing_if = "is_default")]
    pub holiday_source: Option<String>,
    /// Offset used to turn the clock into today's date.
    #[serde(default, skip_serializing_if = "is_default")]
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HolidayInfo {
    pub date: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.to_json(false).unwrap(), "{}");
    }

    #[test]
    fn test_parse_config() {
        let config = Config::from_json(
            r#"{
                "server": {"port": 8080, "workers": 2},
                "storage": {"records": "https://records.example.com/campus"},
                "calendar": {
                    "weekend": ["Fri", "Sat"],
                    "holidays": [{"date": "2024-12-25", "name": "Christmas"}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.server.get_workers(), 2);
        assert_eq!(config.calendar.holidays.len(), 1);
        assert_eq!(
            config.calendar.weekend,
            Some(vec!["Fri".to_string(), "Sat".to_string()])
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(Config::from_json(r#"{"server": {"port": "eighty"}}"#).is_err());
    }
}
