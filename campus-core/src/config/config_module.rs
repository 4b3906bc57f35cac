use std::ops::Deref;
use std::path::Path;

use anyhow::Context;

use crate::config::{Config, HolidayInfo};
use crate::runtime::TargetRuntime;

/// A config together with everything it links to.
#[derive(Default, Debug, Clone)]
pub struct ConfigModule {
    pub config: Config,
    /// Holidays loaded from `calendar.holiday_source`.
    pub linked_holidays: Vec<HolidayInfo>,
}

impl Deref for ConfigModule {
    type Target = Config;
    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl From<Config> for ConfigModule {
    fn from(value: Config) -> Self {
        Self {
            config: value,
            linked_holidays: Vec::new(),
        }
    }
}

impl ConfigModule {
    /// Loads linked resources. `parent` is the directory of the config file,
    /// used to resolve relative links.
    pub async fn resolve(
        self,
        target_runtime: &TargetRuntime,
        parent: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let Some(source) = self.config.calendar.holiday_source.clone() else {
            return Ok(self);
        };

        let content = if source.starts_with("http") {
            let url = url::Url::parse(&source)?;
            let response = target_runtime
                .http
                .execute(reqwest::Request::new(reqwest::Method::GET, url))
                .await?;
            String::from_utf8(response.body.to_vec())?
        } else {
            let path = match parent {
                Some(parent) if Path::new(&source).is_relative() => parent.join(&source),
                _ => Path::new(&source).to_path_buf(),
            };
            let path = path.to_str().context("Unable to generate holiday path")?;
            target_runtime.file.read(path).await?
        };

        let linked_holidays = serde_json::from_str::<Vec<HolidayInfo>>(&content)
            .with_context(|| format!("Invalid holiday list in {}", source))?;
        log::debug!("Loaded {} holidays from {}", linked_holidays.len(), source);

        Ok(ConfigModule {
            linked_holidays,
            ..self
        })
    }

    /// Holidays declared inline followed by the linked ones.
    pub fn holidays(&self) -> impl Iterator<Item = &HolidayInfo> {
        self.config
            .calendar
            .holidays
            .iter()
            .chain(self.linked_holidays.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_relative_holiday_source() {
        let runtime = crate::runtime::tests::init();
        runtime
            .file
            .write(
                "/etc/campus/holidays.json",
                br#"[{"date":"2024-12-26","name":"Boxing Day"}]"#,
            )
            .await
            .unwrap();

        let mut config = Config::default();
        config.calendar.holidays.push(HolidayInfo {
            date: "2024-12-25".to_string(),
            name: "Christmas".to_string(),
        });
        config.calendar.holiday_source = Some("holidays.json".to_string());

        let module = ConfigModule::from(config)
            .resolve(&runtime, Some(Path::new("/etc/campus")))
            .await
            .unwrap();

        let dates = module.holidays().map(|h| h.date.as_str()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2024-12-25", "2024-12-26"]);
    }

    #[tokio::test]
    async fn test_resolve_remote_holiday_source() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/holidays");
            then.status(200)
                .body(r#"[{"date":"2025-01-01","name":"New Year"}]"#);
        });

        let mut config = Config::default();
        config.calendar.holiday_source = Some(server.url("/holidays"));

        let module = ConfigModule::from(config)
            .resolve(&crate::runtime::tests::init(), None)
            .await
            .unwrap();
        assert_eq!(module.linked_holidays.len(), 1);
        assert_eq!(module.linked_holidays[0].name, "New Year");
    }

    #[tokio::test]
    async fn test_missing_holiday_source() {
        let mut config = Config::default();
        config.calendar.holiday_source = Some("missing.json".to_string());

        let result = ConfigModule::from(config)
            .resolve(&crate::runtime::tests::init(), None)
            .await;
        assert!(result.is_err());
    }
}
