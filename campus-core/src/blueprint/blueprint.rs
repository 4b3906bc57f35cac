use std::collections::HashSet;
use std::net::IpAddr;

use anyhow::{anyhow, Context};
use chrono::{FixedOffset, NaiveDate, Weekday};

use crate::calendar::WorkCalendar;
use crate::catalog::Holiday;
use crate::config;
use crate::config::config_module::ConfigModule;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Validated, typed form of the configuration the server runs with.
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub server: Server,
    pub storage: Storage,
    pub calendar: Calendar,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub hostname: IpAddr,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct Storage {
    pub records: String,
    pub curriculum: String,
}

#[derive(Debug, Clone)]
pub struct Calendar {
    /// Weekend and the configured holidays. Holidays added at runtime are
    /// merged in by the record store.
    pub work: WorkCalendar,
    pub holidays: Vec<Holiday>,
    pub offset: FixedOffset,
}

impl TryFrom<&config::Server> for Server {
    type Error = anyhow::Error;

    fn try_from(server: &config::Server) -> Result<Self, Self::Error> {
        let hostname = server.host.clone().unwrap_or("0.0.0.0".to_string());
        let hostname = if hostname.eq("localhost") {
            "0.0.0.0".parse()
        } else {
            hostname.parse()
        }
        .map_err(|_| anyhow!("Invalid host: {}", hostname))?;

        let workers = server.get_workers();
        if workers == 0 {
            return Err(anyhow!("workers must be at least 1"));
        }

        Ok(Server {
            port: server.port.unwrap_or(config::DEFAULT_PORT),
            hostname,
            workers,
        })
    }
}

impl TryFrom<&config::Storage> for Storage {
    type Error = anyhow::Error;

    fn try_from(storage: &config::Storage) -> Result<Self, Self::Error> {
        let records = storage
            .records
            .clone()
            .unwrap_or(config::DEFAULT_RECORDS.to_string());
        let curriculum = storage
            .curriculum
            .clone()
            .unwrap_or(config::DEFAULT_CURRICULUM.to_string());

        for location in [&records, &curriculum] {
            if location.trim().is_empty() {
                return Err(anyhow!("Storage locations cannot be empty"));
            }
            if location.starts_with("http") {
                url::Url::parse(location)
                    .map_err(|_| anyhow!("Invalid URL for storage: {}", location))?;
            }
        }

        Ok(Storage {
            records,
            curriculum,
        })
    }
}

impl TryFrom<&ConfigModule> for Calendar {
    type Error = anyhow::Error;

    fn try_from(module: &ConfigModule) -> Result<Self, Self::Error> {
        let weekend = match &module.calendar.weekend {
            Some(days) => days
                .iter()
                .map(|day| {
                    day.parse::<Weekday>()
                        .map_err(|_| anyhow!("Unknown weekend day: {}", day))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => vec![Weekday::Sat, Weekday::Sun],
        };

        let mut seen = HashSet::new();
        let mut holidays = Vec::new();
        for info in module.holidays() {
            let date = NaiveDate::parse_from_str(info.date.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid holiday date: {}", info.date))?;
            if info.name.trim().is_empty() {
                return Err(anyhow!("Holiday on {} needs a name", date));
            }
            if !seen.insert(date) {
                return Err(anyhow!("Holiday {} is declared twice", date));
            }
            holidays.push(Holiday {
                date,
                name: info.name.trim().to_string(),
            });
        }
        holidays.sort_by_key(|h| h.date);

        let minutes = module.calendar.utc_offset_minutes.unwrap_or_default();
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(anyhow!(
                "utc_offset_minutes must be within ±{} minutes",
                MAX_OFFSET_MINUTES
            ));
        }
        let offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| anyhow!("Invalid utc offset: {} minutes", minutes))?;

        Ok(Calendar {
            work: WorkCalendar::new(weekend, holidays.iter().map(|h| h.date))?,
            holidays,
            offset,
        })
    }
}

impl TryFrom<ConfigModule> for Blueprint {
    type Error = anyhow::Error;

    fn try_from(config_module: ConfigModule) -> Result<Self, Self::Error> {
        Ok(Self {
            server: Server::try_from(&config_module.server)?,
            storage: Storage::try_from(&config_module.storage)?,
            calendar: Calendar::try_from(&config_module)?,
        })
    }
}
