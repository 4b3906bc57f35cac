use anyhow::anyhow;
use campus_core::blueprint::Blueprint;
use campus_core::config::reader::ConfigReader;
use campus_core::config::Config;
use campus_core::runtime::TargetRuntime;
use clap::Parser;

use crate::cli::commands::{Cli, Command};
use crate::cli::{self, rt};

pub async fn fork_run() -> anyhow::Result<()> {
    logger_init();
    let cli = Cli::parse();
    let runtime = rt::init();

    run(cli, runtime).await
}

async fn run(cli: Cli, runtime: TargetRuntime) -> anyhow::Result<()> {
    let config_reader = ConfigReader::init(runtime.clone());
    match cli.command {
        Command::Start { config_path } => {
            let config = config_reader.read(config_path).await?;
            let server = cli::server::Server::new(config);
            server.fork_start().await?;
        }
        Command::Check { config_path } => {
            let config = config_reader.read(config_path).await?;
            match Blueprint::try_from(config) {
                Ok(_) => log::info!("Config is valid"),
                Err(e) => log::error!("Invalid config: {}", e),
            }
        }
        Command::Span {
            config_path,
            start,
            days,
        } => {
            let config = config_reader.read(config_path).await?;
            let blueprint = Blueprint::try_from(config)?;
            let span = blueprint
                .calendar
                .work
                .span(start, days)
                .map_err(|e| anyhow!("Unable to compute span: {}", e))?;
            display(serde_json::to_string_pretty(&span)?);
        }
        Command::Schema => {
            let schema = schemars::schema_for!(Config);
            display(serde_json::to_string_pretty(&schema)?);
        }
    }
    Ok(())
}

fn display<T: AsRef<str>>(content: T) {
    println!("{}", content.as_ref());
}

const LOG_LEVEL_VAR: &str = "CAMPUS_LOG_LEVEL";

/// Reads the filter from `CAMPUS_LOG_LEVEL`, falling back to `info`.
fn logger_builder() -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_LEVEL_VAR, "info"))
}

fn logger_init() {
    // tests initialise the logger more than once
    let _ = logger_builder().try_init();
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use log::LevelFilter;

    use super::*;

    #[test]
    fn test_log_level_from_env() {
        std::env::remove_var(LOG_LEVEL_VAR);
        assert_eq!(logger_builder().build().filter(), LevelFilter::Info);

        std::env::set_var(LOG_LEVEL_VAR, "debug");
        assert_eq!(logger_builder().build().filter(), LevelFilter::Debug);

        std::env::set_var(LOG_LEVEL_VAR, "warn");
        assert_eq!(logger_builder().build().filter(), LevelFilter::Warn);
        std::env::remove_var(LOG_LEVEL_VAR);
    }

    #[tokio::test]
    async fn test_run_check() {
        logger_init();
        let cli = Cli {
            command: Command::Check {
                config_path: "demos/config.json".to_string(),
            },
        };
        assert!(run(cli, rt::init()).await.is_ok())
    }

    #[tokio::test]
    async fn test_run_span() {
        let cli = Cli {
            command: Command::Span {
                config_path: "demos/config.json".to_string(),
                start: NaiveDate::from_ymd_opt(2024, 12, 23).unwrap(),
                days: 3,
            },
        };
        assert!(run(cli, rt::init()).await.is_ok())
    }

    #[tokio::test]
    async fn test_run_span_rejects_zero_days() {
        let cli = Cli {
            command: Command::Span {
                config_path: "demos/config.json".to_string(),
                start: NaiveDate::from_ymd_opt(2024, 12, 23).unwrap(),
                days: 0,
            },
        };
        assert!(run(cli, rt::init()).await.is_err())
    }

    #[tokio::test]
    async fn test_missing_config() {
        let cli = Cli {
            command: Command::Check {
                config_path: "demos/missing.json".to_string(),
            },
        };
        assert!(run(cli, rt::init()).await.is_err())
    }

    #[test]
    fn test_cli_parses_span() {
        let cli = Cli::parse_from([
            "campus",
            "span",
            "demos/config.json",
            "--start",
            "2024-03-15",
            "--days",
            "10",
        ]);
        match cli.command {
            Command::Span { start, days, .. } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
                assert_eq!(days, 10);
            }
            _ => panic!("expected span command"),
        }
    }
}
