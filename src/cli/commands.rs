use chrono::NaiveDate;
use clap::{Parser, Subcommand};

const VERSION: &str = match option_env!("APP_VERSION") {
    Some(version) => version,
    _ => "0.1.0-dev",
};

#[derive(Parser)]
#[command(name = "campus", version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Starts the campus server on the configured port
    Start {
        /// Path for the configuration file or http(s) link to config file.
        #[arg(required = true)]
        config_path: String,
    },
    /// Checks the configuration file for errors
    Check {
        /// Path for the configuration file or http(s) link to config file.
        #[arg(required = true)]
        config_path: String,
    },
    /// Prints the schedule span of a course with the configured calendar
    Span {
        /// Path for the configuration file or http(s) link to config file.
        #[arg(required = true)]
        config_path: String,
        /// First day of the course, YYYY-MM-DD.
        #[arg(short, long)]
        start: NaiveDate,
        /// Length of the course in working days.
        #[arg(short, long)]
        days: u32,
    },
    /// Prints the JSON schema of the configuration file
    Schema,
}
