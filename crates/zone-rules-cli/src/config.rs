//! Command-line configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use strum::{AsRefStr, Display};
use tracing_subscriber::filter::LevelFilter;

macro_rules! prefix {
    () => {
        "ZONE_RULES_"
    };
}

#[derive(Debug, Parser)]
#[command(name = "zonerules", version, about = "Convert timestamps between Windows-style timezone rules")]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// JSON file of zone records to load instead of the bundled table.
    #[arg(global = true, long, env(concat!(prefix!(), "FILE")), value_name("PATH"))]
    pub rules: Option<PathBuf>,

    /// Logging level written to stderr.
    #[arg(
        global = true,
        long,
        default_value_t,
        env(concat!(prefix!(), "LOG_LEVEL")),
        value_enum,
        value_name("LEVEL")
    )]
    pub log_level: LogLevel,

    /// Print results as JSON.
    #[arg(global = true, long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List zone display names in priority order.
    List,

    /// Show a zone's rule.
    Show {
        /// Zone display name.
        zone: String,
    },

    /// Show a zone's daylight saving interval for a year.
    Interval {
        /// Zone display name.
        zone: String,
        /// Calendar year.
        year: i32,
    },

    /// Convert local time in a zone to UTC.
    ToUtc {
        /// Zone display name.
        zone: String,
        /// Local time, e.g. 2024-07-04T12:00:00.
        local: String,
    },

    /// Convert UTC to local time in a zone.
    ToLocal {
        /// Zone display name.
        zone: String,
        /// UTC time, e.g. 2024-07-04T16:00:00.
        utc: String,
    },

    /// Convert local time in one zone to local time in another.
    Convert {
        /// Source zone display name.
        from: String,
        /// Destination zone display name.
        to: String,
        /// Local time in the source zone.
        local: String,
    },
}

#[derive(AsRefStr, Clone, Copy, Debug, Default, Display, Eq, PartialEq, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}
