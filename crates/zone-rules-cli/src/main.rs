//! `zonerules` — convert timestamps between Windows-style timezone rules.

mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{filter::LevelFilter, prelude::*};
use zone_rules::{daylight_time, to_local, to_utc, zone_time, RuleStore};

use crate::config::{Command, Config};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn main() -> ExitCode {
    let config = Config::parse();
    if let Err(e) = init_logging(&config) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::from(config.log_level));
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("init stderr fmt layer")?;
    debug!("Set log level to: {}", config.log_level);
    Ok(())
}

fn load_store(config: &Config) -> Result<RuleStore> {
    match &config.rules {
        Some(path) => RuleStore::from_path(path)
            .with_context(|| format!("load zone rules from {}", path.display())),
        None => RuleStore::bundled().context("load bundled zone rules"),
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
        .with_context(|| format!("invalid timestamp '{s}', expected YYYY-MM-DDTHH:MM[:SS]"))
}

fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn run(config: &Config) -> Result<String> {
    let store = load_store(config)?;

    let output = match &config.command {
        Command::List => {
            if config.json {
                serde_json::to_string_pretty(store.zones())?
            } else {
                store
                    .iter()
                    .map(|z| format!("{:>4}  {}", z.index(), z.display_name()))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Command::Show { zone } => {
            let rule = store.require(zone)?;
            if config.json {
                serde_json::to_string_pretty(rule)?
            } else {
                let mut lines = vec![
                    format!("zone:      {}", rule.display_name()),
                    format!("standard:  {}", rule.standard_name()),
                    format!("daylight:  {}", rule.daylight_name()),
                    format!("bias:      {} min", rule.standard_offset().num_minutes()),
                ];
                match rule.transitions() {
                    Some(t) => {
                        lines.push(format!("delta:     {} min", rule.daylight_delta().num_minutes()));
                        lines.push(format!("dst start: {}", t.daylight));
                        lines.push(format!("dst end:   {}", t.standard));
                    }
                    None => lines.push("dst:       none".to_string()),
                }
                lines.join("\n")
            }
        }
        Command::Interval { zone, year } => {
            let rule = store.require(zone)?;
            let dst = daylight_time(*year, rule)
                .with_context(|| format!("resolve {year} transitions for '{zone}'"))?;
            if config.json {
                serde_json::to_string_pretty(&dst)?
            } else {
                match dst {
                    Some(dst) => format!(
                        "start: {}\nend:   {}",
                        format_timestamp(&dst.start),
                        format_timestamp(&dst.end)
                    ),
                    None => format!("{zone} does not observe daylight saving time"),
                }
            }
        }
        Command::ToUtc { zone, local } => {
            let rule = store.require(zone)?;
            let utc = to_utc(parse_timestamp(local)?, rule)?;
            if config.json {
                serde_json::to_string_pretty(&zone_time(utc, rule)?)?
            } else {
                format_timestamp(&utc)
            }
        }
        Command::ToLocal { zone, utc } => {
            let rule = store.require(zone)?;
            let utc = parse_timestamp(utc)?;
            if config.json {
                serde_json::to_string_pretty(&zone_time(utc, rule)?)?
            } else {
                format_timestamp(&to_local(utc, rule)?)
            }
        }
        Command::Convert { from, to, local } => {
            let source = store.require(from)?;
            let dest = store.require(to)?;
            let utc = to_utc(parse_timestamp(local)?, source)?;
            if config.json {
                serde_json::to_string_pretty(&json!({
                    "source": zone_time(utc, source)?,
                    "destination": zone_time(utc, dest)?,
                }))?
            } else {
                format_timestamp(&to_local(utc, dest)?)
            }
        }
    };

    Ok(output)
}
