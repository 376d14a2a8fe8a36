pub mod calendar;
pub mod config;
pub mod planner;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read a JSON document from a file
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `--now` if given, else the wall clock
fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    match now {
        Some(text) => dayplan_core::task::parse_instant(text).ok_or_else(|| format!("invalid --now: {text}").into()),
        None => Ok(Utc::now()),
    }
}
