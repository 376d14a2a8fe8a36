//! TOML-based planner configuration.
//!
//! Groups the values the algorithms take as parameters:
//! - Workday timezone and local work hours
//! - Capacity projection constants
//! - Exception classification settings
//!
//! Every field has a default, so an empty document is a valid config. Reading
//! the file from disk is left to the caller.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::planner::{CapacityConfig, ExceptionsConfig};

/// Timezone and local work hours used to build day windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdayConfig {
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_work_start", with = "hhmm")]
    pub work_start: NaiveTime,
    #[serde(default = "default_work_end", with = "hhmm")]
    pub work_end: NaiveTime,
}

fn default_timezone() -> Tz {
    chrono_tz::UTC
}
fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_work_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 30, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for WorkdayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            work_start: default_work_start(),
            work_end: default_work_end(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workday: WorkdayConfig,
    #[serde(default)]
    pub capacity: CapacityConfig,
    #[serde(default)]
    pub exceptions: ExceptionsConfig,
}

impl Config {
    /// Parse a TOML document. Out-of-range thresholds are clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or holds a value
    /// of the wrong shape (unknown timezone, malformed `HH:MM`).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut cfg: Config = toml::from_str(content)?;
        cfg.exceptions = cfg.exceptions.normalized();
        Ok(cfg)
    }

    /// Render as a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Parse a local `HH:MM` (or `HH:MM:SS`) time of day
pub fn parse_hhmm(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_hhmm(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("expected HH:MM, got '{text}'")))
    }
}
