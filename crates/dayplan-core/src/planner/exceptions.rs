//! Exception classification settings and their environment adapter.
//!
//! The algorithms take a [`PlannerConfig`] value. Reading it from
//! environment-like key/value pairs happens here, outside the scoring code,
//! and never fails: unreadable values fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::task::{parse_flag, parse_number};

/// Environment key enabling critical-priority exceptions
pub const INCLUDE_CRITICAL_KEY: &str = "PLANNER_EXCEPTIONS_INCLUDE_CRITICAL";
/// Environment key for the critical-priority threshold
pub const CRITICAL_THRESHOLD_KEY: &str = "PLANNER_EXCEPTIONS_CRITICAL_THRESHOLD";
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 90.0;

/// When a task surfaces as an exception regardless of score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExceptionsConfig {
    /// Treat high stored priority as an exception on its own
    #[serde(default, alias = "includeCritical")]
    pub include_critical: bool,
    /// Stored priority at or above which a task is critical (0-100)
    #[serde(default = "default_critical_threshold", alias = "criticalThreshold")]
    pub critical_threshold: f64,
}

fn default_critical_threshold() -> f64 {
    DEFAULT_CRITICAL_THRESHOLD
}

impl Default for ExceptionsConfig {
    fn default() -> Self {
        Self {
            include_critical: false,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

impl ExceptionsConfig {
    /// Threshold made finite and clamped into 0-100
    pub fn normalized(self) -> Self {
        Self {
            include_critical: self.include_critical,
            critical_threshold: normalize_threshold(self.critical_threshold),
        }
    }
}

fn normalize_threshold(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        DEFAULT_CRITICAL_THRESHOLD
    }
}

/// Configuration read by the planner scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub exceptions: ExceptionsConfig,
}

impl PlannerConfig {
    /// Resolve from key/value lookups, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::overlay_lookup(ExceptionsConfig::default(), lookup)
    }

    /// Resolve from key/value lookups on top of `base`. A key that is
    /// missing or unreadable keeps the value from `base`.
    pub fn overlay_lookup<F>(base: ExceptionsConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = base.normalized();

        let include_critical = lookup(INCLUDE_CRITICAL_KEY)
            .and_then(|raw| {
                let parsed = parse_flag(&raw);
                if parsed.is_none() {
                    tracing::warn!(key = INCLUDE_CRITICAL_KEY, value = %raw, "unreadable flag, using default");
                }
                parsed
            })
            .unwrap_or(base.include_critical);

        let critical_threshold = lookup(CRITICAL_THRESHOLD_KEY)
            .and_then(|raw| {
                let parsed = parse_number(&raw);
                if parsed.is_none() {
                    tracing::warn!(key = CRITICAL_THRESHOLD_KEY, value = %raw, "unreadable threshold, using default");
                }
                parsed
            })
            .map(normalize_threshold)
            .unwrap_or(base.critical_threshold);

        Self {
            exceptions: ExceptionsConfig {
                include_critical,
                critical_threshold,
            },
        }
    }

    /// Resolve from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl From<ExceptionsConfig> for PlannerConfig {
    fn from(exceptions: ExceptionsConfig) -> Self {
        Self {
            exceptions: exceptions.normalized(),
        }
    }
}
