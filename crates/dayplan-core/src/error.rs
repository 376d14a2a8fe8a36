//! Core error types for dayplan-core.
//!
//! The planning algorithms are total over well-typed input. The only hard
//! failure they raise is [`ValidationError::InvalidRange`]; everything else
//! here belongs to the configuration boundary.

use thiserror::Error;

/// Core error type for dayplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Why a requested calendar range was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeProblem {
    /// Start date is not a `YYYY-MM-DD` calendar date
    UnparsableStart,
    /// End date is not a `YYYY-MM-DD` calendar date
    UnparsableEnd,
    /// End date precedes start date
    EndBeforeStart,
}

impl std::fmt::Display for RangeProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RangeProblem::UnparsableStart => "start date is not a calendar date",
            RangeProblem::UnparsableEnd => "end date is not a calendar date",
            RangeProblem::EndBeforeStart => "end date precedes start date",
        };
        f.write_str(text)
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Requested date range cannot be turned into day windows
    #[error("Invalid range {start}..={end}: {problem}")]
    InvalidRange {
        start: String,
        end: String,
        problem: RangeProblem,
    },
}

impl ValidationError {
    pub(crate) fn invalid_range(start: &str, end: &str, problem: RangeProblem) -> Self {
        ValidationError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
            problem,
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
