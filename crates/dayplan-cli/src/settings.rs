//! Config file discovery and environment overlay.

use std::path::{Path, PathBuf};

use dayplan_core::error::ConfigError;
use dayplan_core::{Config, PlannerConfig};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "DAYPLAN_CONFIG";

/// `~/.config/dayplan/config.toml`
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("dayplan")
        .join("config.toml")
}

/// Load the config, then apply `PLANNER_EXCEPTIONS_*` from the environment.
///
/// An explicit path (flag or `DAYPLAN_CONFIG`) must be readable. A missing
/// file at the default location means defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => load_from(&path)?,
        None => load_or_default(&default_path())?,
    };

    config.exceptions = PlannerConfig::overlay_lookup(config.exceptions, |key| std::env::var(key).ok()).exceptions;
    Ok(config)
}

fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidValue {
        key: "config".to_string(),
        message: format!("cannot read {}: {e}", path.display()),
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Config::from_toml_str(&content)
}

fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_from(path)
    } else {
        Ok(Config::default())
    }
}
