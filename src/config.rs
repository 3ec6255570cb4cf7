//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::query::{DEFAULT_FALLBACK_ZONE, TIMESTAMP_FIELD};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied while composing queries
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Field used by range filters and date histograms
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,

    /// Zone used when `TZ` and the platform name none
    #[serde(default = "default_fallback_time_zone")]
    pub fallback_time_zone: String,

    /// Bucket cap for terms aggregations
    #[serde(default = "default_terms_size")]
    pub terms_size: usize,
}

fn default_timestamp_field() -> String {
    TIMESTAMP_FIELD.to_string()
}

fn default_fallback_time_zone() -> String {
    DEFAULT_FALLBACK_ZONE.to_string()
}

fn default_terms_size() -> usize {
    100
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timestamp_field: default_timestamp_field(),
            fallback_time_zone: default_fallback_time_zone(),
            terms_size: default_terms_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First existing config file among the default locations
    pub fn find_default() -> Option<PathBuf> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("esdsl").join("config.toml")),
            Some(PathBuf::from("/etc/esdsl/config.toml")),
            Some(PathBuf::from("./esdsl.toml")),
        ];

        config_paths.into_iter().flatten().find(|path| path.exists())
    }

    /// Load the given file, else the first default location, else the
    /// environment alone. A file that exists but fails to load is an error.
    pub fn load_default(path: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match path.map(Path::to_path_buf).or_else(Self::find_default) {
            Some(path) => Ok((Self::load_with_env(&path)?, Some(path))),
            None => Ok((Self::from_env(), None)),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Query overrides
        if let Some(field) = lookup("ESDSL_TIMESTAMP_FIELD") {
            self.query.timestamp_field = field;
        }
        if let Some(zone) = lookup("ESDSL_FALLBACK_TIME_ZONE") {
            self.query.fallback_time_zone = zone;
        }
        if let Some(size) = lookup("ESDSL_TERMS_SIZE") {
            if let Ok(n) = size.parse() {
                self.query.terms_size = n;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("ESDSL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("ESDSL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# esdsl Configuration
#
# Environment variables override these settings:
# - ESDSL_TIMESTAMP_FIELD
# - ESDSL_FALLBACK_TIME_ZONE
# - ESDSL_TERMS_SIZE
# - ESDSL_LOG_LEVEL
# - ESDSL_LOG_FORMAT

[query]
# Field targeted by range filters and date histograms
timestamp_field = "timestamp"

# Zone used when TZ is unset and the platform names none
fallback_time_zone = "UTC"

# Bucket cap for terms aggregations
terms_size = 100

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
