//! Application configuration.
//!
//! Layered load: built-in defaults, then optional config files, then
//! `STREAK_*` environment variables.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database settings
    pub database: DatabaseConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Import loop settings
    pub import: ImportConfig,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Filesystem path of the SQLite database
    pub path: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace/debug/info/warn/error)
    pub level: String,
    /// Optional log file path; daily-rolling JSON output when set
    pub file_path: Option<String>,
    /// Console format: "text" or "json"
    pub format: String,
}

/// Import loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Word that terminates batch import mode
    pub sentinel: String,
    /// Upper bound on accepted message length, in characters
    pub max_message_len: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/streaks.db".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            format: "text".to_string(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sentinel: "done".to_string(),
            max_message_len: 10_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment with precedence.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("STREAK").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {e}"))?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(anyhow::anyhow!("database.path must not be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        if self.import.sentinel.trim().is_empty() {
            return Err(anyhow::anyhow!("import.sentinel must not be empty"));
        }

        if self.import.max_message_len == 0 {
            return Err(anyhow::anyhow!("import.max_message_len must be greater than 0"));
        }

        Ok(())
    }

    /// Get database path from environment or config
    #[must_use]
    pub fn database_path(&self) -> String {
        std::env::var("STREAK_DATABASE_PATH").unwrap_or_else(|_| self.database.path.clone())
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
