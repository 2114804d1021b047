//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::pivot::{Dimension, Language};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input spreadsheet configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Worksheet name; the first sheet when unset
    #[serde(default)]
    pub sheet: Option<String>,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("turnover.xlsx")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            sheet: None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_enable_export")]
    pub enable_export: bool,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_enable_export() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_export: default_enable_export(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Dashboard presentation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub default_dimension: Dimension,

    #[serde(default)]
    pub language: Language,
}

fn default_title() -> String {
    "Текучесть кадров".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_dimension: Dimension::default(),
            language: Language::default(),
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

impl LoggingConfig {
    /// Whether logs should be emitted as JSON lines
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("turnover-dashboard").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                return Ok(config);
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.format.to_lowercase().as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "logging.format must be \"pretty\" or \"json\", got {:?}",
                    other
                )))
            }
        }

        if self.data.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data.path must not be empty".to_string()));
        }

        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // Data overrides
        if let Ok(path) = std::env::var("TURNOVER_DATA_PATH") {
            self.data.path = PathBuf::from(path);
        }
        if let Ok(sheet) = std::env::var("TURNOVER_DATA_SHEET") {
            self.data.sheet = Some(sheet);
        }

        // Server overrides
        if let Ok(host) = std::env::var("TURNOVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TURNOVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("TURNOVER_PORT: {:?}", port)))?;
        }

        // Dashboard overrides
        if let Ok(dimension) = std::env::var("TURNOVER_DEFAULT_DIMENSION") {
            self.dashboard.default_dimension = dimension
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("TURNOVER_DEFAULT_DIMENSION: {}", e)))?;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("TURNOVER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TURNOVER_LOG_FORMAT") {
            self.logging.format = format;
        }

        self.validate()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Turnover Dashboard Configuration
#
# Environment variables override these settings:
# - TURNOVER_DATA_PATH
# - TURNOVER_DATA_SHEET
# - TURNOVER_HOST
# - TURNOVER_PORT
# - TURNOVER_DEFAULT_DIMENSION
# - TURNOVER_LOG_LEVEL
# - TURNOVER_LOG_FORMAT

[data]
# Turnover spreadsheet (.xlsx, .xls, .ods or .csv)
path = "turnover.xlsx"

# Worksheet to read (default: first sheet)
# sheet = "Sheet1"

[server]
# HTTP server host
host = "0.0.0.0"

# HTTP server port
port = 8050

# Allow downloading the pivot table (XLSX or CSV)
enable_export = true

# Request timeout in seconds
request_timeout_secs = 30

[dashboard]
# Page heading
title = "Текучесть кадров"

# Grouping selected when the page opens:
# organization, department_group, position_group, sex
default_dimension = "department_group"

# Column and chart titles: ru or en
language = "ru"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
