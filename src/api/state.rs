//! Application State
//!
//! Shared state accessible by all API handlers.
//! The pivot table is built once before the server starts and only read
//! afterwards, so handlers share it through an `Arc` without locking.

use crate::config::Config;
use crate::pivot::{Dimension, Language, PivotTable};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Aggregated turnover table
    pub table: Arc<PivotTable>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState around an aggregated table
    pub fn new(table: PivotTable, config: ApiConfig) -> Self {
        Self {
            table: Arc::new(table),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Enable the table export endpoint
    pub enable_export: bool,
    /// Page heading
    pub title: String,
    /// Grouping selected when the page opens
    pub default_dimension: Dimension,
    /// Language of column headers and chart titles
    pub language: Language,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
            request_timeout_ms: 30_000,
            enable_export: true,
            title: "Текучесть кадров".to_string(),
            default_dimension: Dimension::default(),
            language: Language::default(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Derive the API settings from the application config
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            request_timeout_ms: config.server.request_timeout_secs * 1000,
            enable_export: config.server.enable_export,
            title: config.dashboard.title.clone(),
            default_dimension: config.dashboard.default_dimension,
            language: config.dashboard.language,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.server.port = 9100;
        config.server.request_timeout_secs = 5;
        config.dashboard.default_dimension = Dimension::Sex;

        let api = ApiConfig::from_config(&config);
        assert_eq!(api.addr(), "0.0.0.0:9100");
        assert_eq!(api.request_timeout_ms, 5000);
        assert_eq!(api.default_dimension, Dimension::Sex);
    }
}
