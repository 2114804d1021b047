//! Turnover Dashboard Server
//!
//! Run with: cargo run --bin turnover-dashboard [-- path/to/config.toml]
//!
//! Loads the turnover spreadsheet once, aggregates it and serves the
//! dashboard. A missing or malformed spreadsheet stops startup before the
//! listener binds.
//!
//! # Configuration
//!
//! See `turnover-cli config` for the file format. Environment variables:
//! - `TURNOVER_DATA_PATH`: Spreadsheet path (default: turnover.xlsx)
//! - `TURNOVER_HOST` / `TURNOVER_PORT`: Bind address (default: 0.0.0.0:8050)
//! - `TURNOVER_DEFAULT_DIMENSION`: Preselected grouping
//! - `RUST_LOG`: Log filter (overrides the configured level)

use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnover_dashboard::api::{serve, ApiConfig, AppState};
use turnover_dashboard::config::{Config, LoggingConfig};
use turnover_dashboard::pivot::load_pivot;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Config::load_with_env(&path)?,
        None => Config::load_default()?,
    };

    init_tracing(&config.logging);

    tracing::info!("Turnover dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data file: {:?}", config.data.path);

    let table = load_pivot(&config.data.path, config.data.sheet.clone())?;
    let summary = table.summary();
    tracing::info!("Pivot ready: {}", summary);

    if table.is_empty() {
        tracing::warn!("Spreadsheet has no data rows, charts will be empty");
    }

    let api_config = ApiConfig::from_config(&config);
    tracing::info!(
        default_dimension = %api_config.default_dimension,
        export_enabled = api_config.enable_export,
        "Starting server on {}",
        api_config.addr()
    );

    let state = AppState::new(table, api_config.clone());
    serve(state, &api_config).await?;

    tracing::info!("Turnover dashboard stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("turnover_dashboard={},tower_http=info", logging.level).into()
    });

    if logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
