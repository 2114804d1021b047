//! # Turnover Dashboard
//!
//! HR turnover analytics: loads an employee-level turnover spreadsheet,
//! aggregates it into a pivot table and serves four bar charts plus the
//! formatted table over HTTP.
//!
//! ## Modules
//!
//! - [`pivot`]: Spreadsheet loading and aggregation
//! - [`report`]: Formatted table, XLSX/CSV export and chart builder
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turnover_dashboard::pivot::{load_pivot, Dimension, Language};
//! use turnover_dashboard::report::{ChartBuilder, FormattedTable};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load and aggregate once
//!     let table = load_pivot(Path::new("turnover.xlsx"), None)?;
//!
//!     // Four charts grouped by department
//!     let charts = ChartBuilder::new(&table, Language::En)
//!         .build_charts(Some(Dimension::DepartmentGroup));
//!     println!("{} bars per chart", charts[0].data.len());
//!
//!     // Formatted table as a workbook
//!     FormattedTable::from_pivot(&table, Language::En).export(Path::new("pivot.xlsx"))?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod pivot;
pub mod report;

// Re-export top-level types for convenience
pub use pivot::{
    load_pivot, Dimension, Language, Metric, PivotError, PivotResult, PivotRow, PivotSummary,
    PivotTable, RawRecord, RawTable, SpreadsheetLoader,
};

pub use report::{ChartBuilder, ChartSpec, FormattedTable};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, DashboardConfig, DataConfig, LoggingConfig, ServerConfig};
