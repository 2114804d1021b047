//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::pivot::{Dimension, Language, PivotSummary};
use crate::report::ChartSpec;

// ============================================
// DIMENSION DTOs
// ============================================

/// One entry of the grouping selector
#[derive(Debug, Serialize)]
pub struct DimensionOption {
    /// Key to pass back as `dimension`
    pub value: Dimension,
    /// Display label
    pub label: String,
}

/// Selector options response
#[derive(Debug, Serialize)]
pub struct DimensionsResponse {
    /// Page heading
    pub title: String,
    /// Preselected dimension
    pub default: Dimension,
    /// All selectable dimensions in key order
    pub options: Vec<DimensionOption>,
}

// ============================================
// CHART DTOs
// ============================================

/// Chart query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ChartsParams {
    /// Dimension key or display name; missing or empty means no selection
    #[serde(default)]
    pub dimension: Option<String>,
    /// Override for chart title language
    #[serde(default)]
    pub lang: Option<String>,
}

/// Chart response: always four charts in metric order
#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    /// Resolved selection, null when nothing is selected
    pub dimension: Option<Dimension>,
    /// Plotly figures
    pub charts: Vec<ChartSpec>,
}

// ============================================
// TABLE DTOs
// ============================================

/// Table query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    /// Header language: en or ru
    #[serde(default)]
    pub lang: Option<String>,
}

/// Export query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// Header language: en or ru
    #[serde(default)]
    pub lang: Option<String>,
    /// File format: xlsx (default) or csv
    #[serde(default)]
    pub format: Option<String>,
}

/// Formatted table response
#[derive(Debug, Serialize)]
pub struct TableResponse {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: usize,
}

// ============================================
// SUMMARY & HEALTH DTOs
// ============================================

/// Aggregation summary response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: PivotSummary,
    pub language: Language,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or degraded
    pub status: String,
    /// Number of aggregated groups being served
    pub groups: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
