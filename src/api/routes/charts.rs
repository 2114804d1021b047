//! Chart Routes
//!
//! - GET /api/v1/charts?dimension=<key> - Four bar charts for a grouping

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ChartsParams, ChartsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::parse_language;
use crate::api::state::AppState;
use crate::pivot::Dimension;
use crate::report::ChartBuilder;

/// GET /api/v1/charts
///
/// Rebuild all four charts for the selected dimension.
/// No dimension (or an empty one) yields four empty charts.
pub async fn get_charts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChartsParams>,
) -> ApiResult<Json<ChartsResponse>> {
    let dimension = parse_dimension(params.dimension.as_deref())?;
    let language = parse_language(params.lang.as_deref(), state.config.language)?;

    let charts = ChartBuilder::new(&state.table, language).build_charts(dimension);

    tracing::debug!(
        dimension = ?dimension,
        bars = charts[0].data.len(),
        "Built turnover charts"
    );

    Ok(Json(ChartsResponse {
        dimension,
        charts: Vec::from(charts),
    }))
}

/// Parse the `dimension` parameter; blank means no selection
fn parse_dimension(param: Option<&str>) -> ApiResult<Option<Dimension>> {
    match param.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<Dimension>().map(Some).map_err(ApiError::Validation),
    }
}
