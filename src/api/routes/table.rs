//! Table Routes
//!
//! - GET /api/v1/table - Formatted pivot table
//! - GET /api/v1/table/export - Pivot table as an XLSX or CSV download

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{ExportParams, TableParams, TableResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::parse_language;
use crate::api::state::AppState;
use crate::report::{ExportFormat, FormattedTable};

/// GET /api/v1/table
///
/// Pivot rows with percent strings, grouping columns first.
pub async fn get_table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TableParams>,
) -> ApiResult<Json<TableResponse>> {
    let language = parse_language(params.lang.as_deref(), state.config.language)?;
    let table = FormattedTable::from_pivot(&state.table, language);

    Ok(Json(TableResponse {
        total: table.len(),
        headers: table.headers,
        rows: table.rows,
    }))
}

/// GET /api/v1/table/export
///
/// Same table as `get_table`, delivered as an attachment.
pub async fn export_table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    if !state.config.enable_export {
        return Err(ApiError::Validation(
            "Export feature is disabled".to_string(),
        ));
    }

    let language = parse_language(params.lang.as_deref(), state.config.language)?;
    let format = match params.format.as_deref().map(str::trim) {
        None | Some("") => ExportFormat::default(),
        Some(f) => f.parse::<ExportFormat>().map_err(ApiError::Validation)?,
    };
    let body = FormattedTable::from_pivot(&state.table, language).to_bytes(format)?;

    let filename = format!(
        "turnover_pivot_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );

    tracing::info!(filename = %filename, rows = state.table.len(), "Exporting pivot table");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}
