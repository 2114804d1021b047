//! Turnover Dashboard HTTP API
//!
//! HTTP layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /` - Dashboard page
//! - `GET /api/v1/dimensions` - Grouping selector options
//! - `GET /api/v1/summary` - Aggregation statistics
//!
//! ## Charts
//! - `GET /api/v1/charts?dimension=<key>` - Four bar charts
//!
//! ## Table
//! - `GET /api/v1/table` - Formatted pivot table
//! - `GET /api/v1/table/export?format=xlsx|csv` - Pivot table download
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use turnover_dashboard::api::{serve, ApiConfig, AppState};
//! use turnover_dashboard::pivot::load_pivot;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = load_pivot(Path::new("turnover.xlsx"), None)?;
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(table, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    let api_routes = Router::new()
        .route("/dimensions", get(routes::dashboard::list_dimensions))
        .route("/summary", get(routes::dashboard::summary))
        .route("/charts", get(routes::charts::get_charts))
        .route("/table", get(routes::table::get_table))
        .route("/table/export", get(routes::table::export_table));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::dashboard::index))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Turnover dashboard listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Turnover dashboard shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::{PivotRow, PivotTable};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::util::ServiceExt;

    fn sample_table() -> PivotTable {
        PivotTable::from_rows(vec![
            PivotRow::new(["Acme", "A", "Clerk", "F"], [10.0, 1.0, 2.0, 3.0]),
            PivotRow::new(["Acme", "B", "Clerk", "M"], [5.0, 1.0, 2.0, 3.0]),
            PivotRow::new(["Beta", "A", "Engineer", "F"], [20.0, 3.0, 4.0, 5.0]),
        ])
    }

    fn create_test_app(config: ApiConfig) -> Router {
        build_router(AppState::new(sample_table(), config))
    }

    async fn request(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = request(create_test_app(ApiConfig::default()), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }

        let response = request(create_test_app(ApiConfig::default()), "/health").await;
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["groups"], 3);
    }

    #[tokio::test]
    async fn test_index_page() {
        let config = ApiConfig {
            title: "Staff <Turnover>".to_string(),
            ..ApiConfig::default()
        };
        let response = request(create_test_app(config), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("<h1>Staff &lt;Turnover&gt;</h1>"));
        assert!(!html.contains("{{title}}"));
    }

    #[tokio::test]
    async fn test_dimensions() {
        let response = request(create_test_app(ApiConfig::default()), "/api/v1/dimensions").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["default"], "department_group");
        assert_eq!(body["options"].as_array().map(Vec::len), Some(4));
        assert_eq!(body["options"][3]["value"], "sex");
        assert_eq!(body["options"][3]["label"], "Пол");
    }

    #[tokio::test]
    async fn test_charts_for_dimension() {
        let response = request(
            create_test_app(ApiConfig::default()),
            "/api/v1/charts?dimension=department_group&lang=en",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["dimension"], "department_group");

        let charts = body["charts"].as_array().unwrap();
        assert_eq!(charts.len(), 4);
        assert_eq!(charts[0]["layout"]["title"], "Overall Turnover");
        assert_eq!(charts[0]["data"][0]["x"][0], "A");
        assert_eq!(charts[0]["data"][0]["y"][0], 15.0);
        assert_eq!(charts[0]["data"][0]["text"][0], "15.00%");
        assert_eq!(charts[0]["data"][1]["text"][0], "5.00%");
    }

    #[tokio::test]
    async fn test_charts_without_selection() {
        let response = request(create_test_app(ApiConfig::default()), "/api/v1/charts").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["dimension"].is_null());
        for chart in body["charts"].as_array().unwrap() {
            assert_eq!(chart["data"].as_array().map(Vec::len), Some(0));
            assert_eq!(chart["layout"]["yaxis"]["visible"], false);
        }
        assert_eq!(body["charts"][0]["layout"]["title"], "Общая текучесть");
    }

    #[tokio::test]
    async fn test_charts_unknown_dimension() {
        let response = request(
            create_test_app(ApiConfig::default()),
            "/api/v1/charts?dimension=salary",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_table_route() {
        let response = request(create_test_app(ApiConfig::default()), "/api/v1/table?lang=en").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["headers"][0], "Organization");
        assert_eq!(body["rows"][0][4], "10.00%");
        assert_eq!(body["rows"][2][2], "Engineer");
    }

    fn header_value(response: &Response, name: header::HeaderName) -> String {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_export_defaults_to_xlsx() {
        let response = request(create_test_app(ApiConfig::default()), "/api/v1/table/export").await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            header_value(&response, header::CONTENT_TYPE),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        let disposition = header_value(&response, header::CONTENT_DISPOSITION);
        assert!(disposition.starts_with("attachment; filename=\"turnover_pivot_"));
        assert!(disposition.ends_with(".xlsx\""));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_export_csv() {
        let response = request(
            create_test_app(ApiConfig::default()),
            "/api/v1/table/export?lang=en&format=csv",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_value(&response, header::CONTENT_DISPOSITION).ends_with(".csv\""));

        let csv = body_text(response).await;
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.starts_with("Organization,Department Group"));
    }

    #[tokio::test]
    async fn test_export_disabled() {
        let config = ApiConfig {
            enable_export: false,
            ..ApiConfig::default()
        };
        let response = request(create_test_app(config), "/api/v1/table/export").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_unknown_format() {
        let response = request(
            create_test_app(ApiConfig::default()),
            "/api/v1/table/export?format=pdf",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
