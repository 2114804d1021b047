//! Dashboard Routes
//!
//! - GET / - Dashboard page (selector, four charts, table, export link)
//! - GET /api/v1/dimensions - Selector options and default
//! - GET /api/v1/summary - Load and aggregation statistics

use axum::{extract::State, response::Html, Json};
use std::sync::Arc;

use crate::api::dto::{DimensionOption, DimensionsResponse, SummaryResponse};
use crate::api::state::AppState;
use crate::pivot::Dimension;

const INDEX_TEMPLATE: &str = include_str!("../../../static/index.html");

/// GET /
///
/// The page only fetches the JSON endpoints below and renders them.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(INDEX_TEMPLATE.replace("{{title}}", &escape_html(&state.config.title)))
}

/// GET /api/v1/dimensions
pub async fn list_dimensions(State(state): State<Arc<AppState>>) -> Json<DimensionsResponse> {
    let options = Dimension::all()
        .iter()
        .map(|&value| DimensionOption {
            value,
            label: value.display_name(state.config.language).to_string(),
        })
        .collect();

    Json(DimensionsResponse {
        title: state.config.title.clone(),
        default: state.config.default_dimension,
        options,
    })
}

/// GET /api/v1/summary
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        summary: state.table.summary(),
        language: state.config.language,
    })
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Текучесть кадров"), "Текучесть кадров");
        assert_eq!(escape_html("<b>R&D</b>"), "&lt;b&gt;R&amp;D&lt;/b&gt;");
    }

    #[test]
    fn test_template_has_title_slot() {
        assert!(INDEX_TEMPLATE.contains("{{title}}"));
    }

    #[test]
    fn test_template_renders_data_as_text() {
        // Labels like "R&D" must reach the page verbatim, never as markup
        assert!(INDEX_TEMPLATE.contains("textContent"));
        assert!(!INDEX_TEMPLATE.contains("innerHTML"));
    }
}
