//! API Routes
//!
//! Route handlers organized by functionality.

pub mod charts;
pub mod dashboard;
pub mod health;
pub mod table;

use crate::api::error::{ApiError, ApiResult};
use crate::pivot::Language;

/// Resolve an optional `lang` query parameter against the configured default
pub(crate) fn parse_language(param: Option<&str>, default: Language) -> ApiResult<Language> {
    match param.map(str::trim) {
        None | Some("") => Ok(default),
        Some(lang) => lang.parse::<Language>().map_err(ApiError::Validation),
    }
}
