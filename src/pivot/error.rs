//! Pivot error types
//!
//! Defines all errors that can occur while loading, aggregating and
//! exporting the turnover table.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the pivot layer
#[derive(Error, Debug)]
pub enum PivotError {
    /// Input spreadsheet does not exist
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    /// File extension is not a supported spreadsheet format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Workbook or CSV could not be read
    #[error("Parse error in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Header row lacks an expected column
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A turnover cell does not hold a number
    #[error("Invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook writing failed
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result type alias for pivot operations
pub type PivotResult<T> = Result<T, PivotError>;
