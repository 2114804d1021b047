//! Turnover Pivot
//!
//! This module turns the employee-level spreadsheet into the aggregated
//! table every view is derived from:
//!
//! - **types**: Core data structures (Dimension, Metric, RawRecord)
//! - **loader**: Excel/ODS/CSV reading and header resolution
//! - **aggregate**: Group-by and mean per (org, dept, position, sex)
//! - **error**: Error types
//!
//! # Pipeline
//!
//! ```text
//!   Spreadsheet → SpreadsheetLoader → RawTable → PivotTable::aggregate → PivotTable
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use turnover_dashboard::pivot::{Dimension, PivotTable, SpreadsheetLoader};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let raw = SpreadsheetLoader::new().load(Path::new("turnover.xlsx"))?;
//!     let table = PivotTable::aggregate(&raw);
//!
//!     for value in table.distinct_values(Dimension::DepartmentGroup) {
//!         println!("{}", value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod types;

// Re-export commonly used types
pub use aggregate::{DimensionCount, PivotKey, PivotRow, PivotSummary, PivotTable};
pub use error::{PivotError, PivotResult};
pub use loader::SpreadsheetLoader;
pub use types::{Dimension, Language, Metric, RawRecord, RawTable};

use std::path::Path;

/// Load a spreadsheet and aggregate it in one step
pub fn load_pivot(path: &Path, sheet: Option<String>) -> PivotResult<PivotTable> {
    let raw = SpreadsheetLoader::new().with_sheet(sheet).load(path)?;
    Ok(PivotTable::aggregate(&raw))
}
