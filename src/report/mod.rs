//! Report builders
//!
//! Views derived from the aggregated [`PivotTable`](crate::pivot::PivotTable):
//!
//! - **table**: formatted table with percent strings, XLSX/CSV export and import
//! - **charts**: four bar charts for a selected grouping dimension

pub mod charts;
pub mod table;

pub use charts::{AxisLayout, BarSeries, ChartBuilder, ChartLayout, ChartSpec, Margin};
pub use table::{column_headers, format_percent, ExportFormat, FormattedTable};
