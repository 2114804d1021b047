//! Table Exporter
//!
//! Renders the pivot as a display table: grouping columns first, then the
//! four turnover columns as `"12.34%"` strings. The same table is written
//! to and read back from an XLSX workbook or a CSV file with identical
//! headers and row order.

use crate::pivot::{Dimension, Language, Metric, PivotError, PivotResult, PivotTable};
use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Worksheet name of exported workbooks
pub const SHEET_NAME: &str = "Pivot";

/// File format of an exported table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> PivotResult<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse::<ExportFormat>().ok())
            .ok_or_else(|| {
                PivotError::UnsupportedFormat(format!("{} (expected .xlsx or .csv)", path.display()))
            })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Format a percentage with two decimals and a trailing percent sign.
/// Missing means render as an empty cell.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => String::new(),
    }
}

/// Column headers in display order
pub fn column_headers(language: Language) -> Vec<String> {
    Dimension::all()
        .iter()
        .map(|d| d.display_name(language).to_string())
        .chain(
            Metric::all()
                .iter()
                .map(|m| m.display_name(language).to_string()),
        )
        .collect()
}

/// Display-ready pivot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FormattedTable {
    /// Format every pivot row, keeping the pivot's row order
    pub fn from_pivot(table: &PivotTable, language: Language) -> Self {
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                row.key
                    .iter()
                    .cloned()
                    .chain(row.means.iter().map(|mean| format_percent(*mean)))
                    .collect::<Vec<String>>()
            })
            .collect();

        Self {
            headers: column_headers(language),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write as CSV: one header record, then one record per row
    pub fn write_csv<W: Write>(&self, writer: W) -> PivotResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render as a CSV string
    pub fn to_csv_string(&self) -> PivotResult<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| PivotError::Parse {
            source_name: "csv export".to_string(),
            message: e.to_string(),
        })
    }

    /// Render as a workbook with one bold header row. Empty cells stay blank.
    pub fn to_xlsx_bytes(&self) -> PivotResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header.as_str(), &bold)?;
        }
        for (row, values) in self.rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(row as u32 + 1, col as u16, value.as_str())?;
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Render in the given format
    pub fn to_bytes(&self, format: ExportFormat) -> PivotResult<Vec<u8>> {
        match format {
            ExportFormat::Xlsx => self.to_xlsx_bytes(),
            ExportFormat::Csv => {
                let mut buffer = Vec::new();
                self.write_csv(&mut buffer)?;
                Ok(buffer)
            }
        }
    }

    /// Persist to `.xlsx` or `.csv`, chosen by extension.
    /// Failures are returned to the caller as is.
    pub fn export(&self, path: &Path) -> PivotResult<()> {
        let format = ExportFormat::from_path(path)?;
        match format {
            ExportFormat::Xlsx => std::fs::write(path, self.to_xlsx_bytes()?)?,
            ExportFormat::Csv => {
                let file = std::fs::File::create(path)?;
                self.write_csv(std::io::BufWriter::new(file))?;
            }
        }

        tracing::info!(
            path = %path.display(),
            format = format.extension(),
            rows = self.len(),
            "Exported turnover table"
        );
        Ok(())
    }

    /// Read a previously exported table
    pub fn read_csv<R: Read>(reader: R) -> PivotResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect::<Vec<String>>()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }

    /// Read a previously exported table from disk
    pub fn import(path: &Path) -> PivotResult<Self> {
        if !path.exists() {
            return Err(PivotError::FileNotFound(path.to_path_buf()));
        }
        match ExportFormat::from_path(path)? {
            ExportFormat::Xlsx => Self::read_xlsx(path),
            ExportFormat::Csv => Self::read_csv(std::fs::File::open(path)?),
        }
    }

    /// First worksheet of an exported workbook; blank cells read as ""
    fn read_xlsx(path: &Path) -> PivotResult<Self> {
        let parse_error = |message: String| PivotError::Parse {
            source_name: path.display().to_string(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| parse_error(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| parse_error("workbook has no worksheets".to_string()))?
            .map_err(|e| parse_error(e.to_string()))?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());
        let headers = rows.next().unwrap_or_default();
        let width = headers.len();
        let rows = rows
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }
}
