//! Spreadsheet Loader
//!
//! Reads the employee-level turnover sheet into a [`RawTable`].
//! Excel/ODS workbooks go through `calamine`, CSV files through `csv`.
//! Both paths are normalised into a grid of [`Cell`]s before the header
//! is resolved, so column matching and value parsing are shared.

use super::error::{PivotError, PivotResult};
use super::types::{Dimension, Language, Metric, RawRecord, RawTable};
use calamine::{open_workbook_auto, Data, Reader};
use std::io::Read;
use std::path::Path;

/// Extensions handled by `calamine`
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A single spreadsheet cell, independent of the source format
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    fn from_workbook(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::String(s) => Cell::from_text(s),
            // Excel error cells (#N/A, #DIV/0!) read as missing values
            Data::Error(_) => Cell::Empty,
            other => Cell::from_text(&other.to_string()),
        }
    }

    /// Render as header text
    fn as_header(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
        }
    }

    /// Interpret as a categorical value
    fn as_category(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
        }
    }

    /// Interpret as a fractional rate; `Err` carries the offending text
    fn as_rate(&self) -> Result<Option<f64>, String> {
        match self {
            Cell::Empty => Ok(None),
            Cell::Number(n) => Ok(Some(*n)),
            Cell::Text(s) => s
                .replace(',', ".")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| s.clone()),
        }
    }
}

/// Integral numbers print without a fractional part ("2019", not "2019.0")
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Column positions of every expected field
#[derive(Debug)]
struct ColumnMap {
    dimensions: [usize; Dimension::COUNT],
    metrics: [usize; Metric::COUNT],
}

impl ColumnMap {
    /// Locate every expected column in the header row
    fn resolve(headers: &[String]) -> PivotResult<Self> {
        let mut dimensions = [0; Dimension::COUNT];
        for dim in Dimension::all() {
            dimensions[dim.index()] = find_column(
                headers,
                |h| dim.matches_header(h),
                dim.display_name(Language::En),
            )?;
        }

        let mut metrics = [0; Metric::COUNT];
        for metric in Metric::all() {
            metrics[metric.index()] = find_column(
                headers,
                |h| metric.matches_header(h),
                metric.display_name(Language::En),
            )?;
        }

        Ok(Self {
            dimensions,
            metrics,
        })
    }
}

fn find_column(
    headers: &[String],
    matches: impl Fn(&str) -> bool,
    name: &str,
) -> PivotResult<usize> {
    headers
        .iter()
        .position(|h| matches(h.as_str()))
        .ok_or_else(|| PivotError::MissingColumn(name.to_string()))
}

/// Loader for turnover spreadsheets
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetLoader {
    /// Worksheet to read; the first sheet when unset
    sheet: Option<String>,
}

impl SpreadsheetLoader {
    /// Create a loader that reads the first worksheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a named worksheet instead of the first one
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    /// Load a spreadsheet file, dispatching on its extension
    pub fn load(&self, path: &Path) -> PivotResult<RawTable> {
        if !path.exists() {
            return Err(PivotError::FileNotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let source_name = path.display().to_string();

        let grid = if extension == "csv" {
            let file = std::fs::File::open(path)?;
            read_csv_grid(file, &source_name)?
        } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            self.read_workbook_grid(path, &source_name)?
        } else {
            return Err(PivotError::UnsupportedFormat(format!(
                "{} (expected .csv or one of {})",
                source_name,
                WORKBOOK_EXTENSIONS.join(", ")
            )));
        };

        let table = parse_grid(grid, &source_name)?;
        tracing::info!(
            source = %source_name,
            rows = table.len(),
            "Loaded turnover spreadsheet"
        );
        Ok(table)
    }

    /// Load CSV data from any reader
    pub fn load_csv<R: Read>(&self, reader: R, source_name: &str) -> PivotResult<RawTable> {
        let grid = read_csv_grid(reader, source_name)?;
        parse_grid(grid, source_name)
    }

    /// Load CSV data from a string (useful for testing)
    pub fn load_csv_str(&self, csv_data: &str) -> PivotResult<RawTable> {
        self.load_csv(csv_data.as_bytes(), "<string>")
    }

    fn read_workbook_grid(&self, path: &Path, source_name: &str) -> PivotResult<Vec<Vec<Cell>>> {
        let parse_error = |message: String| PivotError::Parse {
            source_name: source_name.to_string(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| parse_error(e.to_string()))?;

        let range = match &self.sheet {
            Some(name) => workbook
                .worksheet_range(name)
                .map_err(|e| parse_error(format!("sheet {:?}: {}", name, e)))?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| parse_error("workbook has no worksheets".to_string()))?
                .map_err(|e| parse_error(e.to_string()))?,
        };

        tracing::debug!(source = %source_name, size = ?range.get_size(), "Read worksheet range");

        Ok(range
            .rows()
            .map(|row| row.iter().map(Cell::from_workbook).collect::<Vec<Cell>>())
            .collect())
    }
}

/// Read every CSV record, header included, into a cell grid
fn read_csv_grid<R: Read>(reader: R, source_name: &str) -> PivotResult<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut grid = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| PivotError::Parse {
            source_name: source_name.to_string(),
            message: format!("line {}: {}", line + 1, e),
        })?;
        grid.push(record.iter().map(Cell::from_text).collect::<Vec<Cell>>());
    }

    Ok(grid)
}

/// Resolve the header row and convert the remaining rows into records
fn parse_grid(grid: Vec<Vec<Cell>>, source_name: &str) -> PivotResult<RawTable> {
    let mut rows = grid.into_iter();

    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| PivotError::Parse {
            source_name: source_name.to_string(),
            message: "sheet is empty, expected a header row".to_string(),
        })?
        .iter()
        .map(Cell::as_header)
        .collect();

    let columns = ColumnMap::resolve(&headers)?;
    let empty = Cell::Empty;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    // Header is row 1, data starts at row 2
    for (offset, row) in rows.enumerate() {
        let row_number = offset + 2;

        if row.iter().all(|c| *c == Cell::Empty) {
            skipped += 1;
            continue;
        }

        let cell = |idx: usize| row.get(idx).unwrap_or(&empty);

        let dimensions = columns.dimensions.map(|idx| cell(idx).as_category());

        let mut metrics = [None; Metric::COUNT];
        for metric in Metric::all() {
            let idx = columns.metrics[metric.index()];
            metrics[metric.index()] =
                cell(idx)
                    .as_rate()
                    .map_err(|value| PivotError::InvalidValue {
                        row: row_number,
                        column: headers[idx].clone(),
                        value,
                    })?;
        }

        records.push(RawRecord {
            dimensions,
            metrics,
        });
    }

    if skipped > 0 {
        tracing::debug!(source = %source_name, skipped, "Skipped blank rows");
    }

    Ok(RawTable::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ENGLISH_CSV: &str = "\
Organization,Department Group,Position Group,Sex,Overall Turnover,3-Month Turnover,6-Month Turnover,12-Month Turnover
Acme,Sales,Manager,F,0.10,0.02,0.05,0.08
Acme,Sales,Clerk,M,0.20,0.04,0.10,0.15
Acme,Support,Clerk,,0.30,,0.12,0.25";

    #[test]
    fn test_load_english_headers() {
        let table = SpreadsheetLoader::new().load_csv_str(ENGLISH_CSV).unwrap();

        assert_eq!(table.len(), 3);
        let first = &table.records[0];
        assert_eq!(first.dimension(Dimension::Organization), Some("Acme"));
        assert_eq!(first.dimension(Dimension::PositionGroup), Some("Manager"));
        assert_eq!(first.metric(Metric::Overall), Some(0.10));

        let third = &table.records[2];
        assert_eq!(third.dimension(Dimension::Sex), None);
        assert_eq!(third.metric(Metric::ThreeMonth), None);
        assert_eq!(third.metric(Metric::TwelveMonth), Some(0.25));
    }

    #[test]
    fn test_load_localized_headers_in_any_order() {
        let csv_data = "\
Пол,Организация,Табельный номер,Группа должностей,Группа подразделений,Текучесть 12 месяца,Текучесть 6 месяца,Текучесть 3 месяца,Общая текучесть
Ж,ООО Ромашка,1001,Специалисты,Продажи,\"0,5\",0.4,0.3,0.2";

        let table = SpreadsheetLoader::new().load_csv_str(csv_data).unwrap();

        assert_eq!(table.len(), 1);
        let record = &table.records[0];
        assert_eq!(record.dimension(Dimension::Sex), Some("Ж"));
        assert_eq!(record.dimension(Dimension::DepartmentGroup), Some("Продажи"));
        assert_eq!(record.metric(Metric::TwelveMonth), Some(0.5));
        assert_eq!(record.metric(Metric::Overall), Some(0.2));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv_data = "Organization,Department Group,Position Group,Overall Turnover,3-Month Turnover,6-Month Turnover,12-Month Turnover
Acme,Sales,Manager,0.1,0.1,0.1,0.1";

        let err = SpreadsheetLoader::new().load_csv_str(csv_data).unwrap_err();
        assert!(matches!(err, PivotError::MissingColumn(ref c) if c == "Sex"));
    }

    #[test]
    fn test_non_numeric_rate_is_fatal() {
        let csv_data = "\
Organization,Department Group,Position Group,Sex,Overall Turnover,3-Month Turnover,6-Month Turnover,12-Month Turnover
Acme,Sales,Manager,F,0.1,0.1,0.1,0.1
Acme,Sales,Manager,F,high,0.1,0.1,0.1";

        let err = SpreadsheetLoader::new().load_csv_str(csv_data).unwrap_err();
        match err {
            PivotError::InvalidValue { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "Overall Turnover");
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = SpreadsheetLoader::new().load_csv_str("").unwrap_err();
        assert!(matches!(err, PivotError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turnover.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(ENGLISH_CSV.as_bytes()).unwrap();

        let table = SpreadsheetLoader::new().load(&path).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xlsx");

        let err = SpreadsheetLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, PivotError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turnover.txt");
        std::fs::write(&path, ENGLISH_CSV).unwrap();

        let err = SpreadsheetLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, PivotError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_corrupt_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turnover.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = SpreadsheetLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, PivotError::Parse { .. }));
    }

    #[test]
    fn test_number_cells() {
        assert_eq!(Cell::Number(2019.0).as_category(), Some("2019".to_string()));
        assert_eq!(Cell::Number(1.5).as_category(), Some("1.5".to_string()));
        assert_eq!(Cell::from_text("  "), Cell::Empty);
        assert_eq!(Cell::Text("0,25".into()).as_rate(), Ok(Some(0.25)));
        assert_eq!(Cell::from_workbook(&Data::Int(3)), Cell::Number(3.0));
    }
}
