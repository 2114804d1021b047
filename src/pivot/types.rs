//! Core data types for the turnover pivot
//!
//! This module defines the fundamental types shared by the loader, the
//! aggregator and the report builders:
//! - `Dimension`: one of the four categorical grouping fields
//! - `Metric`: one of the four turnover-rate columns
//! - `Language`: which set of display names to render
//! - `RawRecord` / `RawTable`: employee-level rows as read from the spreadsheet

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language used for column headers and chart titles
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English display names
    En,
    /// Russian display names, as found in the source spreadsheets
    #[default]
    Ru,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ru" | "russian" => Ok(Language::Ru),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// Categorical grouping field
///
/// The declaration order is the key order of the pivot table and the
/// column order of the formatted table.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Organization,
    /// Preselected grouping of the dashboard
    #[default]
    DepartmentGroup,
    PositionGroup,
    Sex,
}

impl Dimension {
    /// Number of grouping dimensions
    pub const COUNT: usize = 4;

    /// All dimensions in key order
    pub fn all() -> &'static [Dimension; Dimension::COUNT] {
        &[
            Dimension::Organization,
            Dimension::DepartmentGroup,
            Dimension::PositionGroup,
            Dimension::Sex,
        ]
    }

    /// Position of this dimension in a pivot key
    pub fn index(self) -> usize {
        match self {
            Dimension::Organization => 0,
            Dimension::DepartmentGroup => 1,
            Dimension::PositionGroup => 2,
            Dimension::Sex => 3,
        }
    }

    /// Stable machine-readable key (used in URLs and config)
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Organization => "organization",
            Dimension::DepartmentGroup => "department_group",
            Dimension::PositionGroup => "position_group",
            Dimension::Sex => "sex",
        }
    }

    /// Human-readable column name
    pub fn display_name(self, language: Language) -> &'static str {
        match (self, language) {
            (Dimension::Organization, Language::En) => "Organization",
            (Dimension::DepartmentGroup, Language::En) => "Department Group",
            (Dimension::PositionGroup, Language::En) => "Position Group",
            (Dimension::Sex, Language::En) => "Sex",
            (Dimension::Organization, Language::Ru) => "Организация",
            (Dimension::DepartmentGroup, Language::Ru) => "Группа подразделений",
            (Dimension::PositionGroup, Language::Ru) => "Группа должностей",
            (Dimension::Sex, Language::Ru) => "Пол",
        }
    }

    /// Whether a spreadsheet header names this dimension
    pub fn matches_header(self, header: &str) -> bool {
        let header = header.trim();
        header == self.key()
            || header.eq_ignore_ascii_case(self.display_name(Language::En))
            || header == self.display_name(Language::Ru)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::all()
            .iter()
            .copied()
            .find(|d| d.matches_header(s))
            .ok_or_else(|| format!("unknown dimension: {}", s.trim()))
    }
}

/// Turnover-rate column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Overall turnover
    Overall,
    /// Turnover within 3 months of hiring
    ThreeMonth,
    /// Turnover within 6 months of hiring
    SixMonth,
    /// Turnover within 12 months of hiring
    TwelveMonth,
}

impl Metric {
    /// Number of turnover metrics
    pub const COUNT: usize = 4;

    /// All metrics in chart and column order
    pub fn all() -> &'static [Metric; Metric::COUNT] {
        &[
            Metric::Overall,
            Metric::ThreeMonth,
            Metric::SixMonth,
            Metric::TwelveMonth,
        ]
    }

    /// Position of this metric in a record's value array
    pub fn index(self) -> usize {
        match self {
            Metric::Overall => 0,
            Metric::ThreeMonth => 1,
            Metric::SixMonth => 2,
            Metric::TwelveMonth => 3,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Metric::Overall => "overall",
            Metric::ThreeMonth => "three_month",
            Metric::SixMonth => "six_month",
            Metric::TwelveMonth => "twelve_month",
        }
    }

    /// Human-readable column name, also used as the chart title
    pub fn display_name(self, language: Language) -> &'static str {
        match (self, language) {
            (Metric::Overall, Language::En) => "Overall Turnover",
            (Metric::ThreeMonth, Language::En) => "3-Month Turnover",
            (Metric::SixMonth, Language::En) => "6-Month Turnover",
            (Metric::TwelveMonth, Language::En) => "12-Month Turnover",
            (Metric::Overall, Language::Ru) => "Общая текучесть",
            (Metric::ThreeMonth, Language::Ru) => "Текучесть 3 месяца",
            (Metric::SixMonth, Language::Ru) => "Текучесть 6 месяца",
            (Metric::TwelveMonth, Language::Ru) => "Текучесть 12 месяца",
        }
    }

    /// Whether a spreadsheet header names this metric
    pub fn matches_header(self, header: &str) -> bool {
        let header = header.trim();
        header == self.key()
            || header.eq_ignore_ascii_case(self.display_name(Language::En))
            || header == self.display_name(Language::Ru)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One employee-level row
///
/// Categorical fields are `None` where the spreadsheet cell was empty,
/// turnover rates are `None` where the observation is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Categorical values indexed by `Dimension::index`
    pub dimensions: [Option<String>; Dimension::COUNT],
    /// Fractional turnover rates indexed by `Metric::index`
    pub metrics: [Option<f64>; Metric::COUNT],
}

impl RawRecord {
    /// Create a record from fully populated fields
    pub fn new(dimensions: [&str; Dimension::COUNT], metrics: [f64; Metric::COUNT]) -> Self {
        Self {
            dimensions: dimensions.map(|d| Some(d.to_string())),
            metrics: metrics.map(Some),
        }
    }

    /// Builder method: clear a categorical field
    pub fn without(mut self, dimension: Dimension) -> Self {
        self.dimensions[dimension.index()] = None;
        self
    }

    /// Builder method: clear a turnover rate
    pub fn without_metric(mut self, metric: Metric) -> Self {
        self.metrics[metric.index()] = None;
        self
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&str> {
        self.dimensions[dimension.index()].as_deref()
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.index()]
    }
}

/// All rows read from one spreadsheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_parsing() {
        assert_eq!("department_group".parse::<Dimension>(), Ok(Dimension::DepartmentGroup));
        assert_eq!("Department Group".parse::<Dimension>(), Ok(Dimension::DepartmentGroup));
        assert_eq!(" Пол ".parse::<Dimension>(), Ok(Dimension::Sex));
        assert_eq!("Организация".parse::<Dimension>(), Ok(Dimension::Organization));
        assert!("salary".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_metric_headers() {
        assert!(Metric::Overall.matches_header("Общая текучесть"));
        assert!(Metric::ThreeMonth.matches_header("3-month turnover"));
        assert!(Metric::TwelveMonth.matches_header("Текучесть 12 месяца"));
        assert!(!Metric::SixMonth.matches_header("Текучесть 3 месяца"));
    }

    #[test]
    fn test_indices_follow_declaration_order() {
        for (i, d) in Dimension::all().iter().enumerate() {
            assert_eq!(d.index(), i);
        }
        for (i, m) in Metric::all().iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn test_default_dimension() {
        assert_eq!(Dimension::default(), Dimension::DepartmentGroup);
    }

    #[test]
    fn test_record_builders() {
        let record = RawRecord::new(["Org", "Sales", "Manager", "F"], [0.1, 0.2, 0.3, 0.4])
            .without(Dimension::Sex)
            .without_metric(Metric::SixMonth);

        assert_eq!(record.dimension(Dimension::Organization), Some("Org"));
        assert_eq!(record.dimension(Dimension::Sex), None);
        assert_eq!(record.metric(Metric::ThreeMonth), Some(0.2));
        assert_eq!(record.metric(Metric::SixMonth), None);
    }

    #[test]
    fn test_dimension_serialization() {
        let json = serde_json::to_string(&Dimension::PositionGroup).unwrap();
        assert_eq!(json, "\"position_group\"");
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::En);
    }
}
