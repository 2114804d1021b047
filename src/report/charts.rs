//! Chart Builder
//!
//! Re-slices the pivot by one dimension and produces four Plotly-compatible
//! bar charts, one per turnover metric. Charts are rebuilt on every
//! request and carry no state between calls.
//!
//! # Reduction
//!
//! ```text
//! PivotTable → distinct <dimension> values (first seen)
//!            → per value: mean of the cell means → one bar series per value
//! ```
//!
//! The per-value figure averages the per-(org, dept, position, sex) cell
//! means; it is not weighted by the number of employees in each cell.

use crate::pivot::{Dimension, Language, Metric, PivotTable};
use crate::report::table::format_percent;
use serde::Serialize;

/// Top margin reserved for the chart title
pub const TITLE_MARGIN_TOP: u32 = 50;

/// One bar, encoded as a single-point Plotly trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub text: Vec<String>,
    pub hovertext: Vec<String>,
    pub hoverinfo: String,
    pub textposition: String,
}

impl BarSeries {
    fn new(label: &str, value: Option<f64>) -> Self {
        Self {
            x: vec![label.to_string()],
            y: vec![value],
            kind: "bar".to_string(),
            name: label.to_string(),
            text: vec![format_percent(value)],
            hovertext: vec![label.to_string()],
            hoverinfo: "text".to_string(),
            textposition: "outside".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisLayout {
    pub visible: bool,
    pub showticklabels: bool,
}

impl AxisLayout {
    fn hidden() -> Self {
        Self {
            visible: false,
            showticklabels: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub t: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub xaxis: AxisLayout,
    pub yaxis: AxisLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

/// A complete figure: traces plus layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Metric this chart shows
    #[serde(skip)]
    pub metric: Metric,
    pub data: Vec<BarSeries>,
    pub layout: ChartLayout,
}

impl ChartSpec {
    /// Chart with no series, shown while no dimension is selected
    pub fn empty(metric: Metric, language: Language) -> Self {
        Self {
            metric,
            data: Vec::new(),
            layout: ChartLayout {
                title: metric.display_name(language).to_string(),
                xaxis: AxisLayout::hidden(),
                yaxis: AxisLayout::hidden(),
                margin: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Builds chart specs from a shared, read-only pivot
#[derive(Debug, Clone, Copy)]
pub struct ChartBuilder<'a> {
    table: &'a PivotTable,
    language: Language,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(table: &'a PivotTable, language: Language) -> Self {
        Self { table, language }
    }

    /// Build the four charts in metric order
    pub fn build_charts(&self, selected: Option<Dimension>) -> [ChartSpec; Metric::COUNT] {
        let metrics = *Metric::all();
        metrics.map(|metric| self.build_chart(metric, selected))
    }

    /// Build the chart for one metric
    pub fn build_chart(&self, metric: Metric, selected: Option<Dimension>) -> ChartSpec {
        let Some(dimension) = selected else {
            return ChartSpec::empty(metric, self.language);
        };

        let data = self
            .table
            .distinct_values(dimension)
            .into_iter()
            .map(|value| BarSeries::new(value, self.mean_for(dimension, value, metric)))
            .collect();

        ChartSpec {
            metric,
            data,
            layout: ChartLayout {
                title: metric.display_name(self.language).to_string(),
                xaxis: AxisLayout::hidden(),
                yaxis: AxisLayout::hidden(),
                margin: Some(Margin {
                    t: TITLE_MARGIN_TOP,
                }),
            },
        }
    }

    /// Mean of the cell means of every row where `dimension == value`
    fn mean_for(&self, dimension: Dimension, value: &str, metric: Metric) -> Option<f64> {
        let (sum, count) = self
            .table
            .rows_with(dimension, value)
            .filter_map(|row| row.mean(metric))
            .fold((0.0, 0usize), |(sum, count), mean| (sum + mean, count + 1));

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}
