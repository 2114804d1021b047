//! Pivot aggregation
//!
//! Groups raw records by the full (Organization, Department Group,
//! Position Group, Sex) key and averages every turnover rate per group,
//! scaled to percent. The resulting [`PivotTable`] is built once and only
//! read afterwards.
//!
//! Records with an empty grouping cell take no part in any group, and a
//! group with no turnover value at all is dropped.

use super::types::{Dimension, Metric, RawTable};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Values of the four grouping dimensions, indexed by `Dimension::index`
pub type PivotKey = [String; Dimension::COUNT];

/// One aggregated group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    /// Grouping key
    pub key: PivotKey,
    /// Mean turnover per metric in percent; `None` if every value was missing
    pub means: [Option<f64>; Metric::COUNT],
    /// Number of raw records in the group
    pub records: usize,
}

impl PivotRow {
    /// Create a fully populated row
    pub fn new(key: [&str; Dimension::COUNT], means: [f64; Metric::COUNT]) -> Self {
        Self {
            key: key.map(str::to_string),
            means: means.map(Some),
            records: 1,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> &str {
        &self.key[dimension.index()]
    }

    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means[metric.index()]
    }
}

/// Running sums for one group
#[derive(Debug, Default)]
struct Accumulator {
    sums: [f64; Metric::COUNT],
    counts: [usize; Metric::COUNT],
    records: usize,
}

impl Accumulator {
    fn add(&mut self, metrics: &[Option<f64>; Metric::COUNT]) {
        self.records += 1;
        for (i, value) in metrics.iter().enumerate() {
            if let Some(v) = value {
                self.sums[i] += v;
                self.counts[i] += 1;
            }
        }
    }

    /// `None` when no metric has a single value
    fn finish(self, key: PivotKey) -> Option<PivotRow> {
        if self.counts.iter().all(|&count| count == 0) {
            return None;
        }

        let mut means = [None; Metric::COUNT];
        for i in 0..Metric::COUNT {
            if self.counts[i] > 0 {
                means[i] = Some(self.sums[i] / self.counts[i] as f64 * 100.0);
            }
        }

        Some(PivotRow {
            key,
            means,
            records: self.records,
        })
    }
}

/// Key of a record, if every grouping cell is filled
fn complete_key(dimensions: &[Option<String>; Dimension::COUNT]) -> Option<PivotKey> {
    let mut key = PivotKey::default();
    for (slot, value) in key.iter_mut().zip(dimensions) {
        *slot = value.clone()?;
    }
    Some(key)
}

/// Immutable aggregated turnover table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotTable {
    rows: Vec<PivotRow>,
    raw_records: usize,
}

impl PivotTable {
    /// Aggregate raw records into one row per observed key, sorted by key
    pub fn aggregate(raw: &RawTable) -> Self {
        let mut groups: BTreeMap<PivotKey, Accumulator> = BTreeMap::new();
        let mut incomplete = 0usize;

        for record in &raw.records {
            let Some(key) = complete_key(&record.dimensions) else {
                incomplete += 1;
                continue;
            };
            groups.entry(key).or_default().add(&record.metrics);
        }

        let observed = groups.len();
        let rows: Vec<PivotRow> = groups
            .into_iter()
            .filter_map(|(key, acc)| acc.finish(key))
            .collect();

        if incomplete > 0 {
            tracing::warn!(
                records = incomplete,
                "Skipped records with an empty grouping cell"
            );
        }

        tracing::debug!(
            raw_records = raw.len(),
            groups = rows.len(),
            empty_groups = observed - rows.len(),
            "Aggregated turnover pivot"
        );

        Self {
            rows,
            raw_records: raw.len(),
        }
    }

    /// Wrap already aggregated rows, keeping their order
    pub fn from_rows(rows: Vec<PivotRow>) -> Self {
        let raw_records = rows.iter().map(|r| r.records).sum();
        Self { rows, raw_records }
    }

    pub fn rows(&self) -> &[PivotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of raw records the table was built from
    pub fn raw_records(&self) -> usize {
        self.raw_records
    }

    /// Distinct values of a dimension, in first-seen row order
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.dimension(dimension))
            .filter(|value| seen.insert(*value))
            .collect()
    }

    /// Rows whose `dimension` equals `value`
    pub fn rows_with<'a>(
        &'a self,
        dimension: Dimension,
        value: &'a str,
    ) -> impl Iterator<Item = &'a PivotRow> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.dimension(dimension) == value)
    }

    /// Load and grouping statistics
    pub fn summary(&self) -> PivotSummary {
        PivotSummary {
            raw_records: self.raw_records,
            groups: self.rows.len(),
            distinct_values: Dimension::all()
                .iter()
                .map(|&dimension| DimensionCount {
                    dimension,
                    values: self.distinct_values(dimension).len(),
                })
                .collect(),
        }
    }
}

/// Distinct value count of one dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionCount {
    pub dimension: Dimension,
    pub values: usize,
}

/// Summary of an aggregated table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotSummary {
    pub raw_records: usize,
    pub groups: usize,
    pub distinct_values: Vec<DimensionCount>,
}

impl std::fmt::Display for PivotSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} records in {} groups", self.raw_records, self.groups)?;
        for count in &self.distinct_values {
            write!(f, ", {}={}", count.dimension, count.values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::types::RawRecord;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("mean should be present");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_raw() -> RawTable {
        RawTable::new(vec![
            RawRecord::new(["Beta", "Sales", "Clerk", "M"], [0.2, 0.1, 0.1, 0.2]),
            RawRecord::new(["Acme", "Sales", "Clerk", "F"], [0.1, 0.0, 0.05, 0.1]),
            RawRecord::new(["Acme", "Sales", "Clerk", "F"], [0.3, 0.1, 0.15, 0.2]),
            RawRecord::new(["Acme", "IT", "Engineer", "M"], [0.5, 0.2, 0.3, 0.4])
                .without_metric(Metric::ThreeMonth),
        ])
    }

    #[test]
    fn test_one_row_per_observed_key() {
        let table = PivotTable::aggregate(&sample_raw());

        assert_eq!(table.len(), 3);
        assert_eq!(table.raw_records(), 4);

        let acme_sales = &table.rows()[1];
        assert_eq!(acme_sales.dimension(Dimension::Organization), "Acme");
        assert_eq!(acme_sales.dimension(Dimension::DepartmentGroup), "Sales");
        assert_eq!(acme_sales.records, 2);
        assert_close(acme_sales.mean(Metric::Overall), 20.0);
        assert_close(acme_sales.mean(Metric::SixMonth), 10.0);
    }

    #[test]
    fn test_rows_sorted_by_key() {
        let table = PivotTable::aggregate(&sample_raw());
        let orgs_and_depts: Vec<_> = table
            .rows()
            .iter()
            .map(|r| {
                (
                    r.dimension(Dimension::Organization),
                    r.dimension(Dimension::DepartmentGroup),
                )
            })
            .collect();

        assert_eq!(
            orgs_and_depts,
            vec![("Acme", "IT"), ("Acme", "Sales"), ("Beta", "Sales")]
        );
    }

    #[test]
    fn test_missing_rates_are_skipped() {
        let table = PivotTable::aggregate(&sample_raw());
        let it = &table.rows()[0];

        assert_eq!(it.mean(Metric::ThreeMonth), None);
        assert_close(it.mean(Metric::Overall), 50.0);
    }

    #[test]
    fn test_records_with_empty_dimension_are_skipped() {
        let raw = RawTable::new(vec![
            RawRecord::new(["Acme", "Sales", "Clerk", "F"], [0.1; 4]).without(Dimension::Sex),
            RawRecord::new(["Acme", "Sales", "Clerk", "F"], [0.3; 4]),
        ]);
        let table = PivotTable::aggregate(&raw);

        assert_eq!(table.len(), 1);
        assert_eq!(table.raw_records(), 2);
        assert_eq!(table.rows()[0].records, 1);
        assert_close(table.rows()[0].mean(Metric::Overall), 30.0);
    }

    #[test]
    fn test_blank_organization_does_not_reach_other_dimensions() {
        let raw = RawTable::new(vec![
            RawRecord::new(["Acme", "A", "Clerk", "F"], [0.1; 4]),
            RawRecord::new(["Acme", "A", "Clerk", "F"], [0.9; 4]).without(Dimension::Organization),
            RawRecord::new(["Acme", "B", "Clerk", "F"], [0.05; 4]).without(Dimension::Sex),
        ]);
        let table = PivotTable::aggregate(&raw);

        assert_eq!(table.len(), 1);
        assert_eq!(table.distinct_values(Dimension::DepartmentGroup), vec!["A"]);
        assert_close(table.rows()[0].mean(Metric::Overall), 10.0);
    }

    #[test]
    fn test_group_without_any_rate_is_dropped() {
        let raw = RawTable::new(vec![
            RawRecord::new(["Acme", "A", "Clerk", "F"], [0.1; 4]),
            RawRecord::new(["Acme", "Z", "Clerk", "F"], [0.0; 4])
                .without_metric(Metric::Overall)
                .without_metric(Metric::ThreeMonth)
                .without_metric(Metric::SixMonth)
                .without_metric(Metric::TwelveMonth),
        ]);
        let table = PivotTable::aggregate(&raw);

        assert_eq!(table.len(), 1);
        assert_eq!(table.distinct_values(Dimension::DepartmentGroup), vec!["A"]);
        assert_eq!(table.raw_records(), 2);
    }

    #[test]
    fn test_distinct_values_first_seen() {
        let table = PivotTable::from_rows(vec![
            PivotRow::new(["X", "B", "P", "M"], [1.0; 4]),
            PivotRow::new(["X", "A", "P", "M"], [1.0; 4]),
            PivotRow::new(["Y", "B", "P", "F"], [1.0; 4]),
        ]);

        assert_eq!(table.distinct_values(Dimension::DepartmentGroup), vec!["B", "A"]);
        assert_eq!(table.rows_with(Dimension::DepartmentGroup, "B").count(), 2);
    }

    #[test]
    fn test_empty_input() {
        let table = PivotTable::aggregate(&RawTable::default());
        assert!(table.is_empty());
        assert_eq!(table.summary().groups, 0);
    }

    #[test]
    fn test_summary() {
        let summary = PivotTable::aggregate(&sample_raw()).summary();

        assert_eq!(summary.raw_records, 4);
        assert_eq!(summary.groups, 3);
        assert_eq!(summary.distinct_values[0].values, 2);
        assert_eq!(
            summary.to_string(),
            "4 records in 3 groups, organization=2, department_group=2, position_group=2, sex=2"
        );
    }
}
