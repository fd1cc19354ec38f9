//! Statistics snapshots: a row count plus one record per column.

use cardo_common::types::ColumnKey;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::column::ColumnStatistic;

/// Statistics of a relation as the optimizer sees it at one plan node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatisticsRecord")]
pub struct Statistics {
    row_count: f64,
    delta_row_count: f64,
    columns: HashMap<ColumnKey, ColumnStatistic>,
}

impl Statistics {
    /// Starts building a snapshot of `row_count` rows.
    #[must_use]
    pub fn builder(row_count: f64) -> StatisticsBuilder {
        StatisticsBuilder::new(row_count)
    }

    /// Creates a snapshot from its parts.
    #[must_use]
    pub fn new(
        row_count: f64,
        columns: impl IntoIterator<Item = (ColumnKey, ColumnStatistic)>,
    ) -> Self {
        Self {
            row_count: sanitize_rows(row_count),
            delta_row_count: 0.0,
            columns: columns.into_iter().collect(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> f64 {
        self.row_count
    }

    /// Rows inserted since the statistics were last refreshed.
    #[must_use]
    pub fn delta_row_count(&self) -> f64 {
        self.delta_row_count
    }

    /// Returns the record stored under `key`.
    #[must_use]
    pub fn column(&self, key: &str) -> Option<&ColumnStatistic> {
        self.columns.get(key)
    }

    /// Returns the record stored under `key`, or the unknown record.
    #[must_use]
    pub fn column_or_unknown(&self, key: &str) -> ColumnStatistic {
        self.columns
            .get(key)
            .cloned()
            .unwrap_or_else(ColumnStatistic::unknown)
    }

    /// Iterates over all records.
    pub fn columns(&self) -> impl Iterator<Item = (&ColumnKey, &ColumnStatistic)> {
        self.columns.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Replaces the row count, leaving the records as they are.
    #[must_use]
    pub fn with_row_count(mut self, row_count: f64) -> Self {
        self.row_count = sanitize_rows(row_count);
        self
    }

    /// Replaces the delta row count.
    #[must_use]
    pub fn with_delta_row_count(mut self, delta_row_count: f64) -> Self {
        self.delta_row_count = sanitize_rows(delta_row_count);
        self
    }

    /// Inserts or replaces the record under `key`.
    #[must_use]
    pub fn with_column(mut self, key: impl Into<ColumnKey>, stat: ColumnStatistic) -> Self {
        self.columns.insert(key.into(), stat);
        self
    }

    /// Keeps a `selectivity` fraction of the rows, scaling every record.
    #[must_use]
    pub fn with_selectivity(&self, selectivity: f64) -> Self {
        let selectivity = if selectivity.is_nan() {
            1.0
        } else {
            selectivity.clamp(0.0, 1.0)
        };
        Self {
            row_count: self.row_count * selectivity,
            delta_row_count: self.delta_row_count,
            columns: self
                .columns
                .iter()
                .map(|(key, stat)| (key.clone(), stat.with_row_count_ratio(selectivity)))
                .collect(),
        }
    }

    /// Caps every record at the snapshot row count.
    ///
    /// With zero rows every known record becomes the empty sentinel.
    #[must_use]
    pub fn reconciled(mut self) -> Self {
        self.row_count = sanitize_rows(self.row_count);
        let rows = self.row_count;
        for stat in self.columns.values_mut() {
            *stat = stat.capped(rows);
        }
        self
    }
}

/// Serialized form of [`Statistics`]; row counts are sanitized on the way in.
#[derive(Deserialize)]
struct StatisticsRecord {
    row_count: f64,
    #[serde(default)]
    delta_row_count: f64,
    #[serde(default)]
    columns: HashMap<ColumnKey, ColumnStatistic>,
}

impl From<StatisticsRecord> for Statistics {
    fn from(record: StatisticsRecord) -> Self {
        Statistics::new(record.row_count, record.columns)
            .with_delta_row_count(record.delta_row_count)
    }
}

fn sanitize_rows(rows: f64) -> f64 {
    if rows.is_finite() { rows.max(0.0) } else { 0.0 }
}

/// Builder for [`Statistics`].
#[derive(Debug, Clone)]
pub struct StatisticsBuilder {
    stats: Statistics,
}

impl StatisticsBuilder {
    /// Creates a builder for a snapshot of `row_count` rows.
    #[must_use]
    pub fn new(row_count: f64) -> Self {
        Self {
            stats: Statistics::new(row_count, []),
        }
    }

    /// Sets the delta row count.
    #[must_use]
    pub fn with_delta_row_count(mut self, delta_row_count: f64) -> Self {
        self.stats = self.stats.with_delta_row_count(delta_row_count);
        self
    }

    /// Adds a column record.
    #[must_use]
    pub fn with_column(mut self, key: impl Into<ColumnKey>, stat: ColumnStatistic) -> Self {
        self.stats = self.stats.with_column(key, stat);
        self
    }

    /// Builds the snapshot.
    #[must_use]
    pub fn build(self) -> Statistics {
        self.stats
    }
}
