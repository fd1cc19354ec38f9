//! Filter cardinality and selectivity estimation.
//!
//! Given a predicate and the statistics of its input, [`FilterEstimator`]
//! estimates how many rows survive the filter and how every column's
//! statistic is narrowed.
//!
//! # Example
//!
//! ```
//! use cardo_common::types::DataType;
//! use cardo_core::statistics::{ColumnStatistic, Statistics};
//! use cardo_engine::query::optimizer::FilterEstimator;
//! use cardo_engine::query::predicate::Expression;
//!
//! let stats = Statistics::builder(1000.0)
//!     .with_column(
//!         "a",
//!         ColumnStatistic::builder(1000.0)
//!             .with_ndv(500.0)
//!             .with_range(0.0, 1000.0)
//!             .build(),
//!     )
//!     .build();
//!
//! let a = Expression::column("a", DataType::Int);
//! let out = FilterEstimator::new().estimate(&a.gt(Expression::literal(500)), &stats);
//! assert!((out.row_count() - 500.0).abs() < 1e-6);
//! ```

mod binding;
mod comparison;
mod delta;
mod logical;
mod membership;
mod nulls;

use cardo_common::types::{ColumnKey, Literal};
use cardo_common::utils::error::Result;
use cardo_core::statistics::{ColumnStatistic, SelectivityConfig, Statistics};
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::query::predicate::Expression;

/// Column keys collected while visiting a predicate.
type KeySet = SmallVec<[ColumnKey; 4]>;

fn push_unique(keys: &mut KeySet, key: &ColumnKey) {
    if !keys.contains(key) {
        keys.push(key.clone());
    }
}

/// `rows / total` as a selectivity, zero for an empty input.
fn ratio(rows: f64, total: f64) -> f64 {
    if total > 0.0 && rows.is_finite() {
        (rows / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Result of visiting one predicate node.
#[derive(Debug, Clone)]
struct Estimate {
    /// Snapshot after the filter.
    stats: Statistics,
    /// Keys whose record the predicate narrowed.
    touched: KeySet,
    /// Keys whose predicate fell entirely outside the recorded range.
    emptied: KeySet,
}

impl Estimate {
    /// Every column scaled by `selectivity`, nothing narrowed.
    fn scaled(input: &Statistics, selectivity: f64) -> Self {
        Self {
            stats: input.with_selectivity(selectivity),
            touched: KeySet::new(),
            emptied: KeySet::new(),
        }
    }

    /// Keeps `rows` rows and writes `record` under each of `keys`.
    fn narrowed(input: &Statistics, rows: f64, keys: &[ColumnKey], record: ColumnStatistic) -> Self {
        Self::with_records(input, rows, [(keys, record)])
    }

    /// Keeps `rows` rows and writes each record under its keys.
    fn with_records<'a>(
        input: &Statistics,
        rows: f64,
        records: impl IntoIterator<Item = (&'a [ColumnKey], ColumnStatistic)>,
    ) -> Self {
        let mut stats = input.with_selectivity(ratio(rows, input.row_count()));
        let mut touched = KeySet::new();
        for (keys, record) in records {
            for key in keys {
                stats = stats.with_column(key.clone(), record.clone());
                push_unique(&mut touched, key);
            }
        }
        Self {
            stats,
            touched,
            emptied: KeySet::new(),
        }
    }

    /// No rows: the predicate fell outside the recorded range of `keys`.
    fn emptied(input: &Statistics, keys: &[ColumnKey]) -> Self {
        let mut stats = input.with_selectivity(0.0);
        for key in keys {
            let empty = input.column_or_unknown(key.as_str()).to_empty();
            stats = stats.with_column(key.clone(), empty);
        }
        Self {
            stats,
            touched: keys.iter().cloned().collect(),
            emptied: keys.iter().cloned().collect(),
        }
    }

    fn rows(&self) -> f64 {
        self.stats.row_count()
    }

    fn selectivity(&self, input: &Statistics) -> f64 {
        ratio(self.rows(), input.row_count())
    }
}

/// Estimates the output statistics of filters.
///
/// The estimator is stateless apart from its configuration, so one instance
/// can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct FilterEstimator {
    config: SelectivityConfig,
}

impl FilterEstimator {
    /// Creates an estimator with the default constants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an estimator with custom constants.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if a constant is out of range.
    pub fn with_config(config: SelectivityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SelectivityConfig {
        &self.config
    }

    /// Estimates the statistics of `stats` filtered by `predicate`.
    ///
    /// Never fails: anything that cannot be estimated from data falls back
    /// to the configured default coefficient.
    #[must_use]
    pub fn estimate(&self, predicate: &Expression, stats: &Statistics) -> Statistics {
        let estimate = self.visit(predicate, stats);
        if self.should_fall_back(&estimate, stats) {
            return self.estimate_with_delta(predicate, stats, &estimate.emptied);
        }
        self.finish(estimate, stats)
    }

    /// Estimates several candidate predicates against the same input.
    ///
    /// Results are in input order and identical to calling
    /// [`estimate`](Self::estimate) on each.
    #[must_use]
    pub fn estimate_batch(&self, predicates: &[Expression], stats: &Statistics) -> Vec<Statistics> {
        predicates
            .par_iter()
            .map(|predicate| self.estimate(predicate, stats))
            .collect()
    }

    fn visit(&self, predicate: &Expression, stats: &Statistics) -> Estimate {
        match predicate {
            Expression::Literal(lit) => Estimate::scaled(stats, literal_selectivity(lit)),
            Expression::Column(_) | Expression::Cast { .. } | Expression::Function { .. } => {
                Estimate::scaled(stats, self.config.default_inequality_coefficient)
            }
            Expression::Comparison { op, left, right } => {
                self.estimate_comparison(*op, left, right, stats)
            }
            Expression::InList { expr, values } => self.estimate_in_list(expr, values, stats),
            Expression::IsNull(expr) => self.estimate_is_null(expr, stats),
            Expression::Like { expr, .. } => self.estimate_like(expr, stats),
            Expression::And(children) => self.estimate_and(children, stats),
            Expression::Or(children) => self.estimate_or(children, stats),
            Expression::Not(child) => self.estimate_not(child, stats),
        }
    }

    /// Sanitizes the row count and reconciles every record with it.
    fn finish(&self, estimate: Estimate, input: &Statistics) -> Statistics {
        let rows = self.checked_rows(estimate.rows(), input);
        estimate
            .stats
            .with_row_count(rows)
            .with_delta_row_count(input.delta_row_count())
            .reconciled()
    }

    /// Clamps a row estimate to `[0, input rows]`.
    ///
    /// A non-finite estimate is replaced by the default coefficient.
    fn checked_rows(&self, rows: f64, input: &Statistics) -> f64 {
        let input_rows = input.row_count();
        if rows.is_finite() {
            return rows.clamp(0.0, input_rows);
        }
        tracing::warn!(
            rows,
            input_rows,
            "non-finite row estimate, using default coefficient"
        );
        input_rows * self.config.default_inequality_coefficient
    }
}

/// Selectivity of a constant used as a predicate.
fn literal_selectivity(literal: &Literal) -> f64 {
    match literal {
        Literal::Boolean(true) => 1.0,
        Literal::Null | Literal::Boolean(false) => 0.0,
        other => match other.to_double() {
            Some(v) if v != 0.0 => 1.0,
            _ => 0.0,
        },
    }
}
