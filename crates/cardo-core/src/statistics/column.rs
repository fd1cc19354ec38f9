//! Per-column statistic records.
//!
//! A [`ColumnStatistic`] is a frozen value: every transformation returns a
//! new record and the only way to assemble one field by field is the
//! consuming [`ColumnStatisticBuilder`].

use std::sync::Arc;

use cardo_common::types::Literal;
use cardo_common::utils::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::range::ValueRange;

/// Statistical summary of one column or derived expression.
///
/// Ranges use the numeric encoding of [`Literal::to_double`]. An absent
/// bound is an infinity, and the empty range is `min = max = +inf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistic {
    count: f64,
    ndv: f64,
    num_nulls: f64,
    avg_size_byte: f64,
    min_value: f64,
    max_value: f64,
    min_expr: Option<Literal>,
    max_expr: Option<Literal>,
    is_unknown: bool,
    original: Option<Arc<ColumnStatistic>>,
}

impl ColumnStatistic {
    /// Starts building a record summarizing `count` rows.
    #[must_use]
    pub fn builder(count: f64) -> ColumnStatisticBuilder {
        ColumnStatisticBuilder::new(count)
    }

    /// The canonical record for a column without statistics.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            count: 0.0,
            ndv: 0.0,
            num_nulls: 0.0,
            avg_size_byte: 0.0,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
            min_expr: None,
            max_expr: None,
            is_unknown: true,
            original: None,
        }
    }

    /// The empty-range sentinel: no rows, no values.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            count: 0.0,
            ndv: 0.0,
            num_nulls: 0.0,
            avg_size_byte: 0.0,
            min_value: f64::INFINITY,
            max_value: f64::INFINITY,
            min_expr: None,
            max_expr: None,
            is_unknown: false,
            original: None,
        }
    }

    /// Rows summarized by this record.
    #[must_use]
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Estimated number of distinct non-null values.
    #[must_use]
    pub fn ndv(&self) -> f64 {
        self.ndv
    }

    /// Number of null rows.
    #[must_use]
    pub fn num_nulls(&self) -> f64 {
        self.num_nulls
    }

    /// Average value width in bytes.
    #[must_use]
    pub fn avg_size_byte(&self) -> f64 {
        self.avg_size_byte
    }

    /// Encoded lower bound, `-inf` when unbounded.
    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    /// Encoded upper bound, `+inf` when unbounded.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// The literal behind the lower bound, if known.
    #[must_use]
    pub fn min_expr(&self) -> Option<&Literal> {
        self.min_expr.as_ref()
    }

    /// The literal behind the upper bound, if known.
    #[must_use]
    pub fn max_expr(&self) -> Option<&Literal> {
        self.max_expr.as_ref()
    }

    /// Returns true if no real statistic exists for the column.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.is_unknown
    }

    /// The record as it was before a null test emptied or rewrote it.
    #[must_use]
    pub fn original(&self) -> Option<&ColumnStatistic> {
        self.original.as_deref()
    }

    /// Returns true for the empty-range sentinel.
    #[must_use]
    pub fn is_empty_range(&self) -> bool {
        !self.is_unknown && self.value_range().is_empty()
    }

    /// Returns true if both bounds are finite.
    #[must_use]
    pub fn has_finite_range(&self) -> bool {
        self.min_value.is_finite() && self.max_value.is_finite()
    }

    /// Fraction of rows that are null, in `[0, 1]`.
    #[must_use]
    pub fn null_fraction(&self) -> f64 {
        if self.count > 0.0 {
            (self.num_nulls / self.count).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Fraction of rows that are not null, in `[0, 1]`.
    #[must_use]
    pub fn non_null_fraction(&self) -> f64 {
        1.0 - self.null_fraction()
    }

    /// Returns true if every row holds a distinct value.
    #[must_use]
    pub fn is_almost_unique(&self) -> bool {
        self.ndv >= self.count
    }

    /// The record's range and distinct count.
    #[must_use]
    pub fn value_range(&self) -> ValueRange {
        ValueRange::new(self.min_value, self.max_value, self.ndv)
    }

    /// Returns a builder seeded with this record.
    #[must_use]
    pub fn to_builder(&self) -> ColumnStatisticBuilder {
        ColumnStatisticBuilder {
            stat: self.clone(),
        }
    }

    /// Scales the record to a `keep` fraction of its rows.
    ///
    /// Distinct values deplete as `ndv * (1 - (1 - keep)^(count / ndv))`,
    /// the expected number of values still present after sampling rows
    /// uniformly. A primary-key-like record keeps exactly `count * keep`.
    #[must_use]
    pub fn with_row_count_ratio(&self, keep: f64) -> Self {
        if self.is_unknown {
            return self.clone();
        }
        let keep = if keep.is_nan() { 1.0 } else { keep.clamp(0.0, 1.0) };

        let ndv = if self.ndv <= 0.0 {
            0.0
        } else if self.is_almost_unique() {
            self.count * keep
        } else {
            self.ndv * (1.0 - (1.0 - keep).powf(self.count / self.ndv))
        };

        Self {
            count: self.count * keep,
            ndv,
            num_nulls: self.num_nulls * keep,
            ..self.clone()
        }
    }

    /// Narrows the range to its intersection with `[min, max]`.
    ///
    /// A disjoint range yields the empty sentinel.
    #[must_use]
    pub fn with_range(&self, min: f64, max: f64) -> Self {
        if self.is_unknown {
            return self.clone();
        }
        let low = self.min_value.max(min);
        let high = self.max_value.min(max);
        if self.is_empty_range() || low > high || low == f64::INFINITY {
            return self.to_empty();
        }
        Self {
            min_value: low,
            max_value: high,
            min_expr: if low == self.min_value {
                self.min_expr.clone()
            } else {
                None
            },
            max_expr: if high == self.max_value {
                self.max_expr.clone()
            } else {
                None
            },
            ..self.clone()
        }
    }

    /// The empty sentinel, keeping the value width.
    #[must_use]
    pub fn to_empty(&self) -> Self {
        Self {
            avg_size_byte: self.avg_size_byte,
            ..Self::empty()
        }
    }

    /// A record where all `rows` rows are null.
    ///
    /// The current record is kept as [`original`](Self::original).
    #[must_use]
    pub fn to_all_null(&self, rows: f64) -> Self {
        Self {
            count: rows,
            num_nulls: rows,
            avg_size_byte: self.avg_size_byte,
            original: Some(Arc::new(self.without_original())),
            ..Self::empty()
        }
    }

    /// The same record with [`original`](Self::original) cleared.
    #[must_use]
    pub fn without_original(&self) -> Self {
        Self {
            original: None,
            ..self.clone()
        }
    }

    /// Applies a second narrowing of the same column.
    ///
    /// The range is intersected and the smaller count, ndv and null count
    /// win.
    #[must_use]
    pub fn narrow_with(&self, other: &ColumnStatistic) -> Self {
        if self.is_unknown {
            return other.clone();
        }
        if other.is_unknown {
            return self.clone();
        }
        let count = self.count.min(other.count);
        let num_nulls = self.num_nulls.min(other.num_nulls);
        let range = self.value_range().intersect(&other.value_range());
        if range.is_empty() {
            return Self {
                count,
                num_nulls,
                ..self.to_empty()
            };
        }

        let (min_value, min_expr) = pick_bound(
            range.low,
            (self.min_value, &self.min_expr),
            (other.min_value, &other.min_expr),
        );
        let (max_value, max_expr) = pick_bound(
            range.high,
            (self.max_value, &self.max_expr),
            (other.max_value, &other.max_expr),
        );

        Self {
            count,
            ndv: self.ndv.min(other.ndv),
            num_nulls,
            avg_size_byte: self.avg_size_byte,
            min_value,
            max_value,
            min_expr,
            max_expr,
            is_unknown: false,
            original: self.original.clone().or_else(|| other.original.clone()),
        }
    }

    /// Combines two alternative outcomes for the same column.
    ///
    /// The ranges are unioned and the larger count, ndv and null count win.
    #[must_use]
    pub fn union_with(&self, other: &ColumnStatistic) -> Self {
        if self.is_unknown {
            return self.clone();
        }
        if other.is_unknown {
            return other.clone();
        }
        let range = self.value_range().union(&other.value_range());
        let (min_value, min_expr) = pick_bound(
            range.low,
            (self.min_value, &self.min_expr),
            (other.min_value, &other.min_expr),
        );
        let (max_value, max_expr) = pick_bound(
            range.high,
            (self.max_value, &self.max_expr),
            (other.max_value, &other.max_expr),
        );

        Self {
            count: self.count.max(other.count),
            ndv: self.ndv.max(other.ndv),
            num_nulls: self.num_nulls.max(other.num_nulls),
            avg_size_byte: self.avg_size_byte.max(other.avg_size_byte),
            min_value,
            max_value,
            min_expr,
            max_expr,
            is_unknown: false,
            original: self.original.clone().or_else(|| other.original.clone()),
        }
    }

    /// Caps the record at `rows` rows.
    ///
    /// With no rows left the record becomes the empty sentinel.
    #[must_use]
    pub fn capped(&self, rows: f64) -> Self {
        if self.is_unknown {
            return self.clone();
        }
        if rows <= 0.0 {
            return self.to_empty();
        }
        let count = self.count.min(rows);
        Self {
            count,
            ndv: self.ndv.min(count),
            num_nulls: self.num_nulls.min(count),
            ..self.clone()
        }
    }
}

fn pick_bound(
    value: f64,
    first: (f64, &Option<Literal>),
    second: (f64, &Option<Literal>),
) -> (f64, Option<Literal>) {
    let expr = if value == first.0 && first.1.is_some() {
        first.1.clone()
    } else if value == second.0 {
        second.1.clone()
    } else {
        None
    };
    (value, expr)
}

/// Builder for [`ColumnStatistic`].
///
/// # Example
///
/// ```
/// use cardo_core::statistics::ColumnStatistic;
///
/// let stat = ColumnStatistic::builder(1000.0)
///     .with_ndv(50.0)
///     .with_nulls(10.0)
///     .with_range(0.0, 100.0)
///     .build();
/// assert_eq!(stat.ndv(), 50.0);
/// ```
#[derive(Debug, Clone)]
pub struct ColumnStatisticBuilder {
    stat: ColumnStatistic,
}

impl ColumnStatisticBuilder {
    /// Creates a builder for a record of `count` rows with no bounds.
    #[must_use]
    pub fn new(count: f64) -> Self {
        Self {
            stat: ColumnStatistic {
                count,
                is_unknown: false,
                ..ColumnStatistic::unknown()
            },
        }
    }

    /// Sets the row count.
    #[must_use]
    pub fn with_count(mut self, count: f64) -> Self {
        self.stat.count = count;
        self
    }

    /// Sets the distinct count.
    #[must_use]
    pub fn with_ndv(mut self, ndv: f64) -> Self {
        self.stat.ndv = ndv;
        self
    }

    /// Sets the null count.
    #[must_use]
    pub fn with_nulls(mut self, num_nulls: f64) -> Self {
        self.stat.num_nulls = num_nulls;
        self
    }

    /// Sets the average value width.
    #[must_use]
    pub fn with_avg_size_byte(mut self, avg_size_byte: f64) -> Self {
        self.stat.avg_size_byte = avg_size_byte;
        self
    }

    /// Sets the encoded min/max range and clears the bound literals.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.stat.min_value = min;
        self.stat.max_value = max;
        self.stat.min_expr = None;
        self.stat.max_expr = None;
        self
    }

    /// Sets the lower bound from a literal.
    ///
    /// A literal without a numeric encoding leaves the bound open.
    #[must_use]
    pub fn with_min_literal(mut self, literal: Literal) -> Self {
        self.stat.min_value = literal.to_double().unwrap_or(f64::NEG_INFINITY);
        self.stat.min_expr = Some(literal);
        self
    }

    /// Sets the upper bound from a literal.
    #[must_use]
    pub fn with_max_literal(mut self, literal: Literal) -> Self {
        self.stat.max_value = literal.to_double().unwrap_or(f64::INFINITY);
        self.stat.max_expr = Some(literal);
        self
    }

    /// Sets the literal shown for the lower bound without changing it.
    #[must_use]
    pub fn with_min_expr(mut self, literal: Option<Literal>) -> Self {
        self.stat.min_expr = literal;
        self
    }

    /// Sets the literal shown for the upper bound without changing it.
    #[must_use]
    pub fn with_max_expr(mut self, literal: Option<Literal>) -> Self {
        self.stat.max_expr = literal;
        self
    }

    /// Marks the record unknown.
    #[must_use]
    pub fn with_unknown(mut self, unknown: bool) -> Self {
        self.stat.is_unknown = unknown;
        self
    }

    /// Sets the pre-filter record.
    #[must_use]
    pub fn with_original(mut self, original: Option<Arc<ColumnStatistic>>) -> Self {
        self.stat.original = original;
        self
    }

    /// Builds the record, repairing invariant violations.
    ///
    /// Negative counts become zero, ndv and nulls are capped at the row
    /// count, an inverted range becomes the empty sentinel, and a NaN or
    /// infinite count makes the record unknown.
    #[must_use]
    pub fn build(self) -> ColumnStatistic {
        let mut stat = self.stat;
        if stat.is_unknown
            || !stat.count.is_finite()
            || !stat.ndv.is_finite()
            || !stat.num_nulls.is_finite()
        {
            return ColumnStatistic {
                avg_size_byte: sanitize_size(stat.avg_size_byte),
                ..ColumnStatistic::unknown()
            };
        }

        stat.count = stat.count.max(0.0);
        stat.ndv = stat.ndv.clamp(0.0, stat.count);
        stat.num_nulls = stat.num_nulls.clamp(0.0, stat.count);
        stat.avg_size_byte = sanitize_size(stat.avg_size_byte);
        if stat.min_value.is_nan() {
            stat.min_value = f64::NEG_INFINITY;
            stat.min_expr = None;
        }
        if stat.max_value.is_nan() {
            stat.max_value = f64::INFINITY;
            stat.max_expr = None;
        }
        if stat.value_range().is_empty() {
            stat.min_value = f64::INFINITY;
            stat.max_value = f64::INFINITY;
            stat.min_expr = None;
            stat.max_expr = None;
            stat.ndv = 0.0;
        }
        stat
    }

    /// Builds the record, rejecting invariant violations.
    pub fn try_build(self) -> Result<ColumnStatistic> {
        let s = &self.stat;
        if !s.is_unknown {
            if !(s.count.is_finite() && s.count >= 0.0) {
                return Err(Error::InvalidStatistic(format!(
                    "row count must be a non-negative number, got {}",
                    s.count
                )));
            }
            if !(s.ndv.is_finite() && (0.0..=s.count).contains(&s.ndv)) {
                return Err(Error::InvalidStatistic(format!(
                    "ndv {} outside [0, {}]",
                    s.ndv, s.count
                )));
            }
            if !(s.num_nulls.is_finite() && (0.0..=s.count).contains(&s.num_nulls)) {
                return Err(Error::InvalidStatistic(format!(
                    "null count {} outside [0, {}]",
                    s.num_nulls, s.count
                )));
            }
            if s.min_value.is_nan() || s.max_value.is_nan() {
                return Err(Error::InvalidStatistic("range bound is NaN".to_string()));
            }
            let sentinel = s.min_value == f64::INFINITY && s.max_value == f64::INFINITY;
            if s.min_value > s.max_value && !sentinel {
                return Err(Error::InvalidStatistic(format!(
                    "min {} is greater than max {}",
                    s.min_value, s.max_value
                )));
            }
        }
        Ok(self.build())
    }
}

fn sanitize_size(size: f64) -> f64 {
    if size.is_finite() { size.max(0.0) } else { 0.0 }
}
