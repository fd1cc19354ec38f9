//! Comparisons, equality and LIKE.

use cardo_common::types::{DataType, Literal};
use cardo_core::statistics::{
    ColumnStatistic, Coverage, Interval, RangeOp, Statistics, ValueRange, equality_selectivity,
    intersect_range, interval_coverage,
};

use super::binding::{BoundValue, ColumnBinding, bind_column, bind_value};
use super::{Estimate, FilterEstimator};
use crate::query::predicate::{ComparisonOp, Expression};

/// The literals behind the ends of an [`Interval`], used as bound
/// expressions of the narrowed record.
#[derive(Debug, Clone)]
pub(super) struct IntervalLiterals {
    pub(super) low: Option<Literal>,
    pub(super) high: Option<Literal>,
}

impl IntervalLiterals {
    /// The literal of `column op literal` placed at the end it bounds.
    pub(super) fn for_op(op: RangeOp, literal: Literal) -> Self {
        match op {
            RangeOp::Gt | RangeOp::Ge => Self {
                low: Some(literal),
                high: None,
            },
            RangeOp::Lt | RangeOp::Le => Self {
                low: None,
                high: Some(literal),
            },
        }
    }
}

/// The date encoding of a date literal or a `YYYY-MM-DD` string.
fn date_encoding(literal: &Literal) -> Option<f64> {
    match literal {
        Literal::Date(_) | Literal::DateTime(_) => literal.to_double(),
        Literal::String(text) => Literal::parse_date(text).ok()?.to_double(),
        _ => None,
    }
}

/// Distinct values left after keeping `fraction` of a range.
fn scaled_ndv(ndv: f64, fraction: f64) -> f64 {
    let scaled = ndv * fraction;
    if fraction > 0.0 && ndv >= 1.0 {
        scaled.max(1.0)
    } else {
        scaled
    }
}

/// The type both sides of a constant comparison are encoded as.
fn common_type(left: Option<DataType>, right: Option<DataType>) -> Option<DataType> {
    match (left, right) {
        (Some(l), _) if !l.is_string_like() => Some(l),
        (_, Some(r)) if !r.is_string_like() => Some(r),
        (l, r) => l.or(r),
    }
}

/// A record holding the single value `value`.
fn point_record(
    stat: &ColumnStatistic,
    value: f64,
    literal: Option<Literal>,
    rows: f64,
) -> ColumnStatistic {
    stat.to_builder()
        .with_count(rows)
        .with_ndv(1.0)
        .with_nulls(0.0)
        .with_range(value, value)
        .with_min_expr(literal.clone())
        .with_max_expr(literal)
        .build()
}

impl FilterEstimator {
    pub(super) fn estimate_comparison(
        &self,
        op: ComparisonOp,
        left: &Expression,
        right: &Expression,
        stats: &Statistics,
    ) -> Estimate {
        let is_null = |e: &Expression| matches!(e, Expression::Literal(Literal::Null));
        if op != ComparisonOp::NullSafeEq && (is_null(left) || is_null(right)) {
            return Estimate::scaled(stats, 0.0);
        }

        match (left.is_constant(), right.is_constant()) {
            (true, true) => self.fold_comparison(op, left, right, stats),
            (true, false) => self.estimate_comparison(op.flip(), right, left, stats),
            (false, true) => self.column_vs_value(op, left, right, stats),
            (false, false) => self.column_vs_column(op, left, right, stats),
        }
    }

    fn fold_comparison(
        &self,
        op: ComparisonOp,
        left: &Expression,
        right: &Expression,
        stats: &Statistics,
    ) -> Estimate {
        let target = common_type(left.data_type(), right.data_type());
        let selectivity = match (bind_value(left, target), bind_value(right, target)) {
            (BoundValue::Null, BoundValue::Null) if op == ComparisonOp::NullSafeEq => 1.0,
            (BoundValue::Null, BoundValue::Known { .. })
            | (BoundValue::Known { .. }, BoundValue::Null) => 0.0,
            (BoundValue::Known { encoded: l, .. }, BoundValue::Known { encoded: r, .. }) => {
                if op.evaluate(l, r) { 1.0 } else { 0.0 }
            }
            _ => self.config.default_inequality_coefficient,
        };
        Estimate::scaled(stats, selectivity)
    }

    fn column_vs_value(
        &self,
        op: ComparisonOp,
        column: &Expression,
        value: &Expression,
        stats: &Statistics,
    ) -> Estimate {
        if op == ComparisonOp::NullSafeEq && matches!(value, Expression::Literal(Literal::Null)) {
            return self.estimate_is_null(column, stats);
        }
        if op == ComparisonOp::NotEq {
            return self.estimate_not_equal(column, value, stats);
        }

        let binding = bind_column(column, stats);
        let value = bind_value(value, binding.data_type);
        if value == BoundValue::Null {
            return Estimate::scaled(stats, 0.0);
        }
        if binding.is_unknown() {
            tracing::trace!(column = %column, "no statistic, using default coefficient");
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }

        match (op.to_range_op(), value) {
            (Some(range_op), BoundValue::Known { literal, encoded }) => self.estimate_interval(
                &binding,
                Interval::from_op(range_op, encoded),
                IntervalLiterals::for_op(range_op, literal),
                stats,
            ),
            (Some(_), _) => Estimate::scaled(stats, self.config.default_inequality_coefficient),
            (None, value) => self.estimate_equality(&binding, value, stats),
        }
    }

    /// Estimates `column` restricted to `interval`.
    pub(super) fn estimate_interval(
        &self,
        binding: &ColumnBinding,
        interval: Interval,
        literals: IntervalLiterals,
        stats: &Statistics,
    ) -> Estimate {
        let stat = &binding.stat;
        if binding.is_unknown() {
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }
        let non_null_rows = stats.row_count() * stat.non_null_fraction();

        match interval_coverage(&stat.value_range(), &interval, binding.scalable(), &self.config) {
            Coverage::Disjoint => Estimate::emptied(stats, &binding.keys),
            Coverage::Boundary { value } => {
                // Just past a recorded bound: assume one row slipped in since.
                let rows = non_null_rows.min(1.0);
                let record = point_record(stat, value, bound_literal(stat, value), rows);
                Estimate::narrowed(stats, rows, &binding.keys, record)
            }
            Coverage::Point { value, fraction } => {
                let rows = self.checked_rows(non_null_rows * fraction, stats);
                let literal = bound_literal(stat, value).or(literals.low).or(literals.high);
                let record = point_record(stat, value, literal, rows);
                Estimate::narrowed(stats, rows, &binding.keys, record)
            }
            Coverage::Partial {
                low,
                high,
                fraction,
            } => {
                let fraction = if fraction < 1.0 && !binding.scalable() {
                    self.date_string_fraction(stat, &interval, &literals)
                        .unwrap_or(fraction)
                } else {
                    fraction
                };
                let rows = self.checked_rows(non_null_rows * fraction, stats);
                let narrowed = stat.with_range(low, high);
                let mut builder = narrowed
                    .to_builder()
                    .with_count(rows)
                    .with_ndv(scaled_ndv(stat.ndv(), fraction))
                    .with_nulls(0.0);
                if narrowed.min_expr().is_none() && low == interval.low {
                    builder = builder.with_min_expr(literals.low);
                }
                if narrowed.max_expr().is_none() && high == interval.high {
                    builder = builder.with_max_expr(literals.high);
                }
                Estimate::narrowed(stats, rows, &binding.keys, builder.build())
            }
        }
    }

    /// Interpolates a string range whose bounds and literals are all dates.
    ///
    /// The narrowed record keeps its string encoding; only the fraction is
    /// taken from the dates.
    fn date_string_fraction(
        &self,
        stat: &ColumnStatistic,
        interval: &Interval,
        literals: &IntervalLiterals,
    ) -> Option<f64> {
        let min = date_encoding(stat.min_expr()?)?;
        let max = date_encoding(stat.max_expr()?)?;
        let end = |literal: &Option<Literal>, open: f64, bound: f64| match literal {
            Some(literal) => date_encoding(literal),
            None if bound == open => Some(open),
            None => None,
        };
        let dates = Interval {
            low: end(&literals.low, f64::NEG_INFINITY, interval.low)?,
            high: end(&literals.high, f64::INFINITY, interval.high)?,
            ..*interval
        };
        match interval_coverage(&ValueRange::new(min, max, stat.ndv()), &dates, true, &self.config) {
            Coverage::Partial { fraction, .. } | Coverage::Point { fraction, .. } => Some(fraction),
            Coverage::Disjoint | Coverage::Boundary { .. } => None,
        }
    }

    fn estimate_equality(
        &self,
        binding: &ColumnBinding,
        value: BoundValue,
        stats: &Statistics,
    ) -> Estimate {
        let stat = &binding.stat;
        let non_null_rows = stats.row_count() * stat.non_null_fraction();
        let selectivity = equality_selectivity(stat.ndv(), &self.config);

        match value {
            BoundValue::Null => Estimate::scaled(stats, 0.0),
            BoundValue::Unknown => {
                let rows = self.checked_rows(non_null_rows * selectivity, stats);
                let record = stat
                    .to_builder()
                    .with_count(rows)
                    .with_ndv(stat.ndv().min(1.0))
                    .with_nulls(0.0)
                    .build();
                Estimate::narrowed(stats, rows, &binding.keys, record)
            }
            BoundValue::Known { literal, encoded } => {
                let range = stat.value_range();
                if range.is_empty() || encoded < range.low || encoded > range.high {
                    return Estimate::emptied(stats, &binding.keys);
                }
                let rows = self.checked_rows(non_null_rows * selectivity, stats);
                let record = point_record(stat, encoded, Some(literal), rows);
                Estimate::narrowed(stats, rows, &binding.keys, record)
            }
        }
    }

    fn column_vs_column(
        &self,
        op: ComparisonOp,
        left: &Expression,
        right: &Expression,
        stats: &Statistics,
    ) -> Estimate {
        match op {
            ComparisonOp::NotEq => self.estimate_not_equal(left, right, stats),
            ComparisonOp::Eq => self.column_equality(left, right, false, stats),
            ComparisonOp::NullSafeEq => self.column_equality(left, right, true, stats),
            ComparisonOp::Lt => self.column_less_than(left, right, true, stats),
            ComparisonOp::Le => self.column_less_than(left, right, false, stats),
            ComparisonOp::Gt => self.column_less_than(right, left, true, stats),
            ComparisonOp::Ge => self.column_less_than(right, left, false, stats),
        }
    }

    /// `left < right` (or `<=` when not `strict`) between two columns.
    fn column_less_than(
        &self,
        left: &Expression,
        right: &Expression,
        strict: bool,
        stats: &Statistics,
    ) -> Estimate {
        let l = bind_column(left, stats);
        let r = bind_column(right, stats);
        if l.is_unknown() || r.is_unknown() {
            tracing::trace!(%left, %right, "no statistic, using default coefficient");
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }
        if l.stat.is_empty_range() || r.stat.is_empty_range() {
            return Estimate::scaled(stats, 0.0);
        }
        let comparable = l.scalable()
            && r.scalable()
            && l.stat.has_finite_range()
            && r.stat.has_finite_range();
        if !comparable {
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }

        let rows0 = stats.row_count();
        let (nn_l, nn_r) = (l.stat.non_null_fraction(), r.stat.non_null_fraction());
        let (lo_l, hi_l) = (l.stat.min_value(), l.stat.max_value());
        let (lo_r, hi_r) = (r.stat.min_value(), r.stat.max_value());

        if hi_l < lo_r || (!strict && hi_l <= lo_r) {
            let rows = (nn_l * rows0).min(nn_r * rows0);
            let keep = |stat: &ColumnStatistic| {
                stat.to_builder().with_count(rows).with_nulls(0.0).build()
            };
            return Estimate::with_records(
                stats,
                rows,
                [
                    (l.keys.as_slice(), keep(&l.stat)),
                    (r.keys.as_slice(), keep(&r.stat)),
                ],
            );
        }
        if lo_l > hi_r || (strict && lo_l >= hi_r) {
            return Estimate::scaled(stats, 0.0);
        }

        let width_l = hi_l - lo_l;
        let width_r = hi_r - lo_r;
        let overlap = intersect_range(
            &l.stat.value_range(),
            &r.stat.value_range(),
            true,
            &self.config,
        );
        // Shares of each side lying wholly below or above the overlap.
        let always_less = if width_l > 0.0 {
            ((lo_r - lo_l) / width_l).max(0.0)
        } else {
            0.0
        };
        let always_greater = if width_r > 0.0 {
            ((hi_r - hi_l) / width_r).max(0.0)
        } else {
            0.0
        };
        let tie = |fraction: f64| if strict { 0.0 } else { fraction };
        let (selectivity, fraction_l, fraction_r) = if width_l <= 0.0 {
            let below = always_greater + tie(overlap.fraction_b);
            (below, 1.0, below)
        } else if width_r <= 0.0 {
            let above = always_less + tie(overlap.fraction_a);
            (above, above, 1.0)
        } else {
            let (overlap_l, overlap_r) = (overlap.fraction_a, overlap.fraction_b);
            (
                always_less
                    + overlap_l * overlap_r * self.config.default_inequality_coefficient
                    + overlap_l * always_greater,
                always_less + overlap_l,
                overlap_r + always_greater,
            )
        };

        let rows = self.checked_rows(rows0 * nn_l * nn_r * selectivity.clamp(0.0, 1.0), stats);
        let narrow = |stat: &ColumnStatistic, low: f64, high: f64, fraction: f64| {
            stat.with_range(low, high)
                .to_builder()
                .with_count(rows)
                .with_ndv(scaled_ndv(stat.ndv(), fraction))
                .with_nulls(0.0)
                .build()
        };
        Estimate::with_records(
            stats,
            rows,
            [
                (
                    l.keys.as_slice(),
                    narrow(&l.stat, lo_l, hi_l.min(hi_r), fraction_l.min(1.0)),
                ),
                (
                    r.keys.as_slice(),
                    narrow(&r.stat, lo_l.max(lo_r), hi_r, fraction_r.min(1.0)),
                ),
            ],
        )
    }

    fn column_equality(
        &self,
        left: &Expression,
        right: &Expression,
        null_safe: bool,
        stats: &Statistics,
    ) -> Estimate {
        let l = bind_column(left, stats);
        let r = bind_column(right, stats);
        if l.is_unknown() || r.is_unknown() {
            tracing::trace!(%left, %right, "no statistic, using default coefficient");
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }

        let rows0 = stats.row_count();
        // Recorded null counts, which may come from a sample of the rows.
        let both_null = if null_safe && rows0 > 0.0 {
            l.stat.num_nulls() * r.stat.num_nulls() / rows0
        } else {
            0.0
        };
        let range = l.stat.value_range().intersect(&r.stat.value_range());
        if range.is_empty() {
            return Estimate::scaled(stats, super::ratio(both_null, rows0));
        }

        let ndv = l.stat.ndv().max(r.stat.ndv()).max(1.0);
        let matched = rows0 * l.stat.non_null_fraction() * r.stat.non_null_fraction() / ndv;
        let rows = self.checked_rows(matched + both_null, stats);
        let narrow = |stat: &ColumnStatistic| {
            stat.with_range(range.low, range.high)
                .to_builder()
                .with_count(rows)
                .with_ndv(l.stat.ndv().min(r.stat.ndv()))
                .with_nulls(both_null)
                .build()
        };
        Estimate::with_records(
            stats,
            rows,
            [
                (l.keys.as_slice(), narrow(&l.stat)),
                (r.keys.as_slice(), narrow(&r.stat)),
            ],
        )
    }

    /// `left <> right`, the complement of equality.
    fn estimate_not_equal(
        &self,
        left: &Expression,
        right: &Expression,
        stats: &Statistics,
    ) -> Estimate {
        let equal = Expression::compare(ComparisonOp::Eq, left.clone(), right.clone());
        self.estimate_not(&equal, stats)
    }

    pub(super) fn estimate_like(&self, expr: &Expression, stats: &Statistics) -> Estimate {
        let binding = if expr.is_constant() {
            None
        } else {
            Some(bind_column(expr, stats))
        };
        let Some(binding) = binding.filter(|b| !b.is_unknown()) else {
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        };

        let selectivity = self.config.like_selectivity * binding.stat.non_null_fraction();
        let rows = self.checked_rows(stats.row_count() * selectivity, stats);
        let record = binding
            .stat
            .with_row_count_ratio(selectivity)
            .to_builder()
            .with_count(rows)
            .with_nulls(0.0)
            .build();
        Estimate::narrowed(stats, rows, &binding.keys, record)
    }
}

/// The stored literal of the record bound equal to `value`, if any.
fn bound_literal(stat: &ColumnStatistic, value: f64) -> Option<Literal> {
    if value == stat.min_value() {
        stat.min_expr().cloned()
    } else if value == stat.max_value() {
        stat.max_expr().cloned()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn col(name: &str) -> Expression {
        Expression::column(name, DataType::Int)
    }

    fn lit(v: i64) -> Expression {
        Expression::literal(v)
    }

    fn uniform(count: f64, ndv: f64, min: f64, max: f64) -> ColumnStatistic {
        ColumnStatistic::builder(count)
            .with_ndv(ndv)
            .with_range(min, max)
            .build()
    }

    fn estimate(predicate: &Expression, stats: &Statistics) -> Statistics {
        FilterEstimator::new().estimate(predicate, stats)
    }

    fn scenario_one() -> Statistics {
        Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 500.0, 0.0, 1000.0))
            .with_column("b", uniform(1000.0, 100.0, 0.0, 100.0))
            .build()
    }

    fn date(y: i32, m: u32, d: u32) -> Literal {
        Literal::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_greater_than_half() {
        let out = estimate(&col("a").gt(lit(500)), &scenario_one());
        assert!((out.row_count() - 500.0).abs() < 1e-6);

        let a = out.column("a").unwrap();
        assert!((a.min_value() - 500.0).abs() < 1e-9);
        assert!((a.max_value() - 1000.0).abs() < 1e-9);
        assert!((a.ndv() - 250.0).abs() < 1e-6);
        assert_eq!(a.num_nulls(), 0.0);

        // Untouched columns are scaled.
        let b = out.column("b").unwrap();
        assert!(b.count() <= 500.0 + 1e-9);
    }

    #[test]
    fn test_just_outside_max_keeps_one_row() {
        let out = estimate(&col("a").gt(lit(1000)), &scenario_one());
        assert!((out.row_count() - 1.0).abs() < 1e-9);

        let out = estimate(&col("a").lt(lit(0)), &scenario_one());
        assert!((out.row_count() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_beyond_max_is_empty() {
        let out = estimate(&col("a").gt(lit(1001)), &scenario_one());
        assert_eq!(out.row_count(), 0.0);
        assert!(out.column("a").unwrap().is_empty_range());
        assert!(out.column("b").unwrap().is_empty_range());
    }

    #[test]
    fn test_at_max_is_equality() {
        let out = estimate(&col("a").ge(lit(1000)), &scenario_one());
        assert!((out.row_count() - 2.0).abs() < 1e-9);
        let a = out.column("a").unwrap();
        assert_eq!(a.min_value(), 1000.0);
        assert_eq!(a.max_value(), 1000.0);
    }

    #[test]
    fn test_literal_on_left_flips() {
        let out = estimate(&lit(500).lt(col("a")), &scenario_one());
        assert!((out.row_count() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_range_is_floored() {
        let stats = Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 1000.0, 0.0, 1e9))
            .build();
        let out = estimate(&col("a").lt(lit(50_000)), &stats);
        assert!((out.row_count() - 1000.0 * 1e-4).abs() < 1e-9);
    }

    #[test]
    fn test_primary_key_keeps_linear_ndv() {
        let stats = Statistics::builder(1000.0)
            .with_column("c", uniform(1000.0, 1000.0, 0.0, 200.0))
            .build();
        let out = estimate(&col("c").gt(lit(100)), &stats);
        let c = out.column("c").unwrap();
        assert!((c.ndv() - 500.0).abs() < 1e-6);
        assert!((c.min_value() - 100.0).abs() < 1e-9);
        assert!((c.max_value() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_nulls_reduce_range_rows() {
        let stats = Statistics::builder(1000.0)
            .with_column(
                "a",
                ColumnStatistic::builder(1000.0)
                    .with_ndv(100.0)
                    .with_nulls(200.0)
                    .with_range(0.0, 100.0)
                    .build(),
            )
            .build();
        let out = estimate(&col("a").lt(lit(50)), &stats);
        assert!((out.row_count() - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_equality() {
        let out = estimate(&col("a").eq(lit(10)), &scenario_one());
        assert!((out.row_count() - 2.0).abs() < 1e-9);
        let a = out.column("a").unwrap();
        assert_eq!(a.ndv(), 1.0);
        assert_eq!(a.min_expr(), Some(&Literal::Int64(10)));

        let out = estimate(&col("a").eq(lit(5000)), &scenario_one());
        assert_eq!(out.row_count(), 0.0);

        let out = estimate(&col("a").eq(Expression::null()), &scenario_one());
        assert_eq!(out.row_count(), 0.0);
    }

    #[test]
    fn test_not_equal_is_complement() {
        let out = estimate(&col("a").not_eq(lit(10)), &scenario_one());
        assert!((out.row_count() - 998.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_statistic_uses_default() {
        let out = estimate(&col("zz").lt(lit(3)), &scenario_one());
        assert!((out.row_count() - 500.0).abs() < 1e-6);
        let out = estimate(&col("zz").eq(lit(3)), &scenario_one());
        assert!((out.row_count() - 500.0).abs() < 1e-6);
        assert!(out.column("zz").is_none());
    }

    #[test]
    fn test_derived_literal_uses_ndv() {
        let stats = Statistics::builder(1000.0)
            .with_column("d", uniform(1000.0, 100.0, 0.0, 1e9))
            .build();
        let d = Expression::column("d", DataType::Date);
        let predicate = d.eq(Expression::left(Expression::literal("2024-08-14"), 7));
        let out = estimate(&predicate, &stats);
        assert!((out.row_count() - 10.0).abs() < 1e-9);

        let sparse = Statistics::builder(1000.0)
            .with_column("d", uniform(1000.0, 0.5, 0.0, 1e9))
            .build();
        let out = estimate(&predicate, &sparse);
        assert!((out.row_count() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_comparison_folds() {
        let stats = scenario_one();
        assert!((estimate(&lit(1).lt(lit(2)), &stats).row_count() - 1000.0).abs() < 1e-9);
        assert_eq!(estimate(&lit(3).lt(lit(2)), &stats).row_count(), 0.0);

        let same_day = Expression::literal("2024-01-01").eq(Expression::literal(date(2024, 1, 1)));
        assert!((estimate(&same_day, &stats).row_count() - 1000.0).abs() < 1e-9);

        let null_safe = Expression::null().null_safe_eq(Expression::null());
        assert!((estimate(&null_safe, &stats).row_count() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_column_vs_column_disjoint() {
        let stats = Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 500.0, 0.0, 500.0))
            .with_column("b", uniform(1000.0, 500.0, 501.0, 1000.0))
            .build();
        assert_eq!(estimate(&col("a").gt(col("b")), &stats).row_count(), 0.0);
        assert!((estimate(&col("a").lt(col("b")), &stats).row_count() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_column_vs_column_dates() {
        let column = |min: Literal, max: Literal| {
            ColumnStatistic::builder(100.0)
                .with_ndv(100.0)
                .with_min_literal(min)
                .with_max_literal(max)
                .build()
        };
        let stats = Statistics::builder(100.0)
            .with_column("c", column(date(2010, 1, 1), date(2021, 1, 1)))
            .with_column("a", column(date(2020, 1, 1), date(2022, 1, 1)))
            .build();
        let c = Expression::column("c", DataType::Date);
        let a = Expression::column("a", DataType::Date);

        let out = estimate(&c.clone().lt(a.clone()), &stats);
        let expected = 3652.0 / 4018.0
            + (366.0 / 4018.0) * (366.0 / 731.0) * 0.5
            + (366.0 / 4018.0) * (365.0 / 731.0);
        assert!((out.row_count() - 100.0 * expected).abs() < 1e-6);
        assert!((out.row_count() - 97.72).abs() < 0.01);

        // The left side cannot exceed the right side's max.
        let c_out = out.column("c").unwrap();
        assert!((c_out.max_value() - date(2021, 1, 1).to_double().unwrap()).abs() < 1e-6);
        let a_out = out.column("a").unwrap();
        assert!((a_out.min_value() - date(2020, 1, 1).to_double().unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_string_column_vs_column_is_default() {
        let column = |min: &str, max: &str| {
            ColumnStatistic::builder(100.0)
                .with_ndv(50.0)
                .with_min_literal(Literal::from(min))
                .with_max_literal(Literal::from(max))
                .build()
        };
        let stats = Statistics::builder(100.0)
            .with_column("s", column("apple", "melon"))
            .with_column("t", column("banana", "zebra"))
            .build();
        let s = Expression::column("s", DataType::String);
        let t = Expression::column("t", DataType::String);
        let out = estimate(&s.lt(t), &stats);
        assert!((out.row_count() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_string_column_vs_literal() {
        let stats = Statistics::builder(100.0)
            .with_column(
                "s",
                ColumnStatistic::builder(100.0)
                    .with_ndv(100.0)
                    .with_min_literal(Literal::from("100"))
                    .with_max_literal(Literal::from("200"))
                    .build(),
            )
            .build();
        let s = Expression::column("s", DataType::Varchar(3));
        let all = estimate(&s.clone().lt(Expression::literal("500")), &stats);
        assert!((all.row_count() - 100.0).abs() < 1e-9);

        let half = estimate(&s.gt(Expression::literal("199")), &stats);
        assert!((half.row_count() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_date_strings_interpolate_as_dates() {
        let stats = Statistics::builder(100.0)
            .with_column(
                "a",
                ColumnStatistic::builder(100.0)
                    .with_ndv(100.0)
                    .with_min_literal(Literal::from("2020-01-01"))
                    .with_max_literal(Literal::from("2022-01-01"))
                    .build(),
            )
            .build();
        let a = Expression::column("a", DataType::String);

        let december = estimate(&a.clone().gt(Expression::literal("2021-12-01")), &stats);
        assert!((december.row_count() - 100.0 * 31.0 / 731.0).abs() < 1e-6);
        assert!((december.row_count() - 4.24).abs() < 0.01);
        assert!(december.column("a").unwrap().ndv() <= december.row_count());

        let all = estimate(&a.clone().lt(Expression::literal("2030-01-01")), &stats);
        assert!((all.row_count() - 100.0).abs() < 1e-9);
        let flipped = estimate(&Expression::literal("2000-01-01").lt(a), &stats);
        assert!((flipped.row_count() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_column_equality() {
        let stats = Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 100.0, 0.0, 100.0))
            .with_column("b", uniform(1000.0, 50.0, 50.0, 150.0))
            .build();
        let out = estimate(&col("a").eq(col("b")), &stats);
        assert!((out.row_count() - 10.0).abs() < 1e-9);
        let a = out.column("a").unwrap();
        assert!((a.min_value() - 50.0).abs() < 1e-9);
        assert!((a.max_value() - 100.0).abs() < 1e-9);
        assert!(a.ndv() <= 10.0);
    }

    #[test]
    fn test_null_safe_equality_adds_both_null_rows() {
        let with_nulls = |min: f64, max: f64| {
            ColumnStatistic::builder(1000.0)
                .with_ndv(100.0)
                .with_nulls(100.0)
                .with_range(min, max)
                .build()
        };
        let stats = Statistics::builder(1000.0)
            .with_column("a", with_nulls(0.0, 100.0))
            .with_column("b", with_nulls(0.0, 100.0))
            .build();

        let plain = estimate(&col("a").eq(col("b")), &stats).row_count();
        let null_safe = estimate(&col("a").null_safe_eq(col("b")), &stats).row_count();
        assert!((plain - 8.1).abs() < 1e-9);
        assert!((null_safe - plain - 10.0).abs() < 1e-9);

        let is_null = estimate(&col("a").null_safe_eq(Expression::null()), &stats);
        assert!((is_null.row_count() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_null_safe_equality_uses_recorded_null_counts() {
        let sampled = |nulls: f64| {
            ColumnStatistic::builder(10.0)
                .with_ndv(2.0)
                .with_nulls(nulls)
                .with_avg_size_byte(4.0)
                .with_range(1.0, 2.0)
                .build()
        };
        let stats = Statistics::builder(100.0)
            .with_column("a", sampled(8.0))
            .with_column("b", sampled(7.0))
            .build();

        let plain = estimate(&col("a").eq(col("b")), &stats).row_count();
        let null_safe = estimate(&col("a").null_safe_eq(col("b")), &stats).row_count();
        assert!((plain - 3.0).abs() < 1e-9);
        assert!((null_safe - plain - 0.56).abs() < 1e-9);
    }

    #[test]
    fn test_like() {
        let out = estimate(
            &Expression::column("b", DataType::String).like("abc%"),
            &scenario_one(),
        );
        assert!((out.row_count() - 200.0).abs() < 1e-9);

        let out = estimate(
            &Expression::column("zz", DataType::String).like("abc%"),
            &scenario_one(),
        );
        assert!((out.row_count() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_cast_between_writes_base_column() {
        let stats = Statistics::builder(100.0)
            .with_column("a", uniform(100.0, 100.0, 0.0, 100.0))
            .build();
        let cast = Expression::cast(col("a"), DataType::Double);
        let out = estimate(&cast.between(lit(40), lit(50)), &stats);

        assert!((out.row_count() - 10.0).abs() < 1e-9);
        let a = out.column("a").unwrap();
        assert!((a.ndv() - 10.0).abs() < 1e-9);
        assert!((a.min_value() - 40.0).abs() < 1e-9);
        assert!(out.column("CAST(a AS DOUBLE)").is_some());
    }
}
