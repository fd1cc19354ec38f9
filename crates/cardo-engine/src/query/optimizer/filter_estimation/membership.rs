//! IN-list predicates.

use cardo_common::types::Literal;
use cardo_core::statistics::Statistics;

use super::binding::{BoundValue, bind_column, bind_value};
use super::{Estimate, FilterEstimator};
use crate::query::predicate::Expression;

impl FilterEstimator {
    pub(super) fn estimate_in_list(
        &self,
        expr: &Expression,
        values: &[Literal],
        stats: &Statistics,
    ) -> Estimate {
        if expr.is_constant() {
            return Estimate::scaled(stats, self.fold_in_list(expr, values));
        }
        let binding = bind_column(expr, stats);
        if binding.is_unknown() {
            tracing::trace!(column = %expr, "no statistic, using default coefficient");
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }

        let stat = &binding.stat;
        let range = stat.value_range();
        let mut survivors: Vec<(f64, &Literal)> = values
            .iter()
            .filter_map(|v| binding.encode(v).map(|encoded| (encoded, v)))
            .filter(|(encoded, _)| {
                !range.is_empty() && *encoded >= range.low && *encoded <= range.high
            })
            .collect();
        survivors.sort_by(|a, b| a.0.total_cmp(&b.0));
        survivors.dedup_by(|a, b| a.0 == b.0);

        let (Some(&(low, low_literal)), Some(&(high, high_literal))) =
            (survivors.first(), survivors.last())
        else {
            return Estimate::emptied(stats, &binding.keys);
        };

        let matched = survivors.len() as f64;
        let ndv = stat.ndv();
        let selectivity = if ndv.is_finite() && ndv >= self.config.min_equality_ndv && ndv > 0.0 {
            stat.non_null_fraction() * matched.min(ndv) / ndv
        } else {
            self.config.default_inequality_coefficient
        };
        let rows = self.checked_rows(stats.row_count() * selectivity, stats);

        let record = stat
            .with_range(low, high)
            .to_builder()
            .with_min_expr(Some(low_literal.clone()))
            .with_max_expr(Some(high_literal.clone()))
            .with_count(rows)
            .with_ndv(matched.min(ndv))
            .with_nulls(0.0)
            .build();
        Estimate::narrowed(stats, rows, &binding.keys, record)
    }

    /// `constant IN (...)`: all rows or none.
    fn fold_in_list(&self, expr: &Expression, values: &[Literal]) -> f64 {
        let target = expr.data_type();
        let encoded = match bind_value(expr, target) {
            BoundValue::Known { encoded, .. } => encoded,
            BoundValue::Null => return 0.0,
            BoundValue::Unknown => return self.config.default_inequality_coefficient,
        };
        let encode = |v: &Literal| match &target {
            Some(t) => v.encode_for(t),
            None => v.to_double(),
        };
        if values.iter().any(|v| encode(v) == Some(encoded)) {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardo_common::types::DataType;
    use cardo_core::statistics::ColumnStatistic;

    fn col(name: &str) -> Expression {
        Expression::column(name, DataType::Int)
    }

    fn ints(values: &[i64]) -> Vec<Literal> {
        values.iter().copied().map(Literal::Int64).collect()
    }

    fn stats() -> Statistics {
        Statistics::builder(1000.0)
            .with_column(
                "a",
                ColumnStatistic::builder(1000.0)
                    .with_ndv(10.0)
                    .with_range(1.0, 10.0)
                    .build(),
            )
            .build()
    }

    fn estimate(predicate: &Expression, stats: &Statistics) -> Statistics {
        FilterEstimator::new().estimate(predicate, stats)
    }

    #[test]
    fn test_in_list() {
        let out = estimate(&col("a").in_list(ints(&[1, 3, 5])), &stats());
        assert!((out.row_count() - 300.0).abs() < 1e-6);

        let a = out.column("a").unwrap();
        assert_eq!(a.ndv(), 3.0);
        assert_eq!(a.min_value(), 1.0);
        assert_eq!(a.max_value(), 5.0);
        assert_eq!(a.min_expr(), Some(&Literal::Int64(1)));
        assert_eq!(a.max_expr(), Some(&Literal::Int64(5)));
    }

    #[test]
    fn test_in_list_clips_and_dedupes() {
        let values = vec![
            Literal::Int64(2),
            Literal::Int64(2),
            Literal::Float64(2.0),
            Literal::Int64(99),
            Literal::Null,
        ];
        let out = estimate(&col("a").in_list(values), &stats());
        assert!((out.row_count() - 100.0).abs() < 1e-6);
        assert_eq!(out.column("a").unwrap().ndv(), 1.0);
    }

    #[test]
    fn test_in_list_outside_range_is_empty() {
        let out = estimate(&col("a").in_list(ints(&[50, 60])), &stats());
        assert_eq!(out.row_count(), 0.0);
        assert!(out.column("a").unwrap().is_empty_range());

        let out = estimate(&col("a").in_list([Literal::Null]), &stats());
        assert_eq!(out.row_count(), 0.0);
    }

    #[test]
    fn test_in_list_more_values_than_ndv() {
        let values = ints(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let sparse = Statistics::builder(1000.0)
            .with_column(
                "a",
                ColumnStatistic::builder(1000.0)
                    .with_ndv(4.0)
                    .with_range(1.0, 10.0)
                    .build(),
            )
            .build();
        let out = estimate(&col("a").in_list(values), &sparse);
        assert!((out.row_count() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_in_list_unknown_column() {
        let out = estimate(&col("zz").in_list(ints(&[1, 2])), &stats());
        assert!((out.row_count() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_in_list() {
        let yes = Expression::literal(3).in_list(ints(&[1, 3]));
        assert!((estimate(&yes, &stats()).row_count() - 1000.0).abs() < 1e-9);
        let no = Expression::literal(4).in_list(ints(&[1, 3]));
        assert_eq!(estimate(&no, &stats()).row_count(), 0.0);
    }
}
