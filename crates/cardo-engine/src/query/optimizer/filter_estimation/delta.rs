//! Re-estimation against rows inserted since the last statistics refresh.
//!
//! Statistics go stale: a predicate on a value newer than the recorded max
//! matches nothing according to the record, yet the freshly inserted rows
//! may well satisfy it. When that happens the predicate is estimated once
//! more against the delta rows alone, with the stale columns unknown.

use cardo_core::statistics::{ColumnStatistic, Statistics};

use super::{Estimate, FilterEstimator, KeySet};
use crate::query::predicate::Expression;

impl FilterEstimator {
    pub(super) fn should_fall_back(&self, estimate: &Estimate, input: &Statistics) -> bool {
        self.config.delta_row_fallback
            && estimate.rows() == 0.0
            && input.delta_row_count() > 0.0
            && !estimate.emptied.is_empty()
    }

    pub(super) fn estimate_with_delta(
        &self,
        predicate: &Expression,
        input: &Statistics,
        emptied: &KeySet,
    ) -> Statistics {
        let delta_rows = input.delta_row_count();
        let mut snapshot = input
            .clone()
            .with_row_count(delta_rows)
            .with_delta_row_count(0.0);
        for key in emptied {
            snapshot = snapshot.with_column(key.clone(), ColumnStatistic::unknown());
        }

        let estimate = self.visit(predicate, &snapshot);
        tracing::debug!(
            keys = ?emptied,
            delta_rows,
            rows = estimate.rows(),
            "predicate outside recorded range, estimating against delta rows"
        );

        let mut out = self.finish(estimate, &snapshot);
        for key in emptied {
            out = out.with_column(key.clone(), ColumnStatistic::unknown());
        }
        let rows = out.row_count().min(input.row_count());
        out.with_row_count(rows)
            .with_delta_row_count(delta_rows)
            .reconciled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardo_common::types::{DataType, Literal};
    use cardo_core::statistics::SelectivityConfig;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Literal {
        Literal::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn stats(delta: f64) -> Statistics {
        Statistics::builder(1000.0)
            .with_delta_row_count(delta)
            .with_column(
                "a",
                ColumnStatistic::builder(1000.0)
                    .with_ndv(365.0)
                    .with_min_literal(date(2019, 1, 1))
                    .with_max_literal(date(2020, 1, 1))
                    .build(),
            )
            .with_column(
                "b",
                ColumnStatistic::builder(1000.0)
                    .with_ndv(10.0)
                    .with_range(0.0, 10.0)
                    .build(),
            )
            .build()
    }

    fn predicate() -> Expression {
        let a = Expression::column("a", DataType::Date);
        let b = Expression::column("b", DataType::Int);
        Expression::and([
            a.gt(Expression::literal(date(2020, 1, 2))),
            b.eq(Expression::literal(1)),
        ])
    }

    #[test]
    fn test_falls_back_to_delta_rows() {
        let out = FilterEstimator::new().estimate(&predicate(), &stats(100.0));

        // Half the delta rows for the unknown `a`, a tenth of those for `b`.
        assert!((out.row_count() - 5.0).abs() < 1e-9);
        assert!(out.column("a").unwrap().is_unknown());

        let b = out.column("b").unwrap();
        assert!(!b.is_unknown());
        assert_eq!(b.min_value(), 1.0);
        assert_eq!(b.max_value(), 1.0);
        assert_eq!(out.delta_row_count(), 100.0);
    }

    #[test]
    fn test_no_delta_rows_means_empty() {
        let out = FilterEstimator::new().estimate(&predicate(), &stats(0.0));
        assert_eq!(out.row_count(), 0.0);
        assert!(out.column("a").unwrap().is_empty_range());
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let config = SelectivityConfig::new().with_delta_row_fallback(false);
        let estimator = FilterEstimator::with_config(config).unwrap();
        let out = estimator.estimate(&predicate(), &stats(100.0));
        assert_eq!(out.row_count(), 0.0);
    }

    #[test]
    fn test_fallback_never_exceeds_input() {
        let a = Expression::column("a", DataType::Date);
        let late = a.gt(Expression::literal("2021-06-01"));
        let out = FilterEstimator::new().estimate(&late, &stats(5000.0));
        assert!((out.row_count() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_contradiction_does_not_fall_back() {
        let b = Expression::column("b", DataType::Int);
        let predicate = Expression::and([b.clone().is_null(), b.eq(Expression::literal(1))]);
        let out = FilterEstimator::new().estimate(&predicate, &stats(100.0));
        assert_eq!(out.row_count(), 0.0);
    }
}
