//! IS NULL and IS NOT NULL.

use std::sync::Arc;

use cardo_core::statistics::Statistics;

use super::binding::{BoundValue, bind_column, bind_value};
use super::{Estimate, FilterEstimator};
use crate::query::predicate::Expression;

impl FilterEstimator {
    pub(super) fn estimate_is_null(&self, expr: &Expression, stats: &Statistics) -> Estimate {
        if expr.is_constant() {
            return Estimate::scaled(stats, self.constant_null_selectivity(expr, true));
        }
        let binding = bind_column(expr, stats);
        if binding.is_unknown() {
            tracing::trace!(column = %expr, "no statistic, using default coefficient");
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }

        let rows = stats.row_count() * binding.stat.null_fraction();
        let record = binding.stat.to_all_null(rows);
        Estimate::narrowed(stats, rows, &binding.keys, record)
    }

    pub(super) fn estimate_is_not_null(&self, expr: &Expression, stats: &Statistics) -> Estimate {
        if expr.is_constant() {
            return Estimate::scaled(stats, self.constant_null_selectivity(expr, false));
        }
        let binding = bind_column(expr, stats);
        if binding.is_unknown() {
            tracing::trace!(column = %expr, "no statistic, using default coefficient");
            return Estimate::scaled(stats, self.config.default_inequality_coefficient);
        }

        let stat = &binding.stat;
        let rows = stats.row_count() * stat.non_null_fraction();
        // A record emptied by IS NULL still remembers its values.
        let base = match stat.original() {
            Some(original) if stat.is_empty_range() => original.clone(),
            _ => stat.without_original(),
        };
        let record = base
            .to_builder()
            .with_count(rows)
            .with_nulls(0.0)
            .with_original(Some(Arc::new(base.clone())))
            .build();
        Estimate::narrowed(stats, rows, &binding.keys, record)
    }

    fn constant_null_selectivity(&self, expr: &Expression, want_null: bool) -> f64 {
        match bind_value(expr, None) {
            BoundValue::Null => f64::from(u8::from(want_null)),
            BoundValue::Known { .. } => f64::from(u8::from(!want_null)),
            BoundValue::Unknown => self.config.default_inequality_coefficient,
        }
    }
}
