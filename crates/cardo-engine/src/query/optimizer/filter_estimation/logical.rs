//! Conjunction, disjunction and negation.

use cardo_common::types::ColumnKey;
use cardo_core::statistics::{ColumnStatistic, Interval, Statistics};
use hashbrown::HashMap;

use super::binding::{BoundValue, ColumnBinding, bind_column, bind_value};
use super::comparison::IntervalLiterals;
use super::{Estimate, FilterEstimator, KeySet, push_unique, ratio};
use crate::query::predicate::{ComparisonOp, Expression};

/// Range comparisons on one operand, merged into a single interval.
struct RangeGroup {
    binding: ColumnBinding,
    interval: Interval,
    literals: IntervalLiterals,
}

impl RangeGroup {
    fn merge(&mut self, other: RangeGroup) {
        let merged = self.interval.intersect(&other.interval);
        if merged.low == other.interval.low && other.literals.low.is_some() {
            self.literals.low = other.literals.low;
        }
        if merged.high == other.interval.high && other.literals.high.is_some() {
            self.literals.high = other.literals.high;
        }
        self.interval = merged;
    }
}

fn flatten_and<'a>(children: &'a [Expression], out: &mut Vec<&'a Expression>) {
    for child in children {
        match child {
            Expression::And(nested) => flatten_and(nested, out),
            other => out.push(other),
        }
    }
}

fn flatten_or<'a>(children: &'a [Expression], out: &mut Vec<&'a Expression>) {
    for child in children {
        match child {
            Expression::Or(nested) => flatten_or(nested, out),
            other => out.push(other),
        }
    }
}

/// Keys of operands that must be non-null for `predicate` to hold.
fn null_rejecting_keys(predicate: &Expression) -> KeySet {
    let mut keys = KeySet::new();
    match predicate {
        Expression::Comparison { op, left, right } if *op != ComparisonOp::NullSafeEq => {
            for side in [left, right] {
                if !side.is_constant() {
                    push_unique(&mut keys, &side.key());
                }
            }
        }
        Expression::InList { expr, .. } | Expression::Like { expr, .. } => {
            if !expr.is_constant() {
                keys.push(expr.key());
            }
        }
        Expression::Not(inner) => match inner.as_ref() {
            Expression::IsNull(_) | Expression::Not(_) => {}
            other => keys = null_rejecting_keys(other),
        },
        _ => {}
    }
    keys
}

/// The operand of `x IS NULL`.
fn is_null_operand(predicate: &Expression) -> Option<&Expression> {
    match predicate {
        Expression::IsNull(expr) if !expr.is_constant() => Some(expr),
        _ => None,
    }
}

/// The operand of `NOT (x IS NULL)`.
fn is_not_null_operand(predicate: &Expression) -> Option<&Expression> {
    match predicate {
        Expression::Not(inner) => is_null_operand(inner),
        _ => None,
    }
}

impl FilterEstimator {
    pub(super) fn estimate_and(&self, children: &[Expression], stats: &Statistics) -> Estimate {
        let mut conjuncts = Vec::new();
        flatten_and(children, &mut conjuncts);

        let rejecting: KeySet = conjuncts
            .iter()
            .flat_map(|c| null_rejecting_keys(c))
            .collect();
        let contradicts = conjuncts
            .iter()
            .filter_map(|c| is_null_operand(c))
            .any(|operand| rejecting.contains(&operand.key()));
        if contradicts {
            return Estimate::scaled(stats, 0.0);
        }

        let mut groups: Vec<RangeGroup> = Vec::new();
        let mut group_index: HashMap<ColumnKey, usize> = HashMap::new();
        let mut others = Vec::new();
        for conjunct in conjuncts {
            if is_not_null_operand(conjunct).is_some_and(|x| rejecting.contains(&x.key())) {
                continue;
            }
            let Some(group) = self.range_group(conjunct, stats) else {
                others.push(conjunct);
                continue;
            };
            let Some(key) = group.binding.key().cloned() else {
                others.push(conjunct);
                continue;
            };
            match group_index.get(&key) {
                Some(&index) => groups[index].merge(group),
                None => {
                    group_index.insert(key, groups.len());
                    groups.push(group);
                }
            }
        }

        let parts: Vec<Estimate> = groups
            .into_iter()
            .map(|g| self.estimate_interval(&g.binding, g.interval, g.literals, stats))
            .chain(others.into_iter().map(|c| self.visit(c, stats)))
            .collect();
        combine_conjuncts(&parts, stats)
    }

    /// A column-vs-literal range comparison with a usable statistic.
    fn range_group(&self, predicate: &Expression, stats: &Statistics) -> Option<RangeGroup> {
        let Expression::Comparison { op, left, right } = predicate else {
            return None;
        };
        let (op, column, value) = match (left.is_constant(), right.is_constant()) {
            (false, true) => (*op, left, right),
            (true, false) => (op.flip(), right, left),
            _ => return None,
        };
        let range_op = op.to_range_op()?;

        let binding = bind_column(column, stats);
        if binding.is_unknown() {
            return None;
        }
        let BoundValue::Known { literal, encoded } = bind_value(value, binding.data_type) else {
            return None;
        };
        Some(RangeGroup {
            binding,
            interval: Interval::from_op(range_op, encoded),
            literals: IntervalLiterals::for_op(range_op, literal),
        })
    }

    pub(super) fn estimate_or(&self, children: &[Expression], stats: &Statistics) -> Estimate {
        let mut disjuncts = Vec::new();
        flatten_or(children, &mut disjuncts);
        let Some((first, rest)) = disjuncts.split_first() else {
            return Estimate::scaled(stats, 0.0);
        };

        let mut acc = self.visit(first, stats);
        let mut acc_expr = Some(*first);
        for disjunct in rest {
            let next = self.visit(disjunct, stats);
            acc = self.combine_disjuncts(acc_expr, acc, disjunct, next, stats);
            acc_expr = None;
        }
        acc
    }

    fn combine_disjuncts(
        &self,
        a_expr: Option<&Expression>,
        a: Estimate,
        b_expr: &Expression,
        b: Estimate,
        stats: &Statistics,
    ) -> Estimate {
        let (s1, s2) = (a.selectivity(stats), b.selectivity(stats));
        let exclusive = a_expr.is_some_and(|a_expr| {
            null_exclusive(a_expr, &a, b_expr, &b) || null_exclusive(b_expr, &b, a_expr, &a)
        });
        let selectivity = if exclusive {
            (s1 + s2).min(1.0)
        } else {
            s1 + s2 - s1 * s2
        };
        let rows = self.checked_rows(stats.row_count() * selectivity, stats);

        // Columns neither branch narrowed keep the plain scaling.
        let mut out = Estimate::scaled(stats, ratio(rows, stats.row_count()));
        for key in a.touched.iter().chain(&b.touched) {
            push_unique(&mut out.touched, key);
        }
        for key in &out.touched {
            let record = match (a.stats.column(key.as_str()), b.stats.column(key.as_str())) {
                (Some(x), Some(y)) => x.union_with(y),
                (Some(x), None) | (None, Some(x)) => x.clone(),
                (None, None) => continue,
            };
            let record = if record.is_unknown() {
                record
            } else {
                record.to_builder().with_count(rows).build()
            };
            out.stats = out.stats.with_column(key.clone(), record);
        }
        for key in a.emptied.iter().chain(&b.emptied) {
            push_unique(&mut out.emptied, key);
        }
        out
    }

    pub(super) fn estimate_not(&self, child: &Expression, stats: &Statistics) -> Estimate {
        match child {
            Expression::Not(inner) => return self.visit(inner, stats),
            Expression::IsNull(expr) => return self.estimate_is_not_null(expr, stats),
            Expression::Comparison {
                op: ComparisonOp::NotEq,
                left,
                right,
            } => return self.estimate_comparison(ComparisonOp::Eq, left, right, stats),
            _ => {}
        }

        let inner = self.visit(child, stats);
        let rows = (stats.row_count() - inner.rows()).max(0.0);
        let mut out = Estimate::scaled(stats, ratio(rows, stats.row_count()));
        for key in &inner.touched {
            let Some(base) = stats.column(key.as_str()).filter(|s| !s.is_unknown()) else {
                continue;
            };
            let Some(removed) = inner.stats.column(key.as_str()) else {
                continue;
            };
            let record = base
                .to_builder()
                .with_count(rows)
                .with_ndv((base.ndv() - removed.ndv()).max(0.0))
                .with_nulls((base.num_nulls() - removed.num_nulls()).max(0.0))
                .build();
            out.stats = out.stats.with_column(key.clone(), record);
            push_unique(&mut out.touched, key);
        }
        out
    }
}

/// Whether `null_branch` is `x IS NULL` and `other` rejects nulls of `x`
/// and narrows nothing else, so the two branches never share a row.
fn null_exclusive(
    null_branch: &Expression,
    null_estimate: &Estimate,
    other: &Expression,
    other_estimate: &Estimate,
) -> bool {
    let Some(operand) = is_null_operand(null_branch) else {
        return false;
    };
    null_rejecting_keys(other).contains(&operand.key())
        && !other_estimate.touched.is_empty()
        && other_estimate
            .touched
            .iter()
            .all(|key| null_estimate.touched.contains(key))
}

/// Multiplies conjunct selectivities and narrows touched columns in
/// sequence.
fn combine_conjuncts(parts: &[Estimate], stats: &Statistics) -> Estimate {
    let selectivities: Vec<f64> = parts.iter().map(|p| p.selectivity(stats)).collect();
    let total: f64 = selectivities.iter().product();
    let mut out = Estimate::scaled(stats, total);

    let mut records: Vec<(ColumnKey, ColumnStatistic)> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let others: f64 = selectivities
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, s)| s)
            .product();
        for key in &part.touched {
            let Some(record) = part.stats.column(key.as_str()) else {
                continue;
            };
            let record = record.with_row_count_ratio(others);
            match records.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => *existing = existing.narrow_with(&record),
                None => records.push((key.clone(), record)),
            }
            push_unique(&mut out.touched, key);
        }
        for key in &part.emptied {
            push_unique(&mut out.emptied, key);
        }
    }
    for (key, record) in records {
        out.stats = out.stats.with_column(key, record);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardo_common::types::{DataType, Literal};

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

    fn known_a_unknown_b() -> Statistics {
        Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 1000.0, 0.0, 1000.0))
            .build()
    }

    #[test]
    fn test_and_merges_same_column_ranges() {
        let stats = Statistics::builder(100.0)
            .with_column("c", uniform(100.0, 40.0, 0.0, 40.0))
            .build();
        let predicate = Expression::and([col("c").gt(lit(10)), col("c").lt(lit(20))]);
        let out = estimate(&predicate, &stats);

        assert!((out.row_count() - 25.0).abs() < 1e-9);
        let c = out.column("c").unwrap();
        assert!((c.ndv() - 10.0).abs() < 1e-9);
        assert!((c.min_value() - 10.0).abs() < 1e-9);
        assert!((c.max_value() - 20.0).abs() < 1e-9);
        assert_eq!(c.min_expr(), Some(&Literal::Int64(10)));
        assert_eq!(c.max_expr(), Some(&Literal::Int64(20)));
    }

    #[test]
    fn test_and_range_thirds() {
        let stats = Statistics::builder(300.0)
            .with_column("a", uniform(300.0, 30.0, 0.0, 300.0))
            .build();
        let predicate = Expression::and([col("a").gt(lit(100)), col("a").lt(lit(200))]);
        let out = estimate(&predicate, &stats);

        assert!((out.row_count() - 100.0).abs() < 1e-9);
        let a = out.column("a").unwrap();
        assert!((a.ndv() - 10.0).abs() < 1e-9);
        assert!((a.min_value() - 100.0).abs() < 1e-9);
        assert!((a.max_value() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_and_with_unknown_column() {
        let predicate = Expression::and([col("a").gt(lit(500)), col("b").lt(lit(100))]);
        let out = estimate(&predicate, &known_a_unknown_b());
        assert!((out.row_count() - 250.0).abs() < 1e-6);
    }

    #[test]
    fn test_or_with_unknown_column() {
        let predicate = Expression::or([col("a").gt(lit(500)), col("b").lt(lit(100))]);
        let out = estimate(&predicate, &known_a_unknown_b());
        assert!((out.row_count() - 750.0).abs() < 1e-6);
    }

    #[test]
    fn test_or_unions_ranges() {
        let stats = Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 1000.0, 0.0, 1000.0))
            .build();
        let predicate = Expression::or([col("a").lt(lit(100)), col("a").gt(lit(900))]);
        let out = estimate(&predicate, &stats);

        assert!((out.row_count() - 190.0).abs() < 1e-6);
        let a = out.column("a").unwrap();
        assert!((a.min_value() - 0.0).abs() < 1e-9);
        assert!((a.max_value() - 1000.0).abs() < 1e-9);
        assert!(a.ndv() <= out.row_count() + 1e-9);
    }

    #[test]
    fn test_or_scales_untouched_columns() {
        let stats = Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 1000.0, 0.0, 1000.0))
            .with_column("b", uniform(1000.0, 1000.0, 0.0, 1000.0))
            .build();
        let predicate = Expression::or([col("a").lt(lit(100)), col("a").gt(lit(900))]);
        let out = estimate(&predicate, &stats);

        assert!((out.row_count() - 190.0).abs() < 1e-6);
        // `b` stays primary-key-like: one distinct value per surviving row.
        let b = out.column("b").unwrap();
        assert!((b.count() - 190.0).abs() < 1e-6);
        assert!((b.ndv() - 190.0).abs() < 1e-6);
        assert!((b.max_value() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_or_with_null_branch_is_disjoint() {
        let stats = Statistics::builder(10.0)
            .with_column(
                "a",
                ColumnStatistic::builder(10.0)
                    .with_ndv(2.0)
                    .with_nulls(8.0)
                    .with_range(1.0, 2.0)
                    .build(),
            )
            .build();
        let predicate = Expression::or([col("a").ge(lit(1)), col("a").is_null()]);
        let out = estimate(&predicate, &stats);
        assert!((out.row_count() - 10.0).abs() < 1e-9);

        let a = out.column("a").unwrap();
        assert!((a.num_nulls() - 8.0).abs() < 1e-9);
        assert!((a.min_value() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_null_and_comparison_is_empty() {
        let stats = known_a_unknown_b();
        let predicate = Expression::and([col("a").is_null(), col("a").gt(lit(5))]);
        assert_eq!(estimate(&predicate, &stats).row_count(), 0.0);
    }

    #[test]
    fn test_is_not_null_next_to_comparison_is_free() {
        let stats = Statistics::builder(1000.0)
            .with_column(
                "a",
                ColumnStatistic::builder(1000.0)
                    .with_ndv(100.0)
                    .with_nulls(500.0)
                    .with_range(0.0, 100.0)
                    .build(),
            )
            .build();
        let alone = estimate(&col("a").lt(lit(50)), &stats).row_count();
        let predicate = Expression::and([col("a").is_not_null(), col("a").lt(lit(50))]);
        let combined = estimate(&predicate, &stats).row_count();
        assert!((alone - 250.0).abs() < 1e-6);
        assert!((combined - alone).abs() < 1e-9);
    }

    #[test]
    fn test_and_scales_other_columns() {
        let stats = Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 1000.0, 0.0, 1000.0))
            .with_column("b", uniform(1000.0, 10.0, 1.0, 10.0))
            .build();
        let predicate = Expression::and([col("a").lt(lit(500)), col("b").eq(lit(3))]);
        let out = estimate(&predicate, &stats);

        assert!((out.row_count() - 50.0).abs() < 1e-6);
        let a = out.column("a").unwrap();
        assert!(a.ndv() <= 50.0 + 1e-9);
        let b = out.column("b").unwrap();
        assert_eq!(b.ndv(), 1.0);
    }

    #[test]
    fn test_nested_and_flattens() {
        let stats = Statistics::builder(100.0)
            .with_column("c", uniform(100.0, 40.0, 0.0, 40.0))
            .build();
        let flat = Expression::and([col("c").gt(lit(10)), col("c").lt(lit(20))]);
        let nested = Expression::and([Expression::and([col("c").gt(lit(10))]), col("c").lt(lit(20))]);
        assert_eq!(estimate(&flat, &stats), estimate(&nested, &stats));
    }

    #[test]
    fn test_not_in_list() {
        let stats = Statistics::builder(1000.0)
            .with_column("a", uniform(1000.0, 10.0, 1.0, 10.0))
            .build();
        let values = [Literal::Int64(1), Literal::Int64(3), Literal::Int64(5)];
        let out = estimate(&col("a").not_in(values), &stats);

        assert!((out.row_count() - 700.0).abs() < 1e-6);
        let a = out.column("a").unwrap();
        assert!((a.ndv() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_negation() {
        let stats = known_a_unknown_b();
        let p = col("a").gt(lit(250));
        let twice = Expression::not(Expression::not(p.clone()));
        assert_eq!(estimate(&twice, &stats), estimate(&p, &stats));
    }

    #[test]
    fn test_not_of_comparison_is_complement() {
        let stats = known_a_unknown_b();
        let p = col("a").gt(lit(250));
        let rows = estimate(&p, &stats).row_count();
        let negated = estimate(&Expression::not(p), &stats).row_count();
        assert!((rows + negated - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_and_keeps_everything() {
        let stats = known_a_unknown_b();
        let out = estimate(&Expression::And(Vec::new()), &stats);
        assert!((out.row_count() - 1000.0).abs() < 1e-9);

        let out = estimate(&Expression::Or(Vec::new()), &stats);
        assert_eq!(out.row_count(), 0.0);
    }
}
