//! Resolving predicate operands to statistics and values.

use cardo_common::types::{ColumnKey, DataType, Literal};
use cardo_core::statistics::{ColumnStatistic, Statistics};
use smallvec::smallvec;

use super::KeySet;
use crate::query::predicate::{Expression, ScalarFunction};

/// A non-constant operand bound to the statistic that describes it.
#[derive(Debug, Clone)]
pub(super) struct ColumnBinding {
    /// The operand's record, unknown when nothing describes it.
    pub(super) stat: ColumnStatistic,
    /// Keys a narrowed record is written back to. Empty for unknown
    /// operands.
    pub(super) keys: KeySet,
    /// Type the operand's values are compared as.
    pub(super) data_type: Option<DataType>,
}

impl ColumnBinding {
    fn unknown(data_type: Option<DataType>) -> Self {
        Self {
            stat: ColumnStatistic::unknown(),
            keys: KeySet::new(),
            data_type,
        }
    }

    fn direct(key: ColumnKey, stat: ColumnStatistic, data_type: Option<DataType>) -> Self {
        Self {
            stat,
            keys: smallvec![key],
            data_type,
        }
    }

    pub(super) fn is_unknown(&self) -> bool {
        self.stat.is_unknown()
    }

    /// Whether range fractions may be interpolated.
    pub(super) fn scalable(&self) -> bool {
        self.data_type.is_some_and(|t| t.is_range_scalable())
    }

    /// Encodes `literal` for comparison against this operand.
    pub(super) fn encode(&self, literal: &Literal) -> Option<f64> {
        match &self.data_type {
            Some(target) => literal.encode_for(target),
            None => literal.to_double(),
        }
    }

    /// The key used to group predicates on the same operand.
    pub(super) fn key(&self) -> Option<&ColumnKey> {
        self.keys.first()
    }
}

/// Binds a non-constant expression to its statistic.
///
/// A record stored under the expression's own key always wins. Otherwise
/// monotonic casts inherit the record of their input and string prefixes
/// inherit its distinct count.
pub(super) fn bind_column(expr: &Expression, stats: &Statistics) -> ColumnBinding {
    let data_type = expr.data_type();
    let key = expr.key();
    if let Some(stat) = stats.column(key.as_str()) {
        return ColumnBinding::direct(key, stat.clone(), data_type);
    }

    match expr {
        Expression::Column(_) => ColumnBinding::direct(key, ColumnStatistic::unknown(), data_type),
        Expression::Cast { expr: input, target } => bind_cast(input, *target, key, stats),
        Expression::Function { func, args } => bind_prefix(func, args, key, data_type, stats),
        _ => ColumnBinding::unknown(data_type),
    }
}

fn bind_cast(
    input: &Expression,
    target: DataType,
    key: ColumnKey,
    stats: &Statistics,
) -> ColumnBinding {
    let inner = bind_column(input, stats);
    let monotonic = inner
        .data_type
        .is_some_and(|source| source.is_monotonic_cast_to(&target));
    if inner.is_unknown() || !monotonic {
        return ColumnBinding::unknown(Some(target));
    }

    let mut keys: KeySet = smallvec![key];
    keys.extend(inner.keys);
    ColumnBinding {
        stat: inner.stat,
        keys,
        data_type: Some(target),
    }
}

/// `left(s, n)` and `substring(s, 1, n)` over a string column.
fn bind_prefix(
    func: &ScalarFunction,
    args: &[Expression],
    key: ColumnKey,
    data_type: Option<DataType>,
    stats: &Statistics,
) -> ColumnBinding {
    let (input, len) = match (func, args) {
        (ScalarFunction::Left, [input, Expression::Literal(Literal::Int64(len))])
        | (
            ScalarFunction::Substring,
            [
                input,
                Expression::Literal(Literal::Int64(1)),
                Expression::Literal(Literal::Int64(len)),
            ],
        ) => (input, *len),
        _ => return ColumnBinding::unknown(data_type),
    };

    let inner = bind_column(input, stats);
    let is_string = inner.data_type.is_some_and(|t| t.is_string_like());
    let Ok(len) = usize::try_from(len) else {
        return ColumnBinding::unknown(data_type);
    };
    if inner.is_unknown() || !is_string {
        return ColumnBinding::unknown(data_type);
    }
    if inner.stat.is_empty_range() {
        return ColumnBinding::direct(key, inner.stat, data_type);
    }

    let mut builder = inner
        .stat
        .to_builder()
        .with_range(f64::NEG_INFINITY, f64::INFINITY)
        .with_original(None);
    if let Some(min) = inner.stat.min_expr().and_then(Literal::as_str) {
        builder = builder.with_min_literal(Literal::from(prefix(min, len)));
    }
    if let Some(max) = inner.stat.max_expr().and_then(Literal::as_str) {
        builder = builder.with_max_literal(Literal::from(prefix(max, len)));
    }
    ColumnBinding::direct(key, builder.build(), data_type)
}

fn prefix(s: &str, len: usize) -> String {
    s.chars().take(len).collect()
}

/// A constant operand.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum BoundValue {
    /// SQL NULL.
    Null,
    /// A value with a numeric encoding.
    Known {
        /// The folded literal.
        literal: Literal,
        /// Its encoding in the compared type.
        encoded: f64,
    },
    /// A constant that cannot be folded or encoded.
    Unknown,
}

/// Folds a constant expression and encodes it as `target`.
pub(super) fn bind_value(expr: &Expression, target: Option<DataType>) -> BoundValue {
    let Some(literal) = fold_literal(expr) else {
        return BoundValue::Unknown;
    };
    if literal.is_null() {
        return BoundValue::Null;
    }
    let encoded = match &target {
        Some(target) => literal.encode_for(target),
        None => literal.to_double(),
    };
    match encoded {
        Some(encoded) => BoundValue::Known { literal, encoded },
        None => BoundValue::Unknown,
    }
}

fn fold_literal(expr: &Expression) -> Option<Literal> {
    match expr {
        Expression::Literal(lit) => Some(lit.clone()),
        Expression::Cast { expr, target } => fold_literal(expr)?.cast_to(target),
        _ => None,
    }
}
