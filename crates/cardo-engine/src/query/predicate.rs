//! Typed, bound predicate trees.
//!
//! Predicates reach the estimator already parsed and bound: every column
//! reference carries its name and type. The tree is a closed enum so the
//! estimator can match it exhaustively.

use std::fmt;
use std::sync::Arc;

use cardo_common::types::{ColumnKey, DataType, Literal};
use cardo_core::statistics::RangeOp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A reference to a base-table column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Column name, used as its statistics key.
    pub name: Arc<str>,
    /// Column type.
    pub data_type: DataType,
}

/// A scalar function that may wrap a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarFunction {
    /// `left(s, n)`: the first `n` characters.
    Left,
    /// `substring(s, start, n)`.
    Substring,
    /// Any other function, opaque to estimation.
    Other(Arc<str>),
}

impl ScalarFunction {
    /// The function name as rendered in keys.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Left => "left",
            Self::Substring => "substring",
            Self::Other(name) => name,
        }
    }
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Equal (=).
    Eq,
    /// Null-safe equal (<=>): NULL <=> NULL is true.
    NullSafeEq,
    /// Not equal (<>).
    NotEq,
    /// Less than (<).
    Lt,
    /// Less than or equal (<=).
    Le,
    /// Greater than (>).
    Gt,
    /// Greater than or equal (>=).
    Ge,
}

impl ComparisonOp {
    /// The operator with its operands swapped.
    #[must_use]
    pub fn flip(&self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
            other => *other,
        }
    }

    /// The range operator, for `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub fn to_range_op(&self) -> Option<RangeOp> {
        match self {
            Self::Lt => Some(RangeOp::Lt),
            Self::Le => Some(RangeOp::Le),
            Self::Gt => Some(RangeOp::Gt),
            Self::Ge => Some(RangeOp::Ge),
            Self::Eq | Self::NullSafeEq | Self::NotEq => None,
        }
    }

    /// Evaluates the operator on two encoded, non-null values.
    #[must_use]
    pub fn evaluate(&self, left: f64, right: f64) -> bool {
        match self {
            Self::Eq | Self::NullSafeEq => left == right,
            Self::NotEq => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }

    /// The SQL symbol.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NullSafeEq => "<=>",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A predicate or scalar expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A column reference.
    Column(ColumnRef),

    /// A constant.
    Literal(Literal),

    /// Type conversion.
    Cast {
        /// Converted expression.
        expr: Box<Expression>,
        /// Target type.
        target: DataType,
    },

    /// Scalar function call.
    Function {
        /// The function.
        func: ScalarFunction,
        /// Arguments.
        args: Vec<Expression>,
    },

    /// Binary comparison.
    Comparison {
        /// Operator.
        op: ComparisonOp,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },

    /// `expr IN (v1, v2, ...)`.
    InList {
        /// Tested expression.
        expr: Box<Expression>,
        /// Candidate values.
        values: SmallVec<[Literal; 4]>,
    },

    /// `expr IS NULL`.
    IsNull(Box<Expression>),

    /// `expr LIKE pattern`.
    Like {
        /// Tested expression.
        expr: Box<Expression>,
        /// The pattern text.
        pattern: Arc<str>,
    },

    /// Conjunction of any number of predicates.
    And(Vec<Expression>),

    /// Disjunction of any number of predicates.
    Or(Vec<Expression>),

    /// Negation.
    Not(Box<Expression>),
}

impl Expression {
    /// A column reference.
    #[must_use]
    pub fn column(name: impl Into<Arc<str>>, data_type: DataType) -> Self {
        Self::Column(ColumnRef {
            name: name.into(),
            data_type,
        })
    }

    /// A literal.
    #[must_use]
    pub fn literal(value: impl Into<Literal>) -> Self {
        Self::Literal(value.into())
    }

    /// The NULL literal.
    #[must_use]
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// `CAST(expr AS target)`.
    #[must_use]
    pub fn cast(expr: Expression, target: DataType) -> Self {
        Self::Cast {
            expr: Box::new(expr),
            target,
        }
    }

    /// `left(expr, len)`.
    #[must_use]
    pub fn left(expr: Expression, len: i64) -> Self {
        Self::Function {
            func: ScalarFunction::Left,
            args: vec![expr, Self::literal(len)],
        }
    }

    /// `substring(expr, start, len)`.
    #[must_use]
    pub fn substring(expr: Expression, start: i64, len: i64) -> Self {
        Self::Function {
            func: ScalarFunction::Substring,
            args: vec![expr, Self::literal(start), Self::literal(len)],
        }
    }

    /// An opaque function call.
    #[must_use]
    pub fn function(name: impl Into<Arc<str>>, args: Vec<Expression>) -> Self {
        Self::Function {
            func: ScalarFunction::Other(name.into()),
            args,
        }
    }

    /// `left op right`.
    #[must_use]
    pub fn compare(op: ComparisonOp, left: Expression, right: Expression) -> Self {
        Self::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `self = other`.
    #[must_use]
    pub fn eq(self, other: Expression) -> Self {
        Self::compare(ComparisonOp::Eq, self, other)
    }

    /// `self <=> other`.
    #[must_use]
    pub fn null_safe_eq(self, other: Expression) -> Self {
        Self::compare(ComparisonOp::NullSafeEq, self, other)
    }

    /// `self <> other`.
    #[must_use]
    pub fn not_eq(self, other: Expression) -> Self {
        Self::compare(ComparisonOp::NotEq, self, other)
    }

    /// `self < other`.
    #[must_use]
    pub fn lt(self, other: Expression) -> Self {
        Self::compare(ComparisonOp::Lt, self, other)
    }

    /// `self <= other`.
    #[must_use]
    pub fn le(self, other: Expression) -> Self {
        Self::compare(ComparisonOp::Le, self, other)
    }

    /// `self > other`.
    #[must_use]
    pub fn gt(self, other: Expression) -> Self {
        Self::compare(ComparisonOp::Gt, self, other)
    }

    /// `self >= other`.
    #[must_use]
    pub fn ge(self, other: Expression) -> Self {
        Self::compare(ComparisonOp::Ge, self, other)
    }

    /// `self BETWEEN low AND high`.
    #[must_use]
    pub fn between(self, low: Expression, high: Expression) -> Self {
        Self::And(vec![self.clone().ge(low), self.le(high)])
    }

    /// `self IN (values)`.
    #[must_use]
    pub fn in_list(self, values: impl IntoIterator<Item = Literal>) -> Self {
        Self::InList {
            expr: Box::new(self),
            values: values.into_iter().collect(),
        }
    }

    /// `self NOT IN (values)`.
    #[must_use]
    pub fn not_in(self, values: impl IntoIterator<Item = Literal>) -> Self {
        Self::not(self.in_list(values))
    }

    /// `self IS NULL`.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull(Box::new(self))
    }

    /// `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::not(self.is_null())
    }

    /// `self LIKE pattern`.
    #[must_use]
    pub fn like(self, pattern: impl Into<Arc<str>>) -> Self {
        Self::Like {
            expr: Box::new(self),
            pattern: pattern.into(),
        }
    }

    /// `NOT expr`.
    #[must_use]
    pub fn not(expr: Expression) -> Self {
        Self::Not(Box::new(expr))
    }

    /// `p1 AND p2 AND ...`.
    #[must_use]
    pub fn and(predicates: impl IntoIterator<Item = Expression>) -> Self {
        Self::And(predicates.into_iter().collect())
    }

    /// `p1 OR p2 OR ...`.
    #[must_use]
    pub fn or(predicates: impl IntoIterator<Item = Expression>) -> Self {
        Self::Or(predicates.into_iter().collect())
    }

    /// The statistics key of this expression: its canonical rendering.
    #[must_use]
    pub fn key(&self) -> ColumnKey {
        match self {
            Self::Column(col) => ColumnKey::new(col.name.clone()),
            other => ColumnKey::new(other.to_string()),
        }
    }

    /// Returns true if the expression references no column.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Column(_) => false,
            Self::Literal(_) => true,
            Self::Cast { expr, .. }
            | Self::InList { expr, .. }
            | Self::IsNull(expr)
            | Self::Like { expr, .. }
            | Self::Not(expr) => expr.is_constant(),
            Self::Function { args, .. } => args.iter().all(Self::is_constant),
            Self::Comparison { left, right, .. } => left.is_constant() && right.is_constant(),
            Self::And(children) | Self::Or(children) => children.iter().all(Self::is_constant),
        }
    }

    /// The result type, when known.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Column(col) => Some(col.data_type),
            Self::Literal(lit) => lit.data_type(),
            Self::Cast { target, .. } => Some(*target),
            Self::Function { func, args } => match func {
                ScalarFunction::Left => match args.get(1) {
                    Some(Self::Literal(Literal::Int64(len))) if *len >= 0 => {
                        Some(DataType::Varchar(u32::try_from(*len).unwrap_or(u32::MAX)))
                    }
                    _ => Some(DataType::String),
                },
                ScalarFunction::Substring => Some(DataType::String),
                ScalarFunction::Other(_) => None,
            },
            Self::Comparison { .. }
            | Self::InList { .. }
            | Self::IsNull(_)
            | Self::Like { .. }
            | Self::And(_)
            | Self::Or(_)
            | Self::Not(_) => Some(DataType::Boolean),
        }
    }

    /// The literal, if this is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(col) => f.write_str(&col.name),
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Cast { expr, target } => write!(f, "CAST({expr} AS {target})"),
            Self::Function { func, args } => {
                write!(f, "{}(", func.name())?;
                write_list(f, args, ", ")?;
                f.write_str(")")
            }
            Self::Comparison { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            Self::InList { expr, values } => {
                write!(f, "({expr} IN (")?;
                write_list(f, values, ", ")?;
                f.write_str("))")
            }
            Self::IsNull(expr) => write!(f, "({expr} IS NULL)"),
            Self::Like { expr, pattern } => write!(f, "({expr} LIKE '{pattern}')"),
            Self::And(children) => {
                f.write_str("(")?;
                write_list(f, children, " AND ")?;
                f.write_str(")")
            }
            Self::Or(children) => {
                f.write_str("(")?;
                write_list(f, children, " OR ")?;
                f.write_str(")")
            }
            Self::Not(expr) => write!(f, "(NOT {expr})"),
        }
    }
}
