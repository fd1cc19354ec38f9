//! SQL data types as seen by the estimator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a column, literal, or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean.
    Boolean,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// 64-bit float.
    Double,
    /// Fixed-point decimal.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// Calendar date.
    Date,
    /// Date with time of day.
    DateTime,
    /// Fixed-width string.
    Char(u32),
    /// Bounded variable-width string.
    Varchar(u32),
    /// Unbounded string.
    String,
}

impl DataType {
    /// Returns true for boolean, integer, float and decimal types.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Int | Self::BigInt | Self::Double | Self::Decimal { .. }
        )
    }

    /// Returns true for date and datetime.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Returns true for char, varchar and string.
    #[must_use]
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::Char(_) | Self::Varchar(_) | Self::String)
    }

    /// Whether values of this type are spread uniformly enough over their
    /// numeric encoding for range interpolation to be meaningful.
    ///
    /// Strings encode to a prefix number that preserves order but not
    /// density, so their min/max are only used for coverage checks.
    #[must_use]
    pub fn is_range_scalable(&self) -> bool {
        self.is_numeric() || self.is_temporal()
    }

    /// Returns true if casting a value of this type to `target` preserves
    /// ordering, so statistics of the source column carry over to the cast.
    #[must_use]
    pub fn is_monotonic_cast_to(&self, target: &DataType) -> bool {
        self == target
            || (self.is_numeric() && target.is_numeric())
            || (self.is_temporal() && target.is_temporal())
            || (self.is_string_like() && target.is_string_like())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Int => write!(f, "INT"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Double => write!(f, "DOUBLE"),
            Self::Decimal { precision, scale } => write!(f, "DECIMAL({precision}, {scale})"),
            Self::Date => write!(f, "DATE"),
            Self::DateTime => write!(f, "DATETIME"),
            Self::Char(len) => write!(f, "CHAR({len})"),
            Self::Varchar(len) => write!(f, "VARCHAR({len})"),
            Self::String => write!(f, "STRING"),
        }
    }
}
