//! Literal values and their numeric encoding.
//!
//! Every orderable literal maps to an `f64` so that column ranges can be
//! compared and interpolated without knowing the SQL type:
//!
//! | Type | Encoding |
//! |------|----------|
//! | Boolean | `0` / `1` |
//! | Integer, float | the value |
//! | Decimal | `unscaled / 10^scale` |
//! | Date | seconds since the Unix epoch at midnight |
//! | DateTime | seconds since the Unix epoch |
//! | String | big-endian integer of the first 8 bytes |
//!
//! Dates and datetimes share one scale so they compare against each other.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::DataType;
use crate::utils::error::{Error, Result};

/// Days from 0001-01-01 (day 1 of the common era) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A constant value appearing in a predicate or a column statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Fixed-point decimal.
    Decimal {
        /// Value without the decimal point.
        unscaled: i128,
        /// Number of digits after the decimal point.
        scale: u8,
    },
    /// String value.
    String(Arc<str>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day.
    DateTime(NaiveDateTime),
}

impl Literal {
    /// Parses a `YYYY-MM-DD` date literal.
    pub fn parse_date(text: &str) -> Result<Self> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| Error::InvalidLiteral {
                literal: text.to_string(),
                expected: "a date in YYYY-MM-DD form",
            })
    }

    /// Parses a datetime literal.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS[.fff]`, the same with a `T` separator,
    /// and a bare date (midnight).
    pub fn parse_datetime(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self::DateTime(dt));
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|d| Self::DateTime(NaiveDateTime::new(d, NaiveTime::MIN)))
            .map_err(|_| Error::InvalidLiteral {
                literal: text.to_string(),
                expected: "a datetime in YYYY-MM-DD[ HH:MM:SS] form",
            })
    }

    /// Returns true for SQL NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the type of this literal, or `None` for NULL.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Int64(_) => Some(DataType::BigInt),
            Self::Float64(_) => Some(DataType::Double),
            Self::Decimal { scale, .. } => Some(DataType::Decimal {
                precision: 38,
                scale: *scale,
            }),
            Self::String(_) => Some(DataType::String),
            Self::Date(_) => Some(DataType::Date),
            Self::DateTime(_) => Some(DataType::DateTime),
        }
    }

    /// Returns the string contents if this is a string literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(&**s),
            _ => None,
        }
    }

    /// Returns the numeric encoding of this literal in its own type.
    ///
    /// `None` for NULL and for non-finite floats.
    #[must_use]
    pub fn to_double(&self) -> Option<f64> {
        let value = match self {
            Self::Null => return None,
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Int64(v) => *v as f64,
            Self::Float64(v) => *v,
            Self::Decimal { unscaled, scale } => {
                *unscaled as f64 / 10f64.powi(i32::from(*scale))
            }
            Self::String(s) => encode_string(s),
            Self::Date(d) => encode_date(*d),
            Self::DateTime(dt) => encode_datetime(*dt),
        };
        value.is_finite().then_some(value)
    }

    /// Returns the numeric encoding of this literal when compared against a
    /// value of type `target`.
    ///
    /// A string compared with a temporal column is parsed as a date or
    /// datetime, a string compared with a numeric column is parsed as a
    /// number, and a non-string compared with a string column is encoded
    /// through its text. `None` means the value is unknown.
    #[must_use]
    pub fn encode_for(&self, target: &DataType) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::String(s) if target.is_temporal() => Self::parse_datetime(s).ok()?.to_double(),
            Self::String(s) if target.is_numeric() => {
                s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
            }
            Self::String(_) => self.to_double(),
            other if target.is_string_like() => Some(encode_string(&other.plain_text())),
            other => other.to_double(),
        }
    }

    /// Casts this literal to `target`, or `None` if the cast cannot be
    /// folded.
    #[must_use]
    pub fn cast_to(&self, target: &DataType) -> Option<Literal> {
        if self.is_null() {
            return Some(Self::Null);
        }
        match target {
            DataType::Boolean => match self {
                Self::Boolean(b) => Some(Self::Boolean(*b)),
                other => other.numeric_value().map(|v| Self::Boolean(v != 0.0)),
            },
            DataType::Int | DataType::BigInt => self
                .numeric_value()
                .filter(|v| v.abs() < 9.0e18)
                .map(|v| Self::Int64(v.trunc() as i64)),
            DataType::Double | DataType::Decimal { .. } => {
                self.numeric_value().map(Self::Float64)
            }
            DataType::Date => match self {
                Self::Date(d) => Some(Self::Date(*d)),
                Self::DateTime(dt) => Some(Self::Date(dt.date())),
                Self::String(s) => match Self::parse_datetime(s).ok()? {
                    Self::DateTime(dt) => Some(Self::Date(dt.date())),
                    _ => None,
                },
                _ => None,
            },
            DataType::DateTime => match self {
                Self::Date(d) => Some(Self::DateTime(NaiveDateTime::new(*d, NaiveTime::MIN))),
                Self::DateTime(dt) => Some(Self::DateTime(*dt)),
                Self::String(s) => Self::parse_datetime(s).ok(),
                _ => None,
            },
            DataType::Char(_) | DataType::Varchar(_) | DataType::String => {
                Some(Self::String(self.plain_text().into()))
            }
        }
    }

    /// The value as a number, parsing strings; `None` for temporal values.
    fn numeric_value(&self) -> Option<f64> {
        match self {
            Self::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Date(_) | Self::DateTime(_) | Self::Null => None,
            other => other.to_double(),
        }
    }

    /// The value rendered without SQL quoting.
    fn plain_text(&self) -> String {
        match self {
            Self::String(s) => s.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            other => other.to_string(),
        }
    }
}

/// Encodes a string by its first 8 bytes, zero padded, read big-endian.
///
/// Monotone in byte order: `a <= b` implies `encode(a) <= encode(b)`.
#[must_use]
pub fn encode_string(s: &str) -> f64 {
    let mut prefix = [0u8; 8];
    let bytes = s.as_bytes();
    let len = bytes.len().min(prefix.len());
    prefix[..len].copy_from_slice(&bytes[..len]);
    u64::from_be_bytes(prefix) as f64
}

fn encode_date(date: NaiveDate) -> f64 {
    let days = i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE;
    days as f64 * SECONDS_PER_DAY
}

fn encode_datetime(dt: NaiveDateTime) -> f64 {
    let time = dt.time();
    encode_date(dt.date())
        + f64::from(time.num_seconds_from_midnight())
        + f64::from(time.nanosecond()) / 1e9
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal { unscaled, scale } => {
                if *scale == 0 {
                    return write!(f, "{unscaled}");
                }
                let sign = if *unscaled < 0 { "-" } else { "" };
                let digits = unscaled.unsigned_abs().to_string();
                let scale = usize::from(*scale);
                let padded = format!("{digits:0>width$}", width = scale + 1);
                let (int_part, frac_part) = padded.split_at(padded.len() - scale);
                write!(f, "{sign}{int_part}.{frac_part}")
            }
            Self::String(s) => write!(f, "'{s}'"),
            Self::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "TIMESTAMP '{}'", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Self::Int64(i64::from(v))
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Self::String(v.into())
    }
}

impl From<NaiveDate> for Literal {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}
