//! Range arithmetic for selectivity estimation.
//!
//! Column values are assumed to be spread uniformly between their recorded
//! min and max. An absent bound is stored as an infinity; infinities decide
//! direction only and never enter the interpolation itself.

use super::config::SelectivityConfig;

/// A range comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl RangeOp {
    /// Returns true if `value op bound` holds.
    #[must_use]
    pub fn holds(&self, value: f64, bound: f64) -> bool {
        match self {
            Self::Lt => value < bound,
            Self::Le => value <= bound,
            Self::Gt => value > bound,
            Self::Ge => value >= bound,
        }
    }

    /// The operator with its operands swapped (`a < b` is `b > a`).
    #[must_use]
    pub fn flip(&self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
        }
    }

    /// Returns true for `<` and `>`.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Lt | Self::Gt)
    }
}

/// Fraction of a uniform `[col_min, col_max]` that satisfies `value op bound`.
///
/// A point range yields exactly `1` or `0`. A positive result is never
/// below the configured range threshold.
#[must_use]
pub fn overlap_fraction(
    col_min: f64,
    col_max: f64,
    bound: f64,
    op: RangeOp,
    config: &SelectivityConfig,
) -> f64 {
    if bound.is_nan() || col_min.is_nan() || col_max.is_nan() {
        return config.default_inequality_coefficient;
    }
    if col_min > col_max || col_min == f64::INFINITY {
        return 0.0;
    }
    if col_min == col_max {
        return if op.holds(col_min, bound) { 1.0 } else { 0.0 };
    }
    if bound.is_infinite() {
        let satisfied = match op {
            RangeOp::Lt | RangeOp::Le => bound > 0.0,
            RangeOp::Gt | RangeOp::Ge => bound < 0.0,
        };
        return if satisfied { 1.0 } else { 0.0 };
    }

    let (low, high) = match op {
        RangeOp::Lt | RangeOp::Le => (col_min, bound.min(col_max)),
        RangeOp::Gt | RangeOp::Ge => (bound.max(col_min), col_max),
    };
    if low > high {
        return 0.0;
    }
    if low == col_min && high == col_max {
        return 1.0;
    }
    if !col_min.is_finite() || !col_max.is_finite() {
        return config.default_inequality_coefficient;
    }
    if low == high {
        // Measure zero: only the endpoint itself can match.
        return if op.is_strict() {
            0.0
        } else {
            config.range_selectivity_threshold
        };
    }
    floor_fraction((high - low) / (col_max - col_min), config)
}

/// Selectivity of `column = value` for a column with `ndv` distinct values.
///
/// Falls back to the default coefficient when the distinct count is unknown
/// or too small to trust.
#[must_use]
pub fn equality_selectivity(ndv: f64, config: &SelectivityConfig) -> f64 {
    if ndv.is_finite() && ndv >= config.min_equality_ndv && ndv > 0.0 {
        (1.0 / ndv).min(1.0)
    } else {
        config.default_inequality_coefficient
    }
}

fn floor_fraction(fraction: f64, config: &SelectivityConfig) -> f64 {
    if fraction > 0.0 && fraction < config.range_selectivity_threshold {
        config.range_selectivity_threshold
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// The value range of a column together with its distinct count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    /// Lowest value, `-inf` if unbounded.
    pub low: f64,
    /// Highest value, `+inf` if unbounded.
    pub high: f64,
    /// Distinct values inside the range.
    pub ndv: f64,
}

impl ValueRange {
    /// Creates a range.
    #[must_use]
    pub fn new(low: f64, high: f64, ndv: f64) -> Self {
        Self { low, high, ndv }
    }

    /// The empty range (`low = high = +inf`).
    #[must_use]
    pub fn empty() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY, 0.0)
    }

    /// A range with no bounds and unknown distinct count.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY, 0.0)
    }

    /// Returns true if no value lies in the range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.low > self.high || self.low == f64::INFINITY || self.high == f64::NEG_INFINITY
    }

    /// Returns true if the range holds exactly one value.
    #[must_use]
    pub fn is_point(&self) -> bool {
        !self.is_empty() && self.low == self.high
    }

    /// Returns true if both bounds are finite.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.low.is_finite() && self.high.is_finite()
    }

    /// Intersection of two ranges; the distinct count is the smaller one.
    #[must_use]
    pub fn intersect(&self, other: &ValueRange) -> ValueRange {
        let low = self.low.max(other.low);
        let high = self.high.min(other.high);
        if self.is_empty() || other.is_empty() || low > high {
            return Self::empty();
        }
        Self::new(low, high, self.ndv.min(other.ndv))
    }

    /// Smallest range containing both; the distinct count is the larger one.
    #[must_use]
    pub fn union(&self, other: &ValueRange) -> ValueRange {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(
            self.low.min(other.low),
            self.high.max(other.high),
            self.ndv.max(other.ndv),
        )
    }

    /// Fraction of this range that `other` covers.
    ///
    /// A zero-width overlap inside a wider range counts as one distinct
    /// value. An unbounded range partially covered falls back to the
    /// default coefficient.
    #[must_use]
    pub fn overlap_with(&self, other: &ValueRange, config: &SelectivityConfig) -> f64 {
        let overlap = self.intersect(other);
        if overlap.is_empty() {
            return 0.0;
        }
        if self.is_point() || (overlap.low == self.low && overlap.high == self.high) {
            return 1.0;
        }
        if !self.is_bounded() {
            return config.default_inequality_coefficient;
        }
        if overlap.is_point() {
            return 1.0 / self.ndv.max(1.0);
        }
        (overlap.high - overlap.low) / (self.high - self.low)
    }
}

/// Result of [`intersect_range`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeIntersection {
    /// The overlapping extent, empty if the inputs are disjoint.
    pub range: ValueRange,
    /// Fraction of the first range inside the overlap.
    pub fraction_a: f64,
    /// Fraction of the second range inside the overlap.
    pub fraction_b: f64,
}

/// Intersects two column ranges.
///
/// When the values are not range-scalable (strings) a partial overlap is
/// not interpolated and both fractions fall back to the default coefficient.
#[must_use]
pub fn intersect_range(
    a: &ValueRange,
    b: &ValueRange,
    scalable: bool,
    config: &SelectivityConfig,
) -> RangeIntersection {
    let range = a.intersect(b);
    if range.is_empty() {
        return RangeIntersection {
            range,
            fraction_a: 0.0,
            fraction_b: 0.0,
        };
    }

    let fraction = |own: &ValueRange, other: &ValueRange| {
        let covered = own.overlap_with(other, config);
        if !scalable && covered < 1.0 {
            config.default_inequality_coefficient
        } else {
            floor_fraction(covered, config)
        }
    };

    RangeIntersection {
        range,
        fraction_a: fraction(a, b),
        fraction_b: fraction(b, a),
    }
}

/// An interval of accepted values with open or closed ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound, `-inf` if none.
    pub low: f64,
    /// Whether `low` itself is accepted.
    pub low_inclusive: bool,
    /// Upper bound, `+inf` if none.
    pub high: f64,
    /// Whether `high` itself is accepted.
    pub high_inclusive: bool,
}

impl Interval {
    /// The interval accepting every value.
    #[must_use]
    pub fn all() -> Self {
        Self {
            low: f64::NEG_INFINITY,
            low_inclusive: true,
            high: f64::INFINITY,
            high_inclusive: true,
        }
    }

    /// The interval of values `v` with `v op bound`.
    #[must_use]
    pub fn from_op(op: RangeOp, bound: f64) -> Self {
        let all = Self::all();
        match op {
            RangeOp::Lt | RangeOp::Le => Self {
                high: bound,
                high_inclusive: op == RangeOp::Le,
                ..all
            },
            RangeOp::Gt | RangeOp::Ge => Self {
                low: bound,
                low_inclusive: op == RangeOp::Ge,
                ..all
            },
        }
    }

    /// Values accepted by both intervals.
    #[must_use]
    pub fn intersect(&self, other: &Interval) -> Interval {
        let (low, low_inclusive) = if self.low > other.low {
            (self.low, self.low_inclusive)
        } else if other.low > self.low {
            (other.low, other.low_inclusive)
        } else {
            (self.low, self.low_inclusive && other.low_inclusive)
        };
        let (high, high_inclusive) = if self.high < other.high {
            (self.high, self.high_inclusive)
        } else if other.high < self.high {
            (other.high, other.high_inclusive)
        } else {
            (self.high, self.high_inclusive && other.high_inclusive)
        };
        Interval {
            low,
            low_inclusive,
            high,
            high_inclusive,
        }
    }

    /// Returns true if `value` lies in the interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let above = value > self.low || (self.low_inclusive && value == self.low);
        let below = value < self.high || (self.high_inclusive && value == self.high);
        above && below
    }
}

/// How an [`Interval`] covers a column range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coverage {
    /// No recorded value satisfies the interval.
    Disjoint,
    /// The interval only touches the range at an excluded endpoint, e.g.
    /// `a > max`.
    Boundary {
        /// The touched endpoint.
        value: f64,
    },
    /// The interval touches the range at a single accepted value, e.g.
    /// `a >= max`; behaves like an equality.
    Point {
        /// The accepted value.
        value: f64,
        /// Selectivity among non-null rows.
        fraction: f64,
    },
    /// The interval keeps `[low, high]` of the range.
    Partial {
        /// New lower bound.
        low: f64,
        /// New upper bound.
        high: f64,
        /// Selectivity among non-null rows.
        fraction: f64,
    },
}

/// Computes how `interval` covers `range`.
#[must_use]
pub fn interval_coverage(
    range: &ValueRange,
    interval: &Interval,
    scalable: bool,
    config: &SelectivityConfig,
) -> Coverage {
    if range.is_empty() || interval.low.is_nan() || interval.high.is_nan() {
        return Coverage::Disjoint;
    }
    if range.is_point() {
        return if interval.contains(range.low) {
            Coverage::Partial {
                low: range.low,
                high: range.high,
                fraction: 1.0,
            }
        } else {
            Coverage::Disjoint
        };
    }

    let low = range.low.max(interval.low);
    let high = range.high.min(interval.high);
    if low > high {
        return Coverage::Disjoint;
    }
    if low == high {
        if !low.is_finite() {
            return Coverage::Disjoint;
        }
        return if interval.contains(low) {
            Coverage::Point {
                value: low,
                fraction: equality_selectivity(range.ndv, config),
            }
        } else {
            Coverage::Boundary { value: low }
        };
    }
    if low == range.low && high == range.high {
        return Coverage::Partial {
            low,
            high,
            fraction: 1.0,
        };
    }

    let fraction = if !range.is_bounded() || !scalable {
        config.default_inequality_coefficient
    } else {
        // Cut the lower end first, then the upper end of what remains.
        let lower_op = if interval.low_inclusive { RangeOp::Ge } else { RangeOp::Gt };
        let upper_op = if interval.high_inclusive { RangeOp::Le } else { RangeOp::Lt };
        let above = overlap_fraction(range.low, range.high, interval.low, lower_op, config);
        let below = overlap_fraction(low, range.high, interval.high, upper_op, config);
        floor_fraction(above * below, config)
    };
    Coverage::Partial {
        low,
        high,
        fraction,
    }
}
