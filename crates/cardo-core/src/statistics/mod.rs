//! Statistics for cost-based filter estimation.
//!
//! This module provides:
//! - Columns: distinct values, null count, min/max, average width
//! - Snapshots: row counts plus a record per column or derived expression
//! - Ranges: overlap fractions, intersections, equality selectivity
//! - Tuning: the named selectivity constants and their configuration

mod column;
mod config;
mod range;
mod snapshot;

pub use column::{ColumnStatistic, ColumnStatisticBuilder};
pub use config::{
    DEFAULT_INEQUALITY_COEFFICIENT, DEFAULT_LIKE_SELECTIVITY, MIN_EQUALITY_NDV,
    RANGE_SELECTIVITY_THRESHOLD, SelectivityConfig,
};
pub use range::{
    Coverage, Interval, RangeIntersection, RangeOp, ValueRange, equality_selectivity,
    intersect_range, interval_coverage, overlap_fraction,
};
pub use snapshot::{Statistics, StatisticsBuilder};
