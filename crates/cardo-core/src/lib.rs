//! # cardo-core
//!
//! Core layer for Cardo: the statistical summaries an optimizer keeps about
//! columns and the pure range arithmetic used to narrow them.
//!
//! This crate depends only on `cardo-common`.
//!
//! ## Modules
//!
//! - [`statistics`] - Column statistics, snapshots, range utilities, tuning knobs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod statistics;

// Re-export commonly used types
pub use statistics::{
    ColumnStatistic, ColumnStatisticBuilder, SelectivityConfig, Statistics, StatisticsBuilder,
    ValueRange,
};
