//! # cardo-engine
//!
//! Filter estimation for Cardo: typed predicate trees and the estimator that
//! turns a predicate plus input statistics into output statistics.
//!
//! ## Modules
//!
//! - [`query`] - Predicate representation and optimizer-side estimation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod query;

pub use query::optimizer::FilterEstimator;
pub use query::predicate::{ColumnRef, ComparisonOp, Expression, ScalarFunction};
