//! Optimizer statistics derivation.
//!
//! ## Submodules
//!
//! - [`filter_estimation`] - Row count and column statistics after a filter

pub mod filter_estimation;

pub use filter_estimation::FilterEstimator;
