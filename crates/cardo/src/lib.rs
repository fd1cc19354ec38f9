//! # Cardo
//!
//! Cardinality and selectivity estimation for cost-based SQL optimizers.
//!
//! Start with [`FilterEstimator`]: hand it a predicate tree and the
//! [`Statistics`] of the filter's input, and it returns the statistics of
//! the output, with the row count estimated and every column record
//! narrowed to what can survive the predicate.
//!
//! ## Quick Start
//!
//! ```rust
//! use cardo::{ColumnStatistic, DataType, Expression, FilterEstimator, Statistics};
//!
//! // A thousand orders, a tenth of them without a discount code
//! let stats = Statistics::builder(1000.0)
//!     .with_column(
//!         "amount",
//!         ColumnStatistic::builder(1000.0)
//!             .with_ndv(1000.0)
//!             .with_range(0.0, 1000.0)
//!             .build(),
//!     )
//!     .with_column(
//!         "discount",
//!         ColumnStatistic::builder(1000.0)
//!             .with_ndv(10.0)
//!             .with_nulls(100.0)
//!             .with_range(1.0, 10.0)
//!             .build(),
//!     )
//!     .build();
//!
//! let amount = Expression::column("amount", DataType::Int);
//! let discount = Expression::column("discount", DataType::Int);
//! let predicate = Expression::and([
//!     amount.gt(Expression::literal(500)),
//!     discount.is_not_null(),
//! ]);
//!
//! let out = FilterEstimator::new().estimate(&predicate, &stats);
//! assert!((out.row_count() - 450.0).abs() < 1e-6);
//! assert_eq!(out.column("discount").map(ColumnStatistic::num_nulls), Some(0.0));
//! ```
//!
//! ## Tuning
//!
//! The fallback constants live in [`SelectivityConfig`]; an estimator built
//! with [`FilterEstimator::with_config`] rejects values outside `[0, 1]`.

// Estimation
pub use cardo_engine::{ColumnRef, ComparisonOp, Expression, FilterEstimator, ScalarFunction};

// Statistics you feed in and get back
pub use cardo_core::statistics::{
    ColumnStatistic, ColumnStatisticBuilder, SelectivityConfig, Statistics, StatisticsBuilder,
    ValueRange,
};

// Values, types and errors
pub use cardo_common::types::{ColumnKey, DataType, Literal};
pub use cardo_common::utils::error::{Error, Result};
