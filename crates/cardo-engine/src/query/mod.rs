//! Query-side types.
//!
//! - [`predicate`] - Bound predicate trees
//! - [`optimizer`] - Cardinality and selectivity estimation

pub mod optimizer;
pub mod predicate;
