//! Error types shared by every Cardo crate.
//!
//! Estimation itself never fails. Errors only come out of the construction
//! paths at the catalog boundary: parsing literals, validating statistics,
//! and validating configuration.

use thiserror::Error;

/// Result type alias using the Cardo [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised while building estimator inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A literal could not be parsed into the requested type.
    #[error("invalid literal '{literal}': expected {expected}")]
    InvalidLiteral {
        /// The offending input text.
        literal: String,
        /// What the input was expected to look like.
        expected: &'static str,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A column statistic violates its invariants.
    #[error("invalid statistic: {0}")]
    InvalidStatistic(String),
}
