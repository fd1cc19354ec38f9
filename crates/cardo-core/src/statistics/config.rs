//! Selectivity constants and their configuration.
//!
//! # Example
//!
//! ```
//! use cardo_core::statistics::SelectivityConfig;
//!
//! let config = SelectivityConfig::new()
//!     .with_default_coefficient(0.4)
//!     .with_range_threshold(1e-5);
//! assert!(config.validate().is_ok());
//! ```

use cardo_common::utils::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Selectivity used whenever a comparison cannot be estimated from data.
pub const DEFAULT_INEQUALITY_COEFFICIENT: f64 = 0.5;

/// Smallest selectivity a non-empty range predicate can have.
pub const RANGE_SELECTIVITY_THRESHOLD: f64 = 1e-4;

/// Selectivity of a LIKE pattern over non-null rows.
pub const DEFAULT_LIKE_SELECTIVITY: f64 = 0.2;

/// Below this distinct count `1/ndv` is not trusted for equality.
pub const MIN_EQUALITY_NDV: f64 = 1.0;

/// Tunable selectivity constants.
///
/// Every field has a default, so partial documents deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectivityConfig {
    /// Fallback selectivity for comparisons without usable statistics.
    pub default_inequality_coefficient: f64,
    /// Floor applied to non-zero range fractions.
    pub range_selectivity_threshold: f64,
    /// Minimum distinct count for which `1/ndv` is used.
    pub min_equality_ndv: f64,
    /// Selectivity of LIKE over non-null rows.
    pub like_selectivity: f64,
    /// Re-estimate against delta rows when a predicate falls outside the
    /// recorded range.
    pub delta_row_fallback: bool,
}

impl SelectivityConfig {
    /// Creates a configuration with the default constants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_inequality_coefficient: DEFAULT_INEQUALITY_COEFFICIENT,
            range_selectivity_threshold: RANGE_SELECTIVITY_THRESHOLD,
            min_equality_ndv: MIN_EQUALITY_NDV,
            like_selectivity: DEFAULT_LIKE_SELECTIVITY,
            delta_row_fallback: true,
        }
    }

    /// Sets the default comparison coefficient.
    #[must_use]
    pub fn with_default_coefficient(mut self, coefficient: f64) -> Self {
        self.default_inequality_coefficient = coefficient;
        self
    }

    /// Sets the range selectivity floor.
    #[must_use]
    pub fn with_range_threshold(mut self, threshold: f64) -> Self {
        self.range_selectivity_threshold = threshold;
        self
    }

    /// Sets the minimum trusted distinct count for equality.
    #[must_use]
    pub fn with_min_equality_ndv(mut self, ndv: f64) -> Self {
        self.min_equality_ndv = ndv;
        self
    }

    /// Sets the LIKE selectivity.
    #[must_use]
    pub fn with_like_selectivity(mut self, selectivity: f64) -> Self {
        self.like_selectivity = selectivity;
        self
    }

    /// Enables or disables the delta-row fallback.
    #[must_use]
    pub fn with_delta_row_fallback(mut self, enabled: bool) -> Self {
        self.delta_row_fallback = enabled;
        self
    }

    /// Checks that every constant is in range.
    ///
    /// Coefficients must lie in `(0, 1]`, the range threshold in `[0, 1)`,
    /// and the minimum equality ndv must be positive and finite.
    pub fn validate(&self) -> Result<()> {
        check_coefficient(
            "default_inequality_coefficient",
            self.default_inequality_coefficient,
        )?;
        check_coefficient("like_selectivity", self.like_selectivity)?;

        let threshold = self.range_selectivity_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(Error::InvalidConfig(format!(
                "range_selectivity_threshold must be in [0, 1), got {threshold}"
            )));
        }
        if !(self.min_equality_ndv.is_finite() && self.min_equality_ndv > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_equality_ndv must be positive, got {}",
                self.min_equality_ndv
            )));
        }
        Ok(())
    }
}

fn check_coefficient(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be in (0, 1], got {value}"
        )))
    }
}

impl Default for SelectivityConfig {
    fn default() -> Self {
        Self::new()
    }
}
