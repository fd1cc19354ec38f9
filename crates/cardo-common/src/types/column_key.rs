//! Identity of a column or computed expression inside a statistics snapshot.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Key under which a column statistic is stored.
///
/// For plain columns this is the column name; for derived expressions it is
/// the canonical rendering of the expression, e.g. `CAST(a AS DOUBLE)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey(Arc<str>);

impl ColumnKey {
    /// Creates a key from a column name or expression rendering.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ColumnKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
