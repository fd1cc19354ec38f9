//! # cardo-common
//!
//! Foundation layer for Cardo: literal values, SQL data types, column keys,
//! and the shared error type.
//!
//! This crate has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions (Literal, DataType, ColumnKey)
//! - [`utils`] - Utility functions and helpers (errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::{ColumnKey, DataType, Literal};
pub use utils::error::{Error, Result};
