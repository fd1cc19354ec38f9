//! Core type definitions for Cardo.
//!
//! - Values ([`Literal`]) and their numeric encoding
//! - SQL types ([`DataType`])
//! - Column and expression identity ([`ColumnKey`])

mod column_key;
mod data_type;
mod literal;

pub use column_key::ColumnKey;
pub use data_type::DataType;
pub use literal::{Literal, encode_string};
