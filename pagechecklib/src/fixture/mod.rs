//! Fixture data: declare rows as text, load them, keep the baseline.
//!
//! This module handles the first stage of a paging test - putting known data
//! into the store. It provides:
//!
//! - **Parsing**: pipe-delimited tables with multiplier rows (`TableSpec`)
//! - **Formatting**: per-column cell conversions (`Formatter`, `FormatterSet`)
//! - **Loading**: one insertion command per row through an `Executor`
//!
//! ## Example
//!
//! ```rust
//! use pagechecklib::fixture::{parse_table, Formatter, FormatterSet};
//!
//! let spec = parse_table("
//!     |id | value |
//!     |*3 | 1 | 'x' |
//!     |2  | 'y'   |
//! ").unwrap();
//! assert_eq!(spec.row_count(), 4);
//!
//! let formatters = FormatterSet::new().with(Formatter::int()).with(Formatter::literal());
//! let rows = spec.materialize(Some(&formatters)).unwrap();
//! assert_eq!(rows[3].to_string(), "2 | y");
//! ```

pub mod formatter;
pub mod loader;
pub mod parser;

pub use formatter::{parse_literal, Formatter, FormatterSet};
pub use loader::{create_rows, insert_command, Executor};
pub use parser::{parse_rows, parse_table, DataRow, DataTableParser, TableSpec, DEFAULT_DELIMITER};
