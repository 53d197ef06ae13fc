//! # pagechecklib
//!
//! A harness for testing paged query results: declare fixture rows as text,
//! load them into a store, page through a query, and check what came back.
//!
//! ## Overview
//!
//! Paging bugs hide at page boundaries, so a paging test needs to see the
//! pages themselves, not just the final rows. This library splits a test
//! into three stages:
//!
//! - **Fixture**: pipe-delimited tables with `*N` multiplier rows, per-column
//!   formatters, and one insertion command per row ([`fixture`])
//! - **Paging**: a [`PageStream`] that groups a cursor's rows into the pages
//!   it actually fetched ([`paging`])
//! - **Comparison**: order-independent set and multiset checks over rows
//!   ([`compare`])
//!
//! The store and its cursors are collaborators behind the [`Executor`] and
//! [`Cursor`] traits. [`MemoryStore`] is an in-memory implementation with
//! real fetch boundaries, used by the `pagecheck` CLI and the test suite.
//!
//! ## Example
//!
//! ```rust
//! use pagechecklib::{
//!     assert_equal_ignore_order, create_rows, parse_table, Formatter, FormatterSet,
//!     MemoryStore, PageStream, StoreOptions,
//! };
//!
//! let mut store = MemoryStore::new(StoreOptions::default());
//! let spec = parse_table("
//!     | id | value |
//!     | 1  | 'a'   |
//!     | 2  | 'b'   |
//!     | 3  | 'c'   |
//!     | 4  | 'd'   |
//!     | 5  | 'e'   |
//! ").unwrap();
//! store.create_table_for("paging_test", &spec).unwrap();
//! let formatters = FormatterSet::uniform(Formatter::literal(), spec.column_count());
//! let expected = create_rows(spec, &mut store, "paging_test", Some(&formatters)).unwrap();
//!
//! let cursor = store.query("SELECT * FROM paging_test", 2).unwrap();
//! let mut stream = PageStream::new(cursor);
//! stream.get_all_pages().unwrap();
//!
//! assert_eq!(stream.results_per_page(), vec![2, 2, 1]);
//! assert_equal_ignore_order(&expected, &stream.flattened_rows());
//! ```

pub mod compare;
pub mod error;
pub mod fixture;
pub mod memory;
pub mod options;
pub mod paging;
pub mod table;
pub mod value;

pub use compare::{
    assert_equal_ignore_order, assert_same_rows, assert_subset, canonical_set,
    compare_ignore_order, compare_multiset, compare_subset, CanonicalRow, KEY_SEPARATOR,
};
pub use error::{DriveError, PagecheckError, RowSetMismatch};
pub use fixture::{
    create_rows, insert_command, parse_rows, parse_table, DataTableParser, Executor, Formatter,
    FormatterSet, TableSpec,
};
pub use memory::{MemoryCursor, MemoryStore};
pub use options::{StoreOptions, DEFAULT_FETCH_SIZE};
pub use paging::{ColumnSpec, ColumnType, Cursor, Page, PageFetcher, PageStream, StreamState};
pub use table::{DataTable, PagingReport, TableRow};
pub use value::{Row, Value};

/// Result type for pagechecklib operations
pub type Result<T> = std::result::Result<T, PagecheckError>;
