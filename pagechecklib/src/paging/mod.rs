//! Paging: turn a lazy result cursor into inspectable pages.
//!
//! This module handles the query side of a paging test. It provides:
//!
//! - **Cursor**: the collaborator contract a paged result must satisfy
//! - **Projection**: typed, pre-resolved column extraction (`ColumnSpec`)
//! - **PageStream**: pages, page statistics and flattened data
//!
//! ## Example
//!
//! ```rust
//! use pagechecklib::paging::{ColumnSpec, PageStream};
//! use pagechecklib::MemoryStore;
//!
//! let store = MemoryStore::default();
//! store.create_table("t", &["id", "value"], 1).unwrap();
//! for id in 1..=9 {
//!     store.query(&format!("INSERT INTO t (id, value) VALUES ({}, 'v')", id), 0).unwrap();
//! }
//!
//! let cursor = store.query("SELECT * FROM t", 5).unwrap();
//! let mut stream = PageStream::with_columns(cursor, vec![
//!     ColumnSpec::int("id"),
//!     ColumnSpec::text("value"),
//! ]).unwrap();
//! stream.get_all_pages().unwrap();
//! assert_eq!(stream.results_per_page(), vec![5, 4]);
//! ```

pub mod cursor;
pub mod projection;
pub mod stream;

pub use cursor::Cursor;
pub use projection::{ColumnSpec, ColumnType, Projection};
pub use stream::{Page, PageFetcher, PageStream, StreamState};
