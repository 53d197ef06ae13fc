//! Construction-time configuration.
//!
//! Everything the harness needs to know about its environment is passed in
//! explicitly through these types; nothing is read from the process
//! environment or from files.

use serde::{Deserialize, Serialize};

/// Fetch size the store uses when a query asks for zero or fewer rows per fetch.
pub const DEFAULT_FETCH_SIZE: usize = 5000;

/// Configuration for a [`MemoryStore`](crate::memory::MemoryStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Rows per fetch for queries without a positive fetch size
    pub default_fetch_size: usize,
    /// Primary key length used by tables created from fixture headers
    pub key_columns: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_fetch_size: DEFAULT_FETCH_SIZE,
            key_columns: 1,
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the default fetch size
    pub fn with_default_fetch_size(mut self, size: usize) -> Self {
        self.default_fetch_size = size;
        self
    }

    /// Builder: set the primary key length for fixture tables
    pub fn with_key_columns(mut self, key_columns: usize) -> Self {
        self.key_columns = key_columns;
        self
    }
}
