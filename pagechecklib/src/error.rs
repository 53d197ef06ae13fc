//! Error types for pagechecklib

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the harness itself (parsing, formatting, projection and
/// the in-memory stand-in store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagecheckError {
    /// A fixture table has no header line
    #[error("fixture table is empty: no header line found")]
    MissingHeader,

    /// A data row does not have as many cells as the header
    #[error("malformed table at line {line}: expected {expected} cells, found {found}")]
    MalformedTable {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A formatter rejected a cell
    #[error("cannot format '{value}': {message}")]
    Format { value: String, message: String },

    /// A projected column is not part of the cursor's result columns
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A projected column holds a value of the wrong type
    #[error("column '{column}' expected {expected}, found {found}")]
    ColumnType {
        column: String,
        expected: String,
        found: String,
    },

    /// The cursor drained its buffer without delivering a single row
    #[error("cursor reported buffered rows but delivered none (page {page})")]
    EmptyPage { page: usize },

    /// An earlier page failed after consuming rows; the stream cannot continue
    #[error("page stream failed before page {page}; see unprojected rows")]
    StreamFailed { page: usize },

    /// A statement could not be parsed by the in-memory store
    #[error("invalid statement '{statement}': {message}")]
    Statement { statement: String, message: String },

    /// Table does not exist in the in-memory store
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// Table already exists in the in-memory store
    #[error("table '{0}' already exists")]
    TableExists(String),

    /// The in-memory store is simulating an unavailable node
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Error from an operation that drives an external collaborator.
///
/// Collaborator errors are carried unchanged so callers can match on their
/// own error kinds.
#[derive(Error, Debug)]
pub enum DriveError<E>
where
    E: std::error::Error + 'static,
{
    /// Raised by the harness
    #[error(transparent)]
    Harness(#[from] PagecheckError),

    /// Raised by the executor or cursor
    #[error("collaborator failed: {0}")]
    Collaborator(#[source] E),
}

impl<E> DriveError<E>
where
    E: std::error::Error + 'static,
{
    /// The collaborator's error, if this is one.
    pub fn collaborator(&self) -> Option<&E> {
        match self {
            DriveError::Collaborator(e) => Some(e),
            DriveError::Harness(_) => None,
        }
    }
}

/// Two row collections did not compare equal.
///
/// Keys are canonical row keys rendered with `" | "` between columns.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("row sets differ: missing {missing:?}, unexpected {unexpected:?}")]
pub struct RowSetMismatch {
    /// Expected rows absent from the actual rows
    pub missing: Vec<String>,
    /// Actual rows that were not expected
    pub unexpected: Vec<String>,
}
