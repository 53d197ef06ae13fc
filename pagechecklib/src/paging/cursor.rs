//! The lazy result cursor a paged query hands back.

use crate::value::Row;

/// A lazily fetched, network-backed query result.
///
/// Rows arrive in batches ("pages"): one fetch fills a client-side buffer
/// that is then drained row by row without further round-trips.
///
/// # Precondition
///
/// After `is_exhausted()` returns `false`, at least one row must be buffered
/// (`available_without_fetching() > 0`). A cursor that can complete a fetch
/// with zero rows has to report itself exhausted instead. [`PageStream`]
/// rejects a page that drains with no rows as
/// [`PagecheckError::EmptyPage`](crate::PagecheckError::EmptyPage).
///
/// [`PageStream`]: crate::paging::PageStream
pub trait Cursor {
    /// Error raised by a fetch
    type Error: std::error::Error + 'static;

    /// Names of the result columns, in row order.
    fn columns(&self) -> &[String];

    /// Whether every row has been delivered.
    ///
    /// May block on a fetch when the buffer is empty and more rows could
    /// exist on the server.
    fn is_exhausted(&mut self) -> Result<bool, Self::Error>;

    /// Rows already buffered client-side.
    fn available_without_fetching(&self) -> usize;

    /// Next row, fetching another page first if the buffer is empty.
    fn next_row(&mut self) -> Result<Option<Row>, Self::Error>;

    /// Requested rows per fetch for future fetches.
    ///
    /// The meaning of `n <= 0` is up to the implementation.
    fn set_fetch_size(&mut self, n: i32);
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Error = C::Error;

    fn columns(&self) -> &[String] {
        (**self).columns()
    }

    fn is_exhausted(&mut self) -> Result<bool, Self::Error> {
        (**self).is_exhausted()
    }

    fn available_without_fetching(&self) -> usize {
        (**self).available_without_fetching()
    }

    fn next_row(&mut self) -> Result<Option<Row>, Self::Error> {
        (**self).next_row()
    }

    fn set_fetch_size(&mut self, n: i32) {
        (**self).set_fetch_size(n)
    }
}
