//! Grouping a cursor's rows into pages.
//!
//! A page is everything the cursor delivers between two fetches: the stream
//! pulls rows while the cursor still has them buffered and closes the page as
//! soon as the buffer drains. Pages are owned copies, so later changes to the
//! underlying data never reach a page that has already been built.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{DriveError, PagecheckError};
use crate::paging::cursor::Cursor;
use crate::paging::projection::{ColumnSpec, Projection};
use crate::value::Row;
use crate::Result;

/// Rows delivered together by one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    number: usize,
    rows: Vec<Row>,
}

impl Page {
    /// 1-based position of the page in its stream.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lifecycle of a [`PageStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamState {
    /// No page requested yet
    Empty,
    /// Pulling rows for a page
    Fetching,
    /// A page was just completed; more may follow
    PageBoundary,
    /// The cursor has no more rows
    Exhausted,
    /// A page failed after rows were consumed; see
    /// [`PageStream::unprojected_rows`]
    Failed,
}

/// Pages accumulated from one query's cursor.
#[derive(Debug)]
pub struct PageStream<C: Cursor> {
    cursor: C,
    projection: Projection,
    pages: Vec<Page>,
    unprojected: Vec<Row>,
    state: StreamState,
}

/// Alias kept for callers that think of the stream as a page fetcher.
pub type PageFetcher<C> = PageStream<C>;

impl<C: Cursor> PageStream<C> {
    /// Page through `cursor`, keeping rows exactly as delivered.
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            projection: Projection::identity(),
            pages: Vec::new(),
            unprojected: Vec::new(),
            state: StreamState::Empty,
        }
    }

    /// Page through `cursor`, extracting and formatting `columns` from each row.
    ///
    /// Column names are resolved against the cursor once, here.
    pub fn with_columns(cursor: C, columns: Vec<ColumnSpec>) -> Result<Self> {
        let projection = Projection::resolve(cursor.columns(), columns)?;
        Ok(Self {
            projection,
            ..Self::new(cursor)
        })
    }

    /// Build the next page.
    ///
    /// Returns `None` when the cursor is already exhausted. The page's rows
    /// are drained before any is projected; if that fails once rows have
    /// been consumed, they are kept in [`PageStream::unprojected_rows`] and
    /// the stream stops in [`StreamState::Failed`].
    pub fn get_page(&mut self) -> std::result::Result<Option<&Page>, DriveError<C::Error>> {
        let number = self.pages.len() + 1;
        if self.state == StreamState::Failed {
            return Err(PagecheckError::StreamFailed { page: number }.into());
        }
        if self
            .cursor
            .is_exhausted()
            .map_err(DriveError::Collaborator)?
        {
            self.state = StreamState::Exhausted;
            return Ok(None);
        }

        let previous = self.state;
        self.state = StreamState::Fetching;
        let mut raw = Vec::new();
        while self.cursor.available_without_fetching() > 0 {
            match self.cursor.next_row() {
                Ok(Some(row)) => {
                    trace!(target: "pagecheck::paging", page = number, row = %row, "pulled row");
                    raw.push(row);
                }
                Ok(None) => break,
                Err(e) if raw.is_empty() => {
                    self.state = previous;
                    return Err(DriveError::Collaborator(e));
                }
                Err(e) => return Err(self.fail(raw, DriveError::Collaborator(e))),
            }
        }

        if raw.is_empty() {
            self.state = previous;
            return Err(PagecheckError::EmptyPage { page: number }.into());
        }

        let projected = raw
            .iter()
            .map(|row| self.projection.apply(row.clone()))
            .collect::<Result<Vec<_>>>();
        let rows = match projected {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(raw, e.into())),
        };

        debug!(target: "pagecheck::paging", page = number, rows = rows.len(), "page complete");
        self.pages.push(Page { number, rows });
        self.state = StreamState::PageBoundary;
        Ok(self.pages.last())
    }

    /// Keep consumed rows that could not become a page and stop the stream.
    fn fail(&mut self, raw: Vec<Row>, err: DriveError<C::Error>) -> DriveError<C::Error> {
        warn!(
            target: "pagecheck::paging",
            page = self.pages.len() + 1,
            rows = raw.len(),
            error = %err,
            "page failed after consuming rows"
        );
        self.unprojected.extend(raw);
        self.state = StreamState::Failed;
        err
    }

    /// Fetch pages until the cursor is exhausted; returns every page so far.
    pub fn get_all_pages(&mut self) -> std::result::Result<&[Page], DriveError<C::Error>> {
        while self.get_page()?.is_some() {}
        Ok(&self.pages)
    }

    /// Fetch pages until the cursor is exhausted; returns only the new pages.
    pub fn get_remaining_pages(&mut self) -> std::result::Result<&[Page], DriveError<C::Error>> {
        let start = self.pages.len();
        while self.get_page()?.is_some() {}
        Ok(&self.pages[start..])
    }

    /// Change the fetch size for the cursor's future fetches.
    pub fn set_fetch_size(&mut self, n: i32) {
        self.cursor.set_fetch_size(n);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of rows in the 1-based `page`.
    pub fn results_in_page(&self, page: usize) -> Option<usize> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(Page::len)
    }

    pub fn results_per_page(&self) -> Vec<usize> {
        self.pages.iter().map(Page::len).collect()
    }

    /// All rows retrieved so far, in delivery order.
    pub fn flattened_rows(&self) -> Vec<Row> {
        self.pages
            .iter()
            .flat_map(|page| page.rows.iter().cloned())
            .collect()
    }

    /// Rows consumed by a failed page, as delivered by the cursor.
    pub fn unprojected_rows(&self) -> &[Row] {
        &self.unprojected
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    pub fn into_cursor(self) -> C {
        self.cursor
    }
}
