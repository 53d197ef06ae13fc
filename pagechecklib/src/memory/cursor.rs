//! Paged cursor over a live in-memory table.

use std::collections::VecDeque;
use std::ops::Bound;

use tracing::debug;

use super::Shared;
use crate::error::PagecheckError;
use crate::paging::cursor::Cursor;
use crate::value::{Row, Value};
use crate::Result;

#[derive(Debug, Clone)]
pub(crate) struct Query {
    pub(crate) table: String,
    /// Table positions of the selected columns
    pub(crate) positions: Vec<usize>,
    /// Equality conditions by table position
    pub(crate) filter: Vec<(usize, Value)>,
    pub(crate) limit: Option<usize>,
}

pub(crate) fn matches(row: &Row, filter: &[(usize, Value)]) -> bool {
    filter
        .iter()
        .all(|(position, value)| row.get(*position) == Some(value))
}

/// Result of a statement run against a [`MemoryStore`](super::MemoryStore).
///
/// Fetches at most `fetch_size` rows per round-trip. A fetch ends the result
/// when it comes back short, when the limit is reached, or when no matching
/// row remains behind it, so a fetch never leaves the cursor both
/// non-exhausted and empty.
#[derive(Debug)]
pub struct MemoryCursor {
    shared: Option<Shared>,
    query: Option<Query>,
    columns: Vec<String>,
    fetch_size: i32,
    default_fetch_size: usize,
    buffer: VecDeque<Row>,
    after: Option<Vec<Value>>,
    delivered: usize,
    fetches: usize,
    done: bool,
}

impl MemoryCursor {
    pub(crate) fn new(
        shared: Shared,
        query: Query,
        columns: Vec<String>,
        fetch_size: i32,
        default_fetch_size: usize,
    ) -> Self {
        Self {
            shared: Some(shared),
            query: Some(query),
            columns,
            fetch_size,
            default_fetch_size,
            buffer: VecDeque::new(),
            after: None,
            delivered: 0,
            fetches: 0,
            done: false,
        }
    }

    /// Result of a statement that returns no rows.
    pub(crate) fn empty() -> Self {
        Self {
            shared: None,
            query: None,
            columns: Vec::new(),
            fetch_size: 0,
            default_fetch_size: 0,
            buffer: VecDeque::new(),
            after: None,
            delivered: 0,
            fetches: 0,
            done: true,
        }
    }

    /// Whether the server side has nothing more to send.
    pub fn is_fully_fetched(&self) -> bool {
        self.done
    }

    /// Number of round-trips made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    fn page_size(&self) -> usize {
        if self.fetch_size > 0 {
            self.fetch_size as usize
        } else {
            self.default_fetch_size.max(1)
        }
    }

    /// One round-trip: read the next batch from the live table.
    pub(crate) fn fetch(&mut self) -> Result<()> {
        if self.done {
            return Ok(());
        }
        let (Some(shared), Some(query)) = (self.shared.as_ref(), self.query.as_ref()) else {
            return Ok(());
        };

        let requested = match query.limit {
            Some(limit) => self.page_size().min(limit.saturating_sub(self.delivered)),
            None => self.page_size(),
        };

        let state = shared.read();
        state.check_available()?;
        let table = state.table(&query.table)?;

        let lower = match &self.after {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };
        let mut remaining = table
            .rows
            .range((lower, Bound::Unbounded))
            .filter(|(_, row)| matches(row, &query.filter));

        let mut fetched = 0;
        for (key, row) in remaining.by_ref().take(requested) {
            let projected = query
                .positions
                .iter()
                .map(|&p| row.get(p).cloned().unwrap_or(Value::Null))
                .collect();
            self.buffer.push_back(projected);
            self.after = Some(key.clone());
            fetched += 1;
        }
        let nothing_behind = remaining.next().is_none();
        drop(state);

        self.fetches += 1;
        self.delivered += fetched;
        let limit_reached = query.limit.is_some_and(|l| self.delivered >= l);
        self.done = fetched < requested || limit_reached || nothing_behind;

        debug!(
            target: "pagecheck::memory",
            table = %query.table,
            fetch = self.fetches,
            rows = fetched,
            done = self.done,
            "fetch"
        );
        Ok(())
    }
}

impl Cursor for MemoryCursor {
    type Error = PagecheckError;

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn is_exhausted(&mut self) -> Result<bool> {
        if !self.buffer.is_empty() {
            return Ok(false);
        }
        if !self.done {
            self.fetch()?;
        }
        Ok(self.buffer.is_empty())
    }

    fn available_without_fetching(&self) -> usize {
        self.buffer.len()
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.buffer.is_empty() && !self.done {
            self.fetch()?;
        }
        Ok(self.buffer.pop_front())
    }

    fn set_fetch_size(&mut self, n: i32) {
        self.fetch_size = n;
    }
}
