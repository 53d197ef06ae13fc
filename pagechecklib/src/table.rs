//! Presentation-ready views of fixtures and pages.
//!
//! `DataTable` is what templates iterate over: headers, pre-rendered rows,
//! and a footer. `PagingReport` summarises one paged query against its
//! baseline. Neither does any computation at render time.

use serde::Serialize;

use crate::compare::{compare_ignore_order, compare_subset};
use crate::error::RowSetMismatch;
use crate::fixture::parser::TableSpec;
use crate::paging::{Cursor, Page, PageStream};
use crate::value::Row;

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Row label ("line 3", "page 2", "Total (5 rows)", ...)
    pub label: String,
    /// Cell values, ready for display
    pub values: Vec<String>,
}

/// Table-ready row data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers: [label_header, column1, column2, ...]
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub footer: TableRow,
}

fn render(row: &Row) -> Vec<String> {
    row.iter().map(|v| v.to_string()).collect()
}

impl DataTable {
    /// The expanded rows of a fixture, labelled by source line.
    pub fn from_spec(spec: &TableSpec) -> Self {
        let mut headers = vec!["Line".to_string()];
        headers.extend(spec.header.iter().cloned());

        let rows = spec
            .rows
            .iter()
            .map(|row| TableRow {
                label: format!("line {}", row.line),
                values: row.cells.clone(),
            })
            .collect();

        DataTable {
            title: None,
            headers,
            rows,
            footer: TableRow {
                label: format!("Total ({} rows)", spec.row_count()),
                values: vec![String::new(); spec.column_count()],
            },
        }
    }

    /// Every row of every page, labelled by page number.
    pub fn from_pages(columns: &[String], pages: &[Page]) -> Self {
        let mut headers = vec!["Page".to_string()];
        headers.extend(columns.iter().cloned());

        let rows = pages
            .iter()
            .flat_map(|page| {
                page.rows().iter().map(move |row| TableRow {
                    label: format!("page {}", page.number()),
                    values: render(row),
                })
            })
            .collect::<Vec<_>>();

        DataTable {
            title: None,
            footer: TableRow {
                label: format!("Total ({} pages)", pages.len()),
                values: vec![String::new(); columns.len()],
            },
            headers,
            rows,
        }
    }

    /// Builder: set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Outcome of paging one query against a fixture baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagingReport {
    pub page_count: usize,
    pub page_sizes: Vec<usize>,
    pub total_rows: usize,
    pub baseline_rows: usize,
    /// Whether the paged rows passed the comparison against the baseline
    pub matches: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<RowSetMismatch>,
}

impl PagingReport {
    /// Summarise the pages accumulated so far: the paged rows must equal
    /// `baseline` as a set.
    pub fn new<C: Cursor>(stream: &PageStream<C>, baseline: &[Row]) -> Self {
        let rows = stream.flattened_rows();
        let mismatch = compare_ignore_order(baseline, &rows).err();
        Self::build(stream, baseline, rows.len(), mismatch)
    }

    /// Like [`PagingReport::new`], but the paged rows only need to be a
    /// subset of `baseline` (for limited queries).
    pub fn within<C: Cursor>(stream: &PageStream<C>, baseline: &[Row]) -> Self {
        let rows = stream.flattened_rows();
        let mismatch = compare_subset(&rows, baseline).err();
        Self::build(stream, baseline, rows.len(), mismatch)
    }

    fn build<C: Cursor>(
        stream: &PageStream<C>,
        baseline: &[Row],
        total_rows: usize,
        mismatch: Option<RowSetMismatch>,
    ) -> Self {
        PagingReport {
            page_count: stream.page_count(),
            page_sizes: stream.results_per_page(),
            total_rows,
            baseline_rows: baseline.len(),
            matches: mismatch.is_none(),
            mismatch,
        }
    }
}
