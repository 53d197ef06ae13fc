//! Template contexts for text output

use console::Style;
use outstanding::Theme;
use pagechecklib::{DataTable, TableRow};
use serde::Serialize;

/// Include templates at compile time
pub const EXPAND_TEMPLATE: &str = include_str!("../templates/expand.jinja");
pub const PAGE_TEMPLATE: &str = include_str!("../templates/page.jinja");

/// Row data for template rendering (pre-formatted)
#[derive(Debug, Serialize)]
pub struct TemplateRow {
    /// Pre-padded label (left-aligned)
    pub label: String,
    /// Pre-padded cells (left-aligned, padded to column width)
    pub cells: Vec<String>,
}

/// Data context for the table templates
#[derive(Debug, Serialize)]
pub struct TableContext {
    pub title: Option<String>,
    pub header: TemplateRow,
    /// Separator line (dashes)
    pub separator: String,
    pub rows: Vec<TemplateRow>,
    pub footer: TemplateRow,
}

/// Create the theme with styles
pub fn create_theme() -> Theme {
    Theme::new().add("category", Style::new().bold())
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

/// Pre-format a table: every column padded to its widest cell.
pub fn table_context(table: &DataTable) -> TableContext {
    let all_rows = || table.rows.iter().chain(std::iter::once(&table.footer));

    let label_width = all_rows()
        .map(|r| r.label.len())
        .chain(table.headers.first().map(String::len))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = table
        .headers
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, header)| {
            all_rows()
                .filter_map(|r| r.values.get(i))
                .map(String::len)
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |row: &TableRow| TemplateRow {
        label: pad(&row.label, label_width),
        cells: row
            .values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| pad(value, width))
            .collect(),
    };

    let header = TemplateRow {
        label: pad(table.headers.first().map(String::as_str).unwrap_or(""), label_width),
        cells: table
            .headers
            .iter()
            .skip(1)
            .zip(&widths)
            .map(|(h, &width)| pad(h, width))
            .collect(),
    };
    let separator = "-".repeat(label_width + widths.iter().map(|w| w + 3).sum::<usize>());

    TableContext {
        title: table.title.clone(),
        header,
        separator,
        rows: table.rows.iter().map(&format_row).collect(),
        footer: format_row(&table.footer),
    }
}
