//! Pipe-delimited fixture tables.
//!
//! ```text
//! |id | value    |
//! |1  | 'first'  |
//! |*3 | 2 | 'x' |    <- three copies of (2, 'x')
//! |4*2| 'y'      |    <- two copies of (4, 'y')
//! ```
//!
//! Every physical line is trimmed of whitespace and then of leading and
//! trailing delimiters; blank lines are dropped. The first remaining line is
//! the header. A data row whose first cell ends in `*<digits>` is a
//! multiplier row: the marker is removed (together with the cell when
//! nothing else is left in it) and the rest of the row is expanded that many
//! times. Expansion recurses, so `*2|*3|...` yields six rows.

use serde::Serialize;
use tracing::debug;

use crate::error::PagecheckError;
use crate::fixture::formatter::FormatterSet;
use crate::value::{Row, Value};
use crate::Result;

/// Default cell delimiter.
pub const DEFAULT_DELIMITER: char = '|';

/// One expanded data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataRow {
    /// 1-based source line the row was expanded from
    pub line: usize,
    /// Trimmed cells, one per header column
    pub cells: Vec<String>,
}

/// A parsed fixture table: header plus expanded data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    /// Column names
    pub header: Vec<String>,
    /// Data rows, multiplier rows already expanded
    pub rows: Vec<DataRow>,
}

impl TableSpec {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Apply formatters positionally to every row.
    ///
    /// Without formatters each cell is kept verbatim as a [`Value::Literal`].
    pub fn materialize(&self, formatters: Option<&FormatterSet>) -> Result<Vec<Row>> {
        self.rows
            .iter()
            .map(|row| match formatters {
                Some(set) => set.format_row(&row.cells),
                None => Ok(row
                    .cells
                    .iter()
                    .map(|c| Value::Literal(c.clone()))
                    .collect()),
            })
            .collect()
    }
}

/// Parser for fixture tables.
#[derive(Debug, Clone, Copy)]
pub struct DataTableParser {
    delimiter: char,
}

impl Default for DataTableParser {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl DataTableParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: use a different cell delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a fixture table.
    pub fn parse(&self, text: &str) -> Result<TableSpec> {
        let mut lines = text.lines().enumerate().filter_map(|(i, line)| {
            let stripped = self.strip(line);
            (!stripped.trim().is_empty()).then_some((i + 1, stripped))
        });

        let (_, header_line) = lines.next().ok_or(PagecheckError::MissingHeader)?;
        let header = self.split(header_line);

        let mut rows = Vec::new();
        for (line, text) in lines {
            for cells in self.expand(text, line, header.len())? {
                rows.push(DataRow { line, cells });
            }
        }

        debug!(
            target: "pagecheck::fixture",
            columns = header.len(),
            rows = rows.len(),
            "parsed fixture table"
        );
        Ok(TableSpec { header, rows })
    }

    /// Remove surrounding whitespace, then surrounding delimiters.
    fn strip<'a>(&self, line: &'a str) -> &'a str {
        line.trim().trim_matches(self.delimiter)
    }

    fn split(&self, text: &str) -> Vec<String> {
        text.split(self.delimiter)
            .map(|cell| cell.trim().to_string())
            .collect()
    }

    /// Expand one data line into its rows of cells.
    ///
    /// The innermost row is checked against `width` before any repetition,
    /// so a `*0` row with the wrong cell count is still rejected.
    fn expand(&self, text: &str, line: usize, width: usize) -> Result<Vec<Vec<String>>> {
        let cells = self.split(text);
        let Some((count, rest)) = multiplier(&cells[0], line)? else {
            if cells.len() != width {
                return Err(PagecheckError::MalformedTable {
                    line,
                    expected: width,
                    found: cells.len(),
                });
            }
            return Ok(vec![cells]);
        };

        let mut template: Vec<&str> = Vec::with_capacity(cells.len());
        if !rest.is_empty() {
            template.push(rest);
        }
        template.extend(cells[1..].iter().map(String::as_str));
        let template = template.join(&self.delimiter.to_string());

        let expanded = self.expand(&template, line, width)?;
        Ok((0..count)
            .flat_map(|_| expanded.iter().cloned())
            .collect())
    }
}

/// Split a `<rest>*<digits>` cell into its repetition count and the rest.
fn multiplier(cell: &str, line: usize) -> Result<Option<(usize, &str)>> {
    let Some((rest, digits)) = cell.rsplit_once('*') else {
        return Ok(None);
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let count = digits
        .parse::<usize>()
        .map_err(|e| PagecheckError::Format {
            value: cell.to_string(),
            message: format!("bad multiplier on line {}: {}", line, e),
        })?;
    Ok(Some((count, rest.trim())))
}

/// Parse a fixture table with the default delimiter.
pub fn parse_table(text: &str) -> Result<TableSpec> {
    DataTableParser::new().parse(text)
}

/// Parse a fixture table and format its rows in one step.
pub fn parse_rows(text: &str, formatters: Option<&FormatterSet>) -> Result<Vec<Row>> {
    parse_table(text)?.materialize(formatters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::formatter::Formatter;

    const BASIC: &str = "
        |id| value            |
        |1 |'testing'         |
        |2 |'and more testing'|
    ";

    #[test]
    fn test_parse_header_and_rows() {
        let spec = parse_table(BASIC).unwrap();
        assert_eq!(spec.header, vec!["id", "value"]);
        assert_eq!(spec.row_count(), 2);
        assert_eq!(spec.rows[0].cells, vec!["1", "'testing'"]);
        assert_eq!(spec.rows[1].cells, vec!["2", "'and more testing'"]);
    }

    #[test]
    fn test_source_lines_are_recorded() {
        let spec = parse_table(BASIC).unwrap();
        assert_eq!(spec.rows[0].line, 3);
        assert_eq!(spec.rows[1].line, 4);
    }

    #[test]
    fn test_blank_lines_discarded() {
        let text = "\n\n|a|b|\n\n   \n|1|2|\n\n";
        let spec = parse_table(text).unwrap();
        assert_eq!(spec.header, vec!["a", "b"]);
        assert_eq!(spec.row_count(), 1);
    }

    #[test]
    fn test_missing_pipes_are_tolerated() {
        let spec = parse_table("a | b\n1 | 2").unwrap();
        assert_eq!(spec.rows[0].cells, vec!["1", "2"]);
    }

    #[test]
    fn test_multiplier_marker_cell() {
        let spec = parse_table("|id|value|\n*3|1|x").unwrap();
        assert_eq!(spec.row_count(), 3);
        for row in &spec.rows {
            assert_eq!(row.cells, vec!["1", "x"]);
        }
    }

    #[test]
    fn test_multiplier_suffix_on_first_cell() {
        let spec = parse_table("|id|value|\n|7*2|'y'|").unwrap();
        assert_eq!(spec.row_count(), 2);
        assert_eq!(spec.rows[1].cells, vec!["7", "'y'"]);
    }

    #[test]
    fn test_multiplier_is_composable() {
        let spec = parse_table("|id|value|\n|*2|*3|1|x|").unwrap();
        assert_eq!(spec.row_count(), 6);
    }

    #[test]
    fn test_zero_multiplier_yields_no_rows() {
        let spec = parse_table("|id|value|\n|*0|1|x|\n|2|y|").unwrap();
        assert_eq!(spec.row_count(), 1);
        assert_eq!(spec.rows[0].cells, vec!["2", "y"]);
    }

    #[test]
    fn test_row_count_is_sum_of_multipliers() {
        let text = "
            |id|v|
            |*10|1|a|
            |2|b|
            |*5|3|c|
        ";
        assert_eq!(parse_table(text).unwrap().row_count(), 16);
    }

    #[test]
    fn test_star_inside_value_is_not_a_multiplier() {
        let spec = parse_table("|expr|v|\n|'a*b'|1|").unwrap();
        assert_eq!(spec.row_count(), 1);
        assert_eq!(spec.rows[0].cells[0], "'a*b'");
    }

    #[test]
    fn test_cell_count_mismatch_is_malformed() {
        let err = parse_table("|a|b|\n|1|2|\n|1|2|3|").unwrap_err();
        assert_eq!(
            err,
            PagecheckError::MalformedTable {
                line: 3,
                expected: 2,
                found: 3,
            }
        );
    }

    #[test]
    fn test_expanded_row_mismatch_is_malformed() {
        let err = parse_table("|a|b|\n|*2|1|").unwrap_err();
        assert!(matches!(
            err,
            PagecheckError::MalformedTable { found: 1, .. }
        ));
    }

    #[test]
    fn test_zero_multiplier_row_is_still_checked() {
        let err = parse_table("|a|b|\n|*0|1|2|3|").unwrap_err();
        assert_eq!(
            err,
            PagecheckError::MalformedTable {
                line: 2,
                expected: 2,
                found: 3,
            }
        );
        assert!(parse_table("|a|b|\n|*2|*0|1|").is_err());
    }

    #[test]
    fn test_empty_text_has_no_header() {
        assert_eq!(
            parse_table("  \n \n").unwrap_err(),
            PagecheckError::MissingHeader
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let spec = DataTableParser::new()
            .delimiter(',')
            .parse("a,b\n*2,1,2")
            .unwrap();
        assert_eq!(spec.row_count(), 2);
        assert_eq!(spec.rows[0].cells, vec!["1", "2"]);
    }

    #[test]
    fn test_materialize_without_formatters_keeps_literals() {
        let rows = parse_rows(BASIC, None).unwrap();
        assert_eq!(
            rows[0].values(),
            &[
                Value::Literal("1".into()),
                Value::Literal("'testing'".into())
            ]
        );
    }

    #[test]
    fn test_materialize_with_formatters() {
        let formatters = FormatterSet::new()
            .with(Formatter::int())
            .with(Formatter::literal());
        let rows = parse_rows(BASIC, Some(&formatters)).unwrap();
        assert_eq!(
            rows[1].values(),
            &[Value::Int(2), Value::Text("and more testing".into())]
        );
    }
}
