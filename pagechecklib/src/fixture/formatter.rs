//! Per-column cell formatters.
//!
//! A [`Formatter`] turns the trimmed text of one fixture cell (or the
//! canonical text of one result column) into a [`Value`]. A
//! [`FormatterSet`] applies formatters positionally; columns past the end of
//! the set are kept as [`Value::Literal`].

use std::fmt;
use std::sync::Arc;

use crate::error::PagecheckError;
use crate::value::{Row, Value};
use crate::Result;

type FormatFn = dyn Fn(&str) -> Result<Value> + Send + Sync;

/// A pure `&str -> Value` conversion for one column.
#[derive(Clone)]
pub struct Formatter {
    name: &'static str,
    func: Arc<FormatFn>,
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Formatter").field(&self.name).finish()
    }
}

impl Formatter {
    /// Wrap an arbitrary conversion.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: "custom",
            func: Arc::new(func),
        }
    }

    fn named<F>(name: &'static str, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// Keep the cell verbatim as a literal (the behaviour of an absent formatter).
    pub fn raw() -> Self {
        Self::named("raw", |s| Ok(Value::Literal(s.to_string())))
    }

    /// Keep the cell as a plain string.
    pub fn text() -> Self {
        Self::named("text", |s| Ok(Value::Text(s.to_string())))
    }

    /// Parse the cell as a 64-bit integer.
    pub fn int() -> Self {
        Self::named("int", |s| {
            s.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format_error(s, e.to_string()))
        })
    }

    /// Parse the cell as `true` / `false` (case-insensitive).
    pub fn boolean() -> Self {
        Self::named("boolean", |s| match s.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format_error(s, "expected true or false")),
        })
    }

    /// Wrap the text in single quotes, e.g. `foo` becomes `'foo'`.
    ///
    /// Used on result columns so they compare equal to quoted fixture cells.
    pub fn quote() -> Self {
        Self::named("quote", |s| Ok(Value::Text(format!("'{}'", s))))
    }

    /// Parse the cell as a statement literal: integers, `'quoted'` strings
    /// (with `''` escapes), `true`/`false` and `null`.
    pub fn literal() -> Self {
        Self::named("literal", parse_literal)
    }

    /// Apply the formatter to one cell.
    pub fn apply(&self, cell: &str) -> Result<Value> {
        (self.func)(cell)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

fn format_error(value: &str, message: impl Into<String>) -> PagecheckError {
    PagecheckError::Format {
        value: value.to_string(),
        message: message.into(),
    }
}

/// Parse a single statement literal.
pub fn parse_literal(text: &str) -> Result<Value> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }
    if text.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }
    if let Some(inner) = text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Ok(Value::Text(inner.replace("''", "'")));
    }
    text.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| format_error(text, "not a literal"))
}

/// Ordered formatters, one per column, applied positionally.
#[derive(Debug, Clone, Default)]
pub struct FormatterSet {
    formatters: Vec<Formatter>,
}

impl FormatterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The same formatter for each of `columns` columns.
    pub fn uniform(formatter: Formatter, columns: usize) -> Self {
        Self {
            formatters: vec![formatter; columns],
        }
    }

    /// Builder: append the formatter for the next column.
    pub fn with(mut self, formatter: Formatter) -> Self {
        self.formatters.push(formatter);
        self
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Formatter> {
        self.formatters.get(position)
    }

    /// Format one row of cells.
    pub fn format_row<S: AsRef<str>>(&self, cells: &[S]) -> Result<Row> {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match self.formatters.get(i) {
                Some(formatter) => formatter.apply(cell.as_ref()),
                None => Ok(Value::Literal(cell.as_ref().to_string())),
            })
            .collect::<Result<Vec<_>>>()
            .map(Row::new)
    }
}

impl FromIterator<Formatter> for FormatterSet {
    fn from_iter<I: IntoIterator<Item = Formatter>>(iter: I) -> Self {
        Self {
            formatters: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_formatter() {
        assert_eq!(Formatter::int().apply("42").unwrap(), Value::Int(42));
        assert!(matches!(
            Formatter::int().apply("x"),
            Err(PagecheckError::Format { .. })
        ));
    }

    #[test]
    fn test_quote_formatter() {
        assert_eq!(
            Formatter::quote().apply("testing").unwrap().to_string(),
            "'testing'"
        );
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("7").unwrap(), Value::Int(7));
        assert_eq!(parse_literal("-7").unwrap(), Value::Int(-7));
        assert_eq!(
            parse_literal("'it''s'").unwrap(),
            Value::Text("it's".into())
        );
        assert_eq!(parse_literal("''").unwrap(), Value::Text(String::new()));
        assert_eq!(parse_literal("NULL").unwrap(), Value::Null);
        assert_eq!(parse_literal("False").unwrap(), Value::Bool(false));
        assert!(parse_literal("'").is_err());
        assert!(parse_literal("bare").is_err());
    }

    #[test]
    fn test_format_row_positional_with_defaults() {
        let set = FormatterSet::new().with(Formatter::int());
        let row = set.format_row(&["1", "'a'"]).unwrap();
        assert_eq!(
            row.values(),
            &[Value::Int(1), Value::Literal("'a'".into())]
        );
    }

    #[test]
    fn test_format_row_propagates_errors() {
        let set = FormatterSet::uniform(Formatter::int(), 2);
        assert!(set.format_row(&["1", "two"]).is_err());
    }

    #[test]
    fn test_custom_formatter() {
        let upper = Formatter::new(|s| Ok(Value::Text(s.to_uppercase())));
        assert_eq!(upper.apply("ab").unwrap(), Value::Text("AB".into()));
        assert_eq!(upper.name(), "custom");
    }
}
