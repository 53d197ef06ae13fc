//! Typed column extraction for result rows.
//!
//! A [`Projection`] is resolved once against a cursor's column names: each
//! requested column becomes an accessor holding its position and a typed
//! extraction function, so per-row work is a positional lookup, a type check
//! and an optional formatter call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PagecheckError;
use crate::fixture::formatter::Formatter;
use crate::value::{Row, Value};
use crate::Result;

/// Expected type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnType {
    /// Accept any value
    #[default]
    Any,
    /// 64-bit integer
    Int,
    /// String
    Text,
    /// Boolean
    Bool,
}

impl ColumnType {
    fn name(self) -> &'static str {
        match self {
            ColumnType::Any => "any",
            ColumnType::Int => "int",
            ColumnType::Text => "text",
            ColumnType::Bool => "bool",
        }
    }

    fn extractor(self) -> Extract {
        match self {
            ColumnType::Any => |v: &Value| Some(v.clone()),
            ColumnType::Int => |v: &Value| match v {
                Value::Int(_) | Value::Null => Some(v.clone()),
                _ => None,
            },
            ColumnType::Text => |v: &Value| match v {
                Value::Text(_) | Value::Null => Some(v.clone()),
                _ => None,
            },
            ColumnType::Bool => |v: &Value| match v {
                Value::Bool(_) | Value::Null => Some(v.clone()),
                _ => None,
            },
        }
    }
}

type Extract = fn(&Value) -> Option<Value>;

/// One requested column: name, expected type, optional formatter.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnType,
    pub formatter: Option<Formatter>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
            formatter: None,
        }
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Any)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Int)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Bool)
    }

    /// Builder: format the extracted value (non-null values only).
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }
}

#[derive(Clone)]
struct Accessor {
    column: String,
    position: usize,
    kind: ColumnType,
    extract: Extract,
    formatter: Option<Formatter>,
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("column", &self.column)
            .field("position", &self.position)
            .field("kind", &self.kind)
            .field("formatter", &self.formatter)
            .finish()
    }
}

impl Accessor {
    fn get(&self, row: &Row) -> Result<Value> {
        let raw = row
            .get(self.position)
            .ok_or_else(|| PagecheckError::UnknownColumn(self.column.clone()))?;
        let value = (self.extract)(raw).ok_or_else(|| PagecheckError::ColumnType {
            column: self.column.clone(),
            expected: self.kind.name().to_string(),
            found: raw.type_name().to_string(),
        })?;
        match &self.formatter {
            Some(formatter) if !value.is_null() => formatter.apply(&value.to_string()),
            _ => Ok(value),
        }
    }
}

/// Column projection applied to every row a stream pulls.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    accessors: Option<Vec<Accessor>>,
}

impl Projection {
    /// Pass rows through unchanged.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Resolve `specs` against the result's column names.
    pub fn resolve(columns: &[String], specs: Vec<ColumnSpec>) -> Result<Self> {
        let accessors = specs
            .into_iter()
            .map(|spec| {
                let position = columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(&spec.name))
                    .ok_or_else(|| PagecheckError::UnknownColumn(spec.name.clone()))?;
                Ok(Accessor {
                    extract: spec.kind.extractor(),
                    column: spec.name,
                    position,
                    kind: spec.kind,
                    formatter: spec.formatter,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            accessors: Some(accessors),
        })
    }

    /// Names of the projected columns, or `None` for the identity projection.
    pub fn columns(&self) -> Option<Vec<&str>> {
        self.accessors
            .as_ref()
            .map(|a| a.iter().map(|acc| acc.column.as_str()).collect())
    }

    pub fn apply(&self, row: Row) -> Result<Row> {
        match &self.accessors {
            None => Ok(row),
            Some(accessors) => accessors
                .iter()
                .map(|acc| acc.get(&row))
                .collect::<Result<Vec<_>>>()
                .map(Row::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn columns() -> Vec<String> {
        vec!["id".to_string(), "value".to_string(), "flag".to_string()]
    }

    #[test]
    fn test_identity_passes_rows_through() {
        let row = row![1, "a", true];
        assert_eq!(Projection::identity().apply(row.clone()).unwrap(), row);
    }

    #[test]
    fn test_reorders_and_selects_columns() {
        let projection = Projection::resolve(
            &columns(),
            vec![ColumnSpec::text("value"), ColumnSpec::int("id")],
        )
        .unwrap();
        assert_eq!(
            projection.apply(row![1, "a", true]).unwrap(),
            row!["a", 1]
        );
        assert_eq!(projection.columns(), Some(vec!["value", "id"]));
    }

    #[test]
    fn test_unknown_column_fails_at_resolution() {
        let err = Projection::resolve(&columns(), vec![ColumnSpec::int("missing")]).unwrap_err();
        assert_eq!(err, PagecheckError::UnknownColumn("missing".into()));
    }

    #[test]
    fn test_type_mismatch() {
        let projection = Projection::resolve(&columns(), vec![ColumnSpec::int("value")]).unwrap();
        let err = projection.apply(row![1, "a", true]).unwrap_err();
        assert_eq!(
            err,
            PagecheckError::ColumnType {
                column: "value".into(),
                expected: "int".into(),
                found: "text".into(),
            }
        );
    }

    #[test]
    fn test_formatters_match_quoted_fixture_cells() {
        let projection = Projection::resolve(
            &columns(),
            vec![
                ColumnSpec::int("id").with_formatter(Formatter::text()),
                ColumnSpec::text("value").with_formatter(Formatter::quote()),
            ],
        )
        .unwrap();
        let row = projection.apply(row![1, "testing", false]).unwrap();
        assert_eq!(row.to_string(), "1 | 'testing'");
    }

    #[test]
    fn test_null_skips_type_check_and_formatter() {
        let projection = Projection::resolve(
            &columns(),
            vec![ColumnSpec::text("value").with_formatter(Formatter::quote())],
        )
        .unwrap();
        let row = Row::new(vec![Value::Int(1), Value::Null, Value::Bool(true)]);
        assert_eq!(projection.apply(row).unwrap().values(), &[Value::Null]);
    }
}
