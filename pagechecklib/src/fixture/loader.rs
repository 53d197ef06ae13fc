//! Loading fixture rows into an external store.

use tracing::debug;

use crate::error::DriveError;
use crate::fixture::formatter::FormatterSet;
use crate::fixture::parser::TableSpec;
use crate::value::Row;

/// Runs a textual command against the external store.
pub trait Executor {
    /// What a command returns (a result cursor for queries)
    type Cursor;
    /// The store's own error type
    type Error: std::error::Error + 'static;

    fn execute(&mut self, command: &str) -> Result<Self::Cursor, Self::Error>;
}

/// Build the insertion command for one formatted row.
pub fn insert_command(target: &str, header: &[String], row: &Row) -> String {
    let values: Vec<String> = row.iter().map(|v| v.to_literal()).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        target,
        header.join(", "),
        values.join(", ")
    )
}

/// Insert every row of `spec` into `target`, one command per row, in order.
///
/// Returns the formatted rows, the baseline later query results are
/// compared against. Formatting happens up front, so a formatter error
/// leaves the store untouched; the first executor error stops loading and is
/// returned as [`DriveError::Collaborator`].
pub fn create_rows<E: Executor>(
    spec: TableSpec,
    executor: &mut E,
    target: &str,
    formatters: Option<&FormatterSet>,
) -> Result<Vec<Row>, DriveError<E::Error>> {
    let rows = spec.materialize(formatters)?;

    for (i, row) in rows.iter().enumerate() {
        let command = insert_command(target, &spec.header, row);
        debug!(target: "pagecheck::fixture", row = i + 1, %command, "insert");
        executor
            .execute(&command)
            .map_err(DriveError::Collaborator)?;
    }

    debug!(target: "pagecheck::fixture", table = target, rows = rows.len(), "fixture loaded");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PagecheckError;
    use crate::fixture::formatter::Formatter;
    use crate::fixture::parser::parse_table;
    use crate::value::Value;

    #[derive(Debug, thiserror::Error)]
    #[error("write timed out")]
    struct WriteTimeout;

    /// Records commands; fails on the command with the given index.
    #[derive(Default)]
    struct Recorder {
        commands: Vec<String>,
        fail_at: Option<usize>,
    }

    impl Executor for Recorder {
        type Cursor = ();
        type Error = WriteTimeout;

        fn execute(&mut self, command: &str) -> Result<(), WriteTimeout> {
            if self.fail_at == Some(self.commands.len()) {
                return Err(WriteTimeout);
            }
            self.commands.push(command.to_string());
            Ok(())
        }
    }

    const DATA: &str = "
        |id| value    |
        |1 |'testing' |
        |2 |'more'    |
    ";

    #[test]
    fn test_one_command_per_row_in_order() {
        let mut recorder = Recorder::default();
        let spec = parse_table(DATA).unwrap();
        let rows = create_rows(spec, &mut recorder, "paging_test", None).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            recorder.commands,
            vec![
                "INSERT INTO paging_test (id, value) VALUES (1, 'testing')",
                "INSERT INTO paging_test (id, value) VALUES (2, 'more')",
            ]
        );
    }

    #[test]
    fn test_multiplier_rows_are_inserted_individually() {
        let mut recorder = Recorder::default();
        let spec = parse_table("|id|value|\n|*3|1|'x'|").unwrap();
        let rows = create_rows(spec, &mut recorder, "t", None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(recorder.commands.len(), 3);
        assert!(recorder
            .commands
            .iter()
            .all(|c| c == "INSERT INTO t (id, value) VALUES (1, 'x')"));
    }

    #[test]
    fn test_typed_formatters_quote_text() {
        let mut recorder = Recorder::default();
        let spec = parse_table(DATA).unwrap();
        let formatters = FormatterSet::uniform(Formatter::literal(), 2);
        let rows = create_rows(spec, &mut recorder, "t", Some(&formatters)).unwrap();

        assert_eq!(rows[0].values(), &[Value::Int(1), Value::Text("testing".into())]);
        assert_eq!(
            recorder.commands[0],
            "INSERT INTO t (id, value) VALUES (1, 'testing')"
        );
    }

    #[test]
    fn test_executor_error_halts_loading() {
        let mut recorder = Recorder {
            fail_at: Some(1),
            ..Default::default()
        };
        let spec = parse_table(DATA).unwrap();
        let err = create_rows(spec, &mut recorder, "t", None).unwrap_err();

        assert!(matches!(err, DriveError::Collaborator(WriteTimeout)));
        assert_eq!(recorder.commands.len(), 1);
    }

    #[test]
    fn test_formatter_error_inserts_nothing() {
        let mut recorder = Recorder::default();
        let spec = parse_table("|id|\n|1|\n|x|").unwrap();
        let formatters = FormatterSet::new().with(Formatter::int());
        let err = create_rows(spec, &mut recorder, "t", Some(&formatters)).unwrap_err();

        assert!(matches!(
            err,
            DriveError::Harness(PagecheckError::Format { .. })
        ));
        assert!(recorder.commands.is_empty());
    }
}
