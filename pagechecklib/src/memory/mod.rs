//! In-memory stand-in for the external store.
//!
//! [`MemoryStore`] implements [`Executor`] and hands out [`MemoryCursor`]s
//! that page through live tables. Each fetch reads the table as it is at
//! that moment, continuing after the last key already delivered, so:
//!
//! - rows handed out in earlier fetches never change;
//! - rows written after the cursor's position show up in later fetches;
//! - rows written before the cursor's position never show up.
//!
//! Clones of a store share the same tables.

pub mod command;
pub mod cursor;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::PagecheckError;
use crate::fixture::loader::Executor;
use crate::fixture::parser::TableSpec;
use crate::options::StoreOptions;
use crate::value::{Row, Value};
use crate::Result;

pub use command::{parse_statement, Statement};
pub use cursor::MemoryCursor;

#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) columns: Vec<String>,
    key_len: usize,
    pub(crate) rows: BTreeMap<Vec<Value>, Row>,
}

impl Table {
    pub(crate) fn position(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| PagecheckError::UnknownColumn(column.to_string()))
    }

    fn positions(&self, filter: &[(String, Value)]) -> Result<Vec<(usize, Value)>> {
        filter
            .iter()
            .map(|(column, value)| Ok((self.position(column)?, value.clone())))
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct StoreState {
    pub(crate) tables: BTreeMap<String, Table>,
    pub(crate) available: bool,
}

impl StoreState {
    pub(crate) fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| PagecheckError::UnknownTable(name.to_string()))
    }

    pub(crate) fn check_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(PagecheckError::Unavailable(
                "not enough replicas available".to_string(),
            ))
        }
    }
}

pub(crate) type Shared = Arc<RwLock<StoreState>>;

/// Tables held in memory, keyed and ordered by primary key.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    options: StoreOptions,
    shared: Shared,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl MemoryStore {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            shared: Arc::new(RwLock::new(StoreState {
                tables: BTreeMap::new(),
                available: true,
            })),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Create a table whose primary key is its first `key_len` columns.
    pub fn create_table<S: AsRef<str>>(&self, name: &str, columns: &[S], key_len: usize) -> Result<()> {
        let name = name.to_ascii_lowercase();
        if key_len == 0 || key_len > columns.len() {
            return Err(PagecheckError::Statement {
                statement: format!("create table {}", name),
                message: format!(
                    "key length {} out of range for {} columns",
                    key_len,
                    columns.len()
                ),
            });
        }

        let mut state = self.shared.write();
        if state.tables.contains_key(&name) {
            return Err(PagecheckError::TableExists(name));
        }
        let columns = columns
            .iter()
            .map(|c| c.as_ref().to_ascii_lowercase())
            .collect();
        debug!(target: "pagecheck::memory", table = %name, key_len, "create table");
        state.tables.insert(
            name,
            Table {
                columns,
                key_len,
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Create a table shaped like a fixture: its header becomes the columns,
    /// keyed on the configured number of leading columns.
    pub fn create_table_for(&self, name: &str, spec: &TableSpec) -> Result<()> {
        self.create_table(name, &spec.header, self.options.key_columns)
    }

    /// Number of rows currently stored in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let state = self.shared.read();
        Ok(state.table(&table.to_ascii_lowercase())?.rows.len())
    }

    /// Simulate a node becoming unavailable (or available again).
    ///
    /// While unavailable every statement and every fetch fails with
    /// [`PagecheckError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.shared.write().available = available;
    }

    /// Run a statement; queries use `fetch_size` rows per fetch.
    ///
    /// A `fetch_size` of zero or less means the store's default. The first
    /// page of a query is fetched before this returns.
    pub fn query(&self, statement: &str, fetch_size: i32) -> Result<MemoryCursor> {
        let parsed = parse_statement(statement)?;
        match parsed {
            Statement::Insert {
                table,
                columns,
                values,
            } => {
                self.insert(&table, &columns, values)?;
                Ok(MemoryCursor::empty())
            }
            Statement::Delete { table, filter } => {
                self.delete(&table, &filter)?;
                Ok(MemoryCursor::empty())
            }
            Statement::Select {
                table,
                columns,
                filter,
                limit,
            } => {
                let mut cursor = {
                    let state = self.shared.read();
                    state.check_available()?;
                    let t = state.table(&table)?;
                    let (names, positions) = match columns {
                        None => (t.columns.clone(), (0..t.columns.len()).collect()),
                        Some(names) => {
                            let positions = names
                                .iter()
                                .map(|c| t.position(c))
                                .collect::<Result<Vec<_>>>()?;
                            (names, positions)
                        }
                    };
                    MemoryCursor::new(
                        self.shared.clone(),
                        cursor::Query {
                            table,
                            positions,
                            filter: t.positions(&filter)?,
                            limit,
                        },
                        names,
                        fetch_size,
                        self.options.default_fetch_size,
                    )
                };
                cursor.fetch()?;
                Ok(cursor)
            }
        }
    }

    fn insert(&self, table: &str, columns: &[String], values: Vec<Value>) -> Result<()> {
        let mut state = self.shared.write();
        state.check_available()?;
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| PagecheckError::UnknownTable(table.to_string()))?;

        let positions = columns
            .iter()
            .map(|c| t.position(c))
            .collect::<Result<Vec<_>>>()?;
        let mut assigned: Vec<Option<Value>> = vec![None; t.columns.len()];
        for (position, value) in positions.into_iter().zip(values) {
            assigned[position] = Some(value);
        }

        let mut key = Vec::with_capacity(t.key_len);
        for (i, value) in assigned.iter().take(t.key_len).enumerate() {
            match value {
                Some(v) if !v.is_null() => key.push(v.clone()),
                _ => {
                    return Err(PagecheckError::Statement {
                        statement: format!("insert into {}", table),
                        message: format!("missing primary key column '{}'", t.columns[i]),
                    })
                }
            }
        }

        let existing = t.rows.get(&key).map(|r| r.values().to_vec());
        let merged: Row = assigned
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Some(v) => v,
                None => existing
                    .as_ref()
                    .map(|e| e[i].clone())
                    .unwrap_or(Value::Null),
            })
            .collect();
        t.rows.insert(key, merged);
        Ok(())
    }

    fn delete(&self, table: &str, filter: &[(String, Value)]) -> Result<()> {
        let mut state = self.shared.write();
        state.check_available()?;
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| PagecheckError::UnknownTable(table.to_string()))?;
        let filter = t.positions(filter)?;
        let before = t.rows.len();
        t.rows.retain(|_, row| !cursor::matches(row, &filter));
        debug!(target: "pagecheck::memory", table, removed = before - t.rows.len(), "delete");
        Ok(())
    }
}

impl Executor for MemoryStore {
    type Cursor = MemoryCursor;
    type Error = PagecheckError;

    fn execute(&mut self, command: &str) -> Result<MemoryCursor> {
        self.query(command, 0)
    }
}
