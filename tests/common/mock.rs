//! In-memory backend that reports row counts up front.
//!
//! Queries are answered from fixtures keyed by SQL text. The handle records
//! every script it runs, how many rows were stepped and how many compiled
//! statements are alive, so tests can tell which path an operation took.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sql_typed_query::backend::{
    Backend, NativeConnection, NativeCursor, NativeRow, NativeStatement,
};
use sql_typed_query::prelude::*;

pub enum Mock {}

impl Backend for Mock {
    const NAME: &'static str = "mock";
    const COUNTS_ROWS: bool = true;

    type Config = MockConfig;
    type Handle = MockHandle;
    type Row<'r> = MockRow;
    type RowId = u32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockRow(pub Vec<Option<i64>>);

#[derive(Debug, Clone)]
pub struct Fixture {
    pub parameters: usize,
    pub columns: usize,
    pub rows: Vec<MockRow>,
}

#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub fixtures: HashMap<String, Fixture>,
    /// Scripts that fail when run.
    pub failing_scripts: Vec<String>,
}

impl MockConfig {
    pub fn with_rows(mut self, sql: &str, parameters: usize, rows: &[&[i64]]) -> Self {
        let columns = rows.first().map_or(1, |row| row.len());
        let rows = rows
            .iter()
            .map(|row| MockRow(row.iter().copied().map(Some).collect()))
            .collect();
        self.fixtures.insert(
            sql.to_owned(),
            Fixture {
                parameters,
                columns,
                rows,
            },
        );
        self
    }

    pub fn with_statement(mut self, sql: &str, parameters: usize) -> Self {
        self.fixtures.insert(
            sql.to_owned(),
            Fixture {
                parameters,
                columns: 0,
                rows: Vec::new(),
            },
        );
        self
    }

    pub fn failing(mut self, script: &str) -> Self {
        self.failing_scripts.push(script.to_owned());
        self
    }
}

#[derive(Debug)]
pub struct MockHandle {
    config: MockConfig,
    scripts: RefCell<Vec<String>>,
    rows_stepped: Cell<usize>,
    last_bound: RefCell<Vec<Option<i64>>>,
    next_id: Cell<u32>,
    live_statements: Arc<AtomicUsize>,
}

impl MockHandle {
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }

    pub fn rows_stepped(&self) -> usize {
        self.rows_stepped.get()
    }

    pub fn last_bound(&self) -> Vec<Option<i64>> {
        self.last_bound.borrow().clone()
    }

    /// Compiled statements not yet dropped.
    pub fn live_statements(&self) -> usize {
        self.live_statements.load(Ordering::SeqCst)
    }
}

/// Compiled statement; counted as live until dropped.
pub struct MockPrepared {
    sql: String,
    live: Arc<AtomicUsize>,
}

impl Drop for MockPrepared {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NativeConnection<Mock> for MockHandle {
    type Prepared = MockPrepared;
    type Statement<'h> = MockStatement<'h>;

    fn connect(config: &MockConfig) -> Result<Self, TypedQueryError> {
        Ok(Self {
            config: config.clone(),
            scripts: RefCell::default(),
            rows_stepped: Cell::new(0),
            last_bound: RefCell::default(),
            next_id: Cell::new(0),
            live_statements: Arc::default(),
        })
    }

    fn disconnect(self) -> Result<(), TypedQueryError> {
        Ok(())
    }

    fn prepare(&self, sql: &str) -> Result<MockPrepared, TypedQueryError> {
        if !self.config.fixtures.contains_key(sql) {
            return Err(TypedQueryError::Other(format!("no fixture for `{sql}`")));
        }
        self.live_statements.fetch_add(1, Ordering::SeqCst);
        Ok(MockPrepared {
            sql: sql.to_owned(),
            live: Arc::clone(&self.live_statements),
        })
    }

    fn statement<'h>(&'h self, prepared: &MockPrepared) -> Result<MockStatement<'h>, TypedQueryError> {
        let fixture = self
            .config
            .fixtures
            .get(&prepared.sql)
            .cloned()
            .ok_or_else(|| TypedQueryError::Other(format!("no fixture for `{}`", prepared.sql)))?;
        let bound = vec![None; fixture.parameters];
        Ok(MockStatement {
            handle: self,
            fixture,
            bound,
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<(), TypedQueryError> {
        self.scripts.borrow_mut().push(sql.to_owned());
        if self.config.failing_scripts.iter().any(|s| s == sql) {
            return Err(TypedQueryError::Other(format!("injected failure: {sql}")));
        }
        Ok(())
    }
}

pub struct MockStatement<'h> {
    handle: &'h MockHandle,
    fixture: Fixture,
    bound: Vec<Option<i64>>,
}

impl MockStatement<'_> {
    fn set(&mut self, index: usize, value: Option<i64>) -> Result<(), TypedQueryError> {
        let slot = self
            .bound
            .get_mut(index)
            .ok_or_else(|| TypedQueryError::ShapeError(format!("no parameter {index}")))?;
        *slot = value;
        Ok(())
    }
}

impl NativeStatement<Mock> for MockStatement<'_> {
    type Cursor<'s>
        = MockCursor<'s>
    where
        Self: 's;

    fn parameter_count(&self) -> usize {
        self.fixture.parameters
    }

    fn column_count(&self) -> usize {
        self.fixture.columns
    }

    fn execute(&mut self) -> Result<(), TypedQueryError> {
        *self.handle.last_bound.borrow_mut() = self.bound.clone();
        Ok(())
    }

    fn insert(&mut self) -> Result<u32, TypedQueryError> {
        self.execute()?;
        let id = self.handle.next_id.get() + 1;
        self.handle.next_id.set(id);
        Ok(id)
    }

    fn query<'s>(&'s mut self) -> Result<MockCursor<'s>, TypedQueryError> {
        *self.handle.last_bound.borrow_mut() = self.bound.clone();
        Ok(MockCursor {
            rows: &self.fixture.rows,
            next: 0,
            stepped: &self.handle.rows_stepped,
        })
    }
}

pub struct MockCursor<'s> {
    rows: &'s [MockRow],
    next: usize,
    stepped: &'s Cell<usize>,
}

impl NativeCursor<Mock> for MockCursor<'_> {
    fn next_row(&mut self) -> Result<Option<&MockRow>, TypedQueryError> {
        let rows = self.rows;
        let row = rows.get(self.next);
        if row.is_some() {
            self.next += 1;
            self.stepped.set(self.stepped.get() + 1);
        }
        Ok(row)
    }

    fn row_count(&self) -> Option<u64> {
        Some(self.rows.len() as u64)
    }
}

impl NativeRow for MockRow {
    fn is_null(&self, index: usize) -> Result<bool, TypedQueryError> {
        self.0
            .get(index)
            .map(Option::is_none)
            .ok_or_else(|| TypedQueryError::ShapeError(format!("no column {index}")))
    }
}

impl BindValue<Mock> for i64 {
    fn bind(&self, stmt: &mut MockStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.set(index, Some(*self))
    }
}

impl BindValue<Mock> for Null {
    fn bind(&self, stmt: &mut MockStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.set(index, None)
    }
}

impl FetchValue<Mock> for i64 {
    fn fetch(row: &MockRow, index: usize) -> Result<Self, TypedQueryError> {
        match row.0.get(index) {
            Some(Some(value)) => Ok(*value),
            Some(None) => Err(TypedQueryError::ConversionError(format!(
                "column {index} is NULL"
            ))),
            None => Err(TypedQueryError::ShapeError(format!("no column {index}"))),
        }
    }
}

pub fn connect(config: MockConfig) -> Result<Connection<Mock>, TypedQueryError> {
    Connection::connect(&config)
}
