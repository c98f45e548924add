use rusqlite::{CachedStatement, Rows, ToSql};

use crate::backend::{NativeConnection, NativeCursor, NativeStatement};
use crate::error::TypedQueryError;

use super::{Sqlite, SqliteConfig};

/// Owned `rusqlite` connection.
///
/// Compiled statements live in rusqlite's bounded statement cache, keyed by
/// SQL text, and are checked out for one call at a time. A statement already
/// checked out is compiled afresh if the same SQL runs nested inside it.
#[derive(Debug)]
pub struct SqliteHandle {
    conn: rusqlite::Connection,
}

impl SqliteHandle {
    #[must_use]
    pub fn from_rusqlite(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn rusqlite(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl NativeConnection<Sqlite> for SqliteHandle {
    type Prepared = Box<str>;
    type Statement<'h> = SqliteStatement<'h>;

    fn connect(config: &SqliteConfig) -> Result<Self, TypedQueryError> {
        let conn = if config.is_in_memory() {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&config.db_path)
        }
        .map_err(|e| {
            TypedQueryError::ConnectionError(format!(
                "Cannot open SQLite database {}: {e}",
                config.db_path
            ))
        })?;
        conn.set_prepared_statement_cache_capacity(config.statement_cache_capacity);
        let setup = config.setup_script();
        if !setup.is_empty() {
            conn.execute_batch(&setup)?;
        }
        Ok(Self { conn })
    }

    fn disconnect(self) -> Result<(), TypedQueryError> {
        self.conn.close().map_err(|(_, e)| TypedQueryError::SqliteError(e))
    }

    // Compiling once up front surfaces syntax errors and warms the cache.
    fn prepare(&self, sql: &str) -> Result<Box<str>, TypedQueryError> {
        self.conn.prepare_cached(sql)?;
        Ok(sql.into())
    }

    fn statement<'h>(&'h self, sql: &Box<str>) -> Result<SqliteStatement<'h>, TypedQueryError> {
        let stmt = self.conn.prepare_cached(sql)?;
        Ok(SqliteStatement {
            conn: &self.conn,
            stmt,
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<(), TypedQueryError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

/// A cached statement checked out for one call.
pub struct SqliteStatement<'h> {
    conn: &'h rusqlite::Connection,
    stmt: CachedStatement<'h>,
}

impl SqliteStatement<'_> {
    /// Bind `value` at the 0-based `index`.
    pub(crate) fn bind_raw<T: ToSql>(&mut self, index: usize, value: T) -> Result<(), TypedQueryError> {
        self.stmt.raw_bind_parameter(index + 1, value)?;
        Ok(())
    }
}

impl NativeStatement<Sqlite> for SqliteStatement<'_> {
    type Cursor<'s>
        = SqliteCursor<'s>
    where
        Self: 's;

    fn parameter_count(&self) -> usize {
        self.stmt.parameter_count()
    }

    fn column_count(&self) -> usize {
        self.stmt.column_count()
    }

    fn execute(&mut self) -> Result<(), TypedQueryError> {
        // Step through any rows instead of rejecting them.
        let mut rows = self.stmt.raw_query();
        while rows.next()?.is_some() {}
        Ok(())
    }

    fn insert(&mut self) -> Result<i64, TypedQueryError> {
        self.execute()?;
        Ok(self.conn.last_insert_rowid())
    }

    fn query<'s>(&'s mut self) -> Result<SqliteCursor<'s>, TypedQueryError> {
        Ok(SqliteCursor {
            rows: self.stmt.raw_query(),
        })
    }
}

/// Rows of one `SQLite` execution, stepped on demand.
pub struct SqliteCursor<'s> {
    rows: Rows<'s>,
}

impl NativeCursor<Sqlite> for SqliteCursor<'_> {
    fn next_row(&mut self) -> Result<Option<&rusqlite::Row<'_>>, TypedQueryError> {
        Ok(self.rows.next()?)
    }
}
