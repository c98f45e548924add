use std::cell::{RefCell, RefMut};
use std::error::Error;
use std::fmt;

use bytes::BytesMut;
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use postgres::{Client, NoTls, Row, Statement};

use crate::backend::{NativeConnection, NativeCursor, NativeStatement};
use crate::error::TypedQueryError;

use super::{Postgres, PostgresConfig};

type BoxedParam = Box<dyn ToSql + Sync>;

/// Placeholder for a parameter that has not been bound; sends NULL.
#[derive(Debug)]
pub(crate) struct PgNull;

impl ToSql for PgNull {
    fn to_sql(&self, _ty: &Type, _out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Owned `postgres` client.
///
/// The client is borrowed for one round trip at a time. Results are buffered
/// before a cursor is handed out, so nothing stays borrowed while rows are
/// being visited.
pub struct PgHandle {
    client: RefCell<Client>,
}

impl PgHandle {
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self {
            client: RefCell::new(client),
        }
    }
}

fn borrow_client(client: &RefCell<Client>) -> Result<RefMut<'_, Client>, TypedQueryError> {
    client.try_borrow_mut().map_err(|_| {
        TypedQueryError::ConnectionError("Postgres client is in the middle of another call".into())
    })
}

impl fmt::Debug for PgHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgHandle").finish_non_exhaustive()
    }
}

impl NativeConnection<Postgres> for PgHandle {
    type Prepared = Statement;
    type Statement<'h> = PgStatement<'h>;

    fn connect(config: &PostgresConfig) -> Result<Self, TypedQueryError> {
        let client = config.to_client_config()?.connect(NoTls).map_err(|e| {
            TypedQueryError::ConnectionError(format!("Failed to connect to Postgres: {e}"))
        })?;
        Ok(Self::from_client(client))
    }

    fn disconnect(self) -> Result<(), TypedQueryError> {
        self.client.into_inner().close()?;
        Ok(())
    }

    // The server-side statement is closed once the last clone is dropped.
    fn prepare(&self, sql: &str) -> Result<Statement, TypedQueryError> {
        Ok(borrow_client(&self.client)?.prepare(sql)?)
    }

    fn statement<'h>(&'h self, prepared: &Statement) -> Result<PgStatement<'h>, TypedQueryError> {
        let params = prepared
            .params()
            .iter()
            .map(|_| Box::new(PgNull) as BoxedParam)
            .collect();
        Ok(PgStatement {
            client: &self.client,
            statement: prepared.clone(),
            params,
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<(), TypedQueryError> {
        borrow_client(&self.client)?.batch_execute(sql)?;
        Ok(())
    }
}

fn param_refs(params: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| &**p as &(dyn ToSql + Sync)).collect()
}

/// A prepared statement with its owned parameter values.
pub struct PgStatement<'h> {
    client: &'h RefCell<Client>,
    statement: Statement,
    params: Vec<BoxedParam>,
}

impl PgStatement<'_> {
    /// Store `value` for the 0-based `index`.
    pub(crate) fn bind_boxed(&mut self, index: usize, value: BoxedParam) -> Result<(), TypedQueryError> {
        let count = self.params.len();
        let slot = self.params.get_mut(index).ok_or_else(|| {
            TypedQueryError::ShapeError(format!(
                "parameter index {index} out of range for a statement with {count} parameter(s)"
            ))
        })?;
        *slot = value;
        Ok(())
    }
}

impl NativeStatement<Postgres> for PgStatement<'_> {
    type Cursor<'s>
        = PgCursor
    where
        Self: 's;

    fn parameter_count(&self) -> usize {
        self.statement.params().len()
    }

    fn column_count(&self) -> usize {
        self.statement.columns().len()
    }

    fn execute(&mut self) -> Result<(), TypedQueryError> {
        borrow_client(self.client)?.execute(&self.statement, &param_refs(&self.params))?;
        Ok(())
    }

    fn insert(&mut self) -> Result<i64, TypedQueryError> {
        if self.statement.columns().is_empty() {
            return Err(TypedQueryError::Other(
                "Postgres insert needs a RETURNING clause to report the row id".into(),
            ));
        }
        let row = borrow_client(self.client)?
            .query_one(&self.statement, &param_refs(&self.params))?;
        Ok(row.try_get::<_, i64>(0)?)
    }

    fn query<'s>(&'s mut self) -> Result<PgCursor, TypedQueryError> {
        let rows =
            borrow_client(self.client)?.query(&self.statement, &param_refs(&self.params))?;
        Ok(PgCursor { rows, next: 0 })
    }
}

/// Rows returned by one query, buffered by the client.
#[derive(Debug)]
pub struct PgCursor {
    rows: Vec<Row>,
    next: usize,
}

impl NativeCursor<Postgres> for PgCursor {
    fn next_row(&mut self) -> Result<Option<&Row>, TypedQueryError> {
        let row = self.rows.get(self.next);
        if row.is_some() {
            self.next += 1;
        }
        Ok(row)
    }

    fn row_count(&self) -> Option<u64> {
        u64::try_from(self.rows.len()).ok()
    }
}
