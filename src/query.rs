//! Prepared queries and the execution façade built on them.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::backend::{
    Backend, NativeConnection, NativeCursor, NativeStatement, PreparedOf, StatementOf,
};
use crate::connection::Connection;
use crate::error::{CardinalityViolation, TypedQueryError};
use crate::lock::{LockMode, SingleThread};
use crate::shape::{BindShape, ReturnShape};

/// Compare the statement's own parameter and column counts with the shapes.
pub(crate) fn check_shape<B, R, P>(
    stmt: &StatementOf<'_, B>,
    sql: &str,
) -> Result<(), TypedQueryError>
where
    B: Backend,
    R: ReturnShape<B>,
    P: BindShape<B>,
{
    let parameters = stmt.parameter_count();
    if parameters != P::ARITY {
        return Err(TypedQueryError::ShapeError(format!(
            "`{sql}` takes {parameters} parameter(s) but the bind shape has {}",
            P::ARITY
        )));
    }
    if R::ARITY > 0 {
        let columns = stmt.column_count();
        if columns != R::ARITY {
            return Err(TypedQueryError::ShapeError(format!(
                "`{sql}` returns {columns} column(s) but the return shape has {}",
                R::ARITY
            )));
        }
    }
    Ok(())
}

/// SQL text bound to a connection together with its bind-shape `P` and
/// return-shape `R`.
///
/// The query owns its compiled statement and releases it when dropped; two
/// queries over the same SQL text never share one. Every call checks a
/// statement out for the compiled form, binds `P` positionally and runs it.
/// Calls take `&mut self`, so at most one [`ResultCursor`] per query exists
/// at a time.
pub struct PreparedQuery<'c, B: Backend, R, P, M: LockMode = SingleThread> {
    conn: &'c Connection<B, M>,
    sql: Arc<str>,
    prepared: PreparedOf<B>,
    _shape: PhantomData<fn(P) -> R>,
}

impl<'c, B, R, P, M> PreparedQuery<'c, B, R, P, M>
where
    B: Backend,
    R: ReturnShape<B>,
    P: BindShape<B>,
    M: LockMode,
{
    pub(crate) fn new(
        conn: &'c Connection<B, M>,
        sql: impl Into<Arc<str>>,
    ) -> Result<Self, TypedQueryError> {
        let sql = sql.into();
        let prepared = {
            let handle = conn.guard();
            let prepared = handle.prepare(&sql)?;
            let stmt = handle.statement(&prepared)?;
            check_shape::<B, R, P>(&stmt, &sql)?;
            prepared
        };
        tracing::debug!(backend = B::NAME, sql = %sql, "prepared query");
        Ok(Self {
            conn,
            sql,
            prepared,
            _shape: PhantomData,
        })
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn connection(&self) -> &'c Connection<B, M> {
        self.conn
    }

    /// Bind `params`, run the query and hand the open cursor to `f`.
    ///
    /// The connection stays acquired until `f` returns. Other statements on
    /// the same connection may still run from inside `f`.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if binding or execution fails, or whatever
    /// `f` returns.
    pub fn get_result<T, F>(&mut self, params: P, f: F) -> Result<T, TypedQueryError>
    where
        F: FnOnce(&mut ResultCursor<'_, B, R>) -> Result<T, TypedQueryError>,
    {
        let handle = self.conn.guard();
        let mut stmt = handle.statement(&self.prepared)?;
        params.bind_all(&mut stmt)?;
        let mut native = stmt.query()?;
        let mut cursor = ResultCursor::new(&mut native);
        f(&mut cursor)
    }

    /// Run the query and return its single row.
    ///
    /// # Errors
    /// Returns `TypedQueryError::Cardinality` when the result is empty or has
    /// more than one row, or any backend failure.
    pub fn get_unique(&mut self, params: P) -> Result<R, TypedQueryError> {
        self.unique_as("get_unique", params)
    }

    /// Like [`PreparedQuery::get_unique`], writing the row into `destination`.
    ///
    /// `destination` is untouched on failure.
    ///
    /// # Errors
    /// See [`PreparedQuery::get_unique`].
    pub fn get_unique_into(&mut self, params: P, destination: &mut R) -> Result<(), TypedQueryError> {
        *destination = self.unique_as("get_unique", params)?;
        Ok(())
    }

    /// Run the query and return its row, if there is one.
    ///
    /// # Errors
    /// Returns `TypedQueryError::Cardinality` when the result has more than one
    /// row, or any backend failure.
    pub fn get_optional(&mut self, params: P) -> Result<Option<R>, TypedQueryError> {
        self.optional_as("get_optional", params)
    }

    pub(crate) fn unique_as(&mut self, operation: &'static str, params: P) -> Result<R, TypedQueryError> {
        self.get_result(params, |cursor| {
            if let Some(count) = cursor.row_count() {
                if count != 1 {
                    return Err(TypedQueryError::cardinality(
                        operation,
                        CardinalityViolation::RowCount(count),
                    ));
                }
                return cursor.try_fetch()?.ok_or_else(|| {
                    TypedQueryError::cardinality(operation, CardinalityViolation::Empty)
                });
            }
            match cursor.at_most_one(operation)? {
                Some(row) => Ok(row),
                None => Err(TypedQueryError::cardinality(
                    operation,
                    CardinalityViolation::Empty,
                )),
            }
        })
    }

    pub(crate) fn optional_as(
        &mut self,
        operation: &'static str,
        params: P,
    ) -> Result<Option<R>, TypedQueryError> {
        self.get_result(params, |cursor| cursor.at_most_one(operation))
    }
}

impl<'c, B, P, M> PreparedQuery<'c, B, (), P, M>
where
    B: Backend,
    P: BindShape<B>,
    M: LockMode,
{
    /// Bind `params` and run the statement, discarding any rows.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if binding or execution fails.
    pub fn execute(&mut self, params: P) -> Result<(), TypedQueryError> {
        let handle = self.conn.guard();
        let mut stmt = handle.statement(&self.prepared)?;
        params.bind_all(&mut stmt)?;
        stmt.execute()
    }

    /// Bind `params`, run the insert and return the backend's row id.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if binding or execution fails.
    pub fn insert(&mut self, params: P) -> Result<B::RowId, TypedQueryError> {
        let handle = self.conn.guard();
        let mut stmt = handle.statement(&self.prepared)?;
        params.bind_all(&mut stmt)?;
        stmt.insert()
    }
}

impl<B: Backend, R, P, M: LockMode> fmt::Debug for PreparedQuery<'_, B, R, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("backend", &B::NAME)
            .field("sql", &self.sql)
            .finish()
    }
}

/// Rows of one execution, fetched lazily and decoded into `R`.
pub struct ResultCursor<'a, B: Backend, R> {
    native: &'a mut dyn NativeCursor<B>,
    _row: PhantomData<fn() -> R>,
}

impl<'a, B: Backend, R: ReturnShape<B>> ResultCursor<'a, B, R> {
    fn new(native: &'a mut dyn NativeCursor<B>) -> Self {
        Self {
            native,
            _row: PhantomData,
        }
    }

    /// Decode the next row, or `None` once the rows are exhausted.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if stepping or decoding fails.
    pub fn try_fetch(&mut self) -> Result<Option<R>, TypedQueryError> {
        match self.native.next_row()? {
            Some(row) => R::fetch_row(row).map(Some),
            None => Ok(None),
        }
    }

    /// Row count known right after execution, for backends that report it.
    #[must_use]
    pub fn row_count(&self) -> Option<u64> {
        if B::COUNTS_ROWS {
            self.native.row_count()
        } else {
            None
        }
    }

    /// Advance past one row without decoding it.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if stepping fails.
    pub fn skip_row(&mut self) -> Result<bool, TypedQueryError> {
        Ok(self.native.next_row()?.is_some())
    }

    /// Decode the first row and make sure no second row follows.
    pub(crate) fn at_most_one(&mut self, operation: &'static str) -> Result<Option<R>, TypedQueryError> {
        let Some(first) = self.try_fetch()? else {
            return Ok(None);
        };
        if self.skip_row()? {
            return Err(TypedQueryError::cardinality(
                operation,
                CardinalityViolation::MoreThanOne,
            ));
        }
        Ok(Some(first))
    }
}

impl<B: Backend, R: ReturnShape<B>> Iterator for ResultCursor<'_, B, R> {
    type Item = Result<R, TypedQueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_fetch().transpose()
    }
}
