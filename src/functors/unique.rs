use std::fmt;

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::TypedQueryError;
use crate::lock::{LockMode, SingleThread};
use crate::query::PreparedQuery;
use crate::shape::{BindShape, ReturnShape};
use crate::value::FetchValue;

/// Fetches the single column of the single row a query must return.
pub struct GetValueUnique<'c, B: Backend, T, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, (T,), P, M>,
}

impl<B: Backend, T, P, M: LockMode> fmt::Debug for GetValueUnique<'_, B, T, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetValueUnique").field("query", &self.query).finish()
    }
}

impl<'c, B, T, P, M> GetValueUnique<'c, B, T, P, M>
where
    B: Backend,
    T: FetchValue<B>,
    P: BindShape<B>,
    M: LockMode,
{
    /// # Errors
    /// Returns `TypedQueryError` if preparation or shape validation fails.
    pub fn new(conn: &'c Connection<B, M>, sql: &str) -> Result<Self, TypedQueryError> {
        conn.prepare(sql).map(|query| Self { query })
    }

    /// # Errors
    /// Returns `TypedQueryError::Cardinality` unless exactly one row comes
    /// back, or any backend failure.
    pub fn call(&mut self, params: P) -> Result<T, TypedQueryError> {
        self.query
            .unique_as("get_value_unique", params)
            .map(|(value,)| value)
    }

    /// Like [`GetValueUnique::call`], leaving `destination` untouched on failure.
    ///
    /// # Errors
    /// See [`GetValueUnique::call`].
    pub fn call_into(&mut self, params: P, destination: &mut T) -> Result<(), TypedQueryError> {
        *destination = self.call(params)?;
        Ok(())
    }
}

/// Fetches the single row a query must return.
pub struct GetRowUnique<'c, B: Backend, R, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, R, P, M>,
}

impl<B: Backend, R, P, M: LockMode> fmt::Debug for GetRowUnique<'_, B, R, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetRowUnique").field("query", &self.query).finish()
    }
}

impl<'c, B, R, P, M> GetRowUnique<'c, B, R, P, M>
where
    B: Backend,
    R: ReturnShape<B>,
    P: BindShape<B>,
    M: LockMode,
{
    /// # Errors
    /// Returns `TypedQueryError` if preparation or shape validation fails.
    pub fn new(conn: &'c Connection<B, M>, sql: &str) -> Result<Self, TypedQueryError> {
        conn.prepare(sql).map(|query| Self { query })
    }

    /// # Errors
    /// Returns `TypedQueryError::Cardinality` unless exactly one row comes
    /// back, or any backend failure.
    pub fn call(&mut self, params: P) -> Result<R, TypedQueryError> {
        self.query.unique_as("get_row_unique", params)
    }

    /// # Errors
    /// See [`GetRowUnique::call`].
    pub fn call_into(&mut self, params: P, destination: &mut R) -> Result<(), TypedQueryError> {
        *destination = self.call(params)?;
        Ok(())
    }
}
