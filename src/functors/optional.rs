use std::fmt;

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::TypedQueryError;
use crate::lock::{LockMode, SingleThread};
use crate::query::PreparedQuery;
use crate::shape::{BindShape, ReturnShape};
use crate::value::FetchValue;

/// Fetches one column of at most one row.
pub struct GetValueOptional<'c, B: Backend, T, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, (T,), P, M>,
}

impl<B: Backend, T, P, M: LockMode> fmt::Debug for GetValueOptional<'_, B, T, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetValueOptional").field("query", &self.query).finish()
    }
}

impl<'c, B, T, P, M> GetValueOptional<'c, B, T, P, M>
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

    /// `None` for an empty result.
    ///
    /// # Errors
    /// Returns `TypedQueryError::Cardinality` when a second row exists, or any
    /// backend failure.
    pub fn call(&mut self, params: P) -> Result<Option<T>, TypedQueryError> {
        Ok(self
            .query
            .optional_as("get_value_optional", params)?
            .map(|(value,)| value))
    }
}

/// Fetches at most one row.
pub struct GetRowOptional<'c, B: Backend, R, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, R, P, M>,
}

impl<B: Backend, R, P, M: LockMode> fmt::Debug for GetRowOptional<'_, B, R, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetRowOptional").field("query", &self.query).finish()
    }
}

impl<'c, B, R, P, M> GetRowOptional<'c, B, R, P, M>
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
    /// Returns `TypedQueryError::Cardinality` when a second row exists, or any
    /// backend failure.
    pub fn call(&mut self, params: P) -> Result<Option<R>, TypedQueryError> {
        self.query.optional_as("get_row_optional", params)
    }
}
