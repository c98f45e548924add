use std::fmt;

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::TypedQueryError;
use crate::lock::{LockMode, SingleThread};
use crate::query::PreparedQuery;
use crate::shape::BindShape;

/// Runs a statement that returns no rows.
pub struct Execute<'c, B: Backend, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, (), P, M>,
}

impl<B: Backend, P, M: LockMode> fmt::Debug for Execute<'_, B, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execute").field("query", &self.query).finish()
    }
}

impl<'c, B, P, M> Execute<'c, B, P, M>
where
    B: Backend,
    P: BindShape<B>,
    M: LockMode,
{
    /// # Errors
    /// Returns `TypedQueryError` if preparation or shape validation fails.
    pub fn new(conn: &'c Connection<B, M>, sql: &str) -> Result<Self, TypedQueryError> {
        conn.prepare(sql).map(|query| Self { query })
    }

    /// # Errors
    /// Returns `TypedQueryError` if binding or execution fails.
    pub fn call(&mut self, params: P) -> Result<(), TypedQueryError> {
        self.query.execute(params)
    }

    #[must_use]
    pub fn query(&self) -> &PreparedQuery<'c, B, (), P, M> {
        &self.query
    }
}

/// Runs a single-row insert and returns the backend's row id.
pub struct Insert<'c, B: Backend, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, (), P, M>,
}

impl<B: Backend, P, M: LockMode> fmt::Debug for Insert<'_, B, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Insert").field("query", &self.query).finish()
    }
}

impl<'c, B, P, M> Insert<'c, B, P, M>
where
    B: Backend,
    P: BindShape<B>,
    M: LockMode,
{
    /// # Errors
    /// Returns `TypedQueryError` if preparation or shape validation fails.
    pub fn new(conn: &'c Connection<B, M>, sql: &str) -> Result<Self, TypedQueryError> {
        conn.prepare(sql).map(|query| Self { query })
    }

    /// # Errors
    /// Returns `TypedQueryError` if binding or execution fails.
    pub fn call(&mut self, params: P) -> Result<B::RowId, TypedQueryError> {
        self.query.insert(params)
    }

    #[must_use]
    pub fn query(&self) -> &PreparedQuery<'c, B, (), P, M> {
        &self.query
    }
}
