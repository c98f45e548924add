//! Drain every row of a query into caller-owned storage.
//!
//! Rows already written stay written if a later row fails to decode.

use std::convert::identity;
use std::fmt;

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::{CardinalityViolation, TypedQueryError};
use crate::lock::{LockMode, SingleThread};
use crate::query::{PreparedQuery, ResultCursor};
use crate::shape::{BindShape, ReturnShape};
use crate::value::FetchValue;

fn extend_from<B, R, X, C>(
    cursor: &mut ResultCursor<'_, B, R>,
    unpack: fn(R) -> X,
    destination: &mut C,
) -> Result<usize, TypedQueryError>
where
    B: Backend,
    R: ReturnShape<B>,
    C: Extend<X>,
{
    let mut rows = 0;
    while let Some(row) = cursor.try_fetch()? {
        destination.extend(Some(unpack(row)));
        rows += 1;
    }
    Ok(rows)
}

fn write_slots<'d, B, R, X, I>(
    cursor: &mut ResultCursor<'_, B, R>,
    operation: &'static str,
    unpack: fn(R) -> X,
    slots: I,
) -> Result<usize, TypedQueryError>
where
    B: Backend,
    R: ReturnShape<B>,
    X: 'd,
    I: IntoIterator<Item = &'d mut X>,
{
    let mut slots = slots.into_iter();
    let mut rows = 0;
    while let Some(row) = cursor.try_fetch()? {
        let Some(slot) = slots.next() else {
            return Err(TypedQueryError::cardinality(
                operation,
                CardinalityViolation::ExceedsCapacity(rows),
            ));
        };
        *slot = unpack(row);
        rows += 1;
    }
    Ok(rows)
}

fn single<T>((value,): (T,)) -> T {
    value
}

/// Collects the single column of every row.
pub struct GetColumn<'c, B: Backend, T, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, (T,), P, M>,
}

impl<B: Backend, T, P, M: LockMode> fmt::Debug for GetColumn<'_, B, T, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetColumn").field("query", &self.query).finish()
    }
}

impl<'c, B, T, P, M> GetColumn<'c, B, T, P, M>
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

    /// All values, in fetch order.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn call(&mut self, params: P) -> Result<Vec<T>, TypedQueryError> {
        let mut values = Vec::new();
        self.collect_into(params, &mut values)?;
        Ok(values)
    }

    /// Append every value to `destination` and return how many were added.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn collect_into<C: Extend<T>>(
        &mut self,
        params: P,
        destination: &mut C,
    ) -> Result<usize, TypedQueryError> {
        self.query
            .get_result(params, |cursor| extend_from(cursor, single, destination))
    }

    /// Overwrite `slots` one value per row, in order.
    ///
    /// # Errors
    /// Returns `TypedQueryError::Cardinality` with
    /// `CardinalityViolation::ExceedsCapacity` when rows outnumber the slots,
    /// or any backend failure.
    pub fn write_into<'d, I>(&mut self, params: P, slots: I) -> Result<usize, TypedQueryError>
    where
        T: 'd,
        I: IntoIterator<Item = &'d mut T>,
    {
        self.query.get_result(params, |cursor| {
            write_slots(cursor, "get_column", single, slots)
        })
    }
}

/// Collects every row.
pub struct GetTable<'c, B: Backend, R, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, R, P, M>,
}

impl<B: Backend, R, P, M: LockMode> fmt::Debug for GetTable<'_, B, R, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetTable").field("query", &self.query).finish()
    }
}

impl<'c, B, R, P, M> GetTable<'c, B, R, P, M>
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
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn call(&mut self, params: P) -> Result<Vec<R>, TypedQueryError> {
        let mut rows = Vec::new();
        self.collect_into(params, &mut rows)?;
        Ok(rows)
    }

    /// # Errors
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn collect_into<C: Extend<R>>(
        &mut self,
        params: P,
        destination: &mut C,
    ) -> Result<usize, TypedQueryError> {
        self.query
            .get_result(params, |cursor| extend_from(cursor, identity, destination))
    }

    /// # Errors
    /// Returns `TypedQueryError::Cardinality` with
    /// `CardinalityViolation::ExceedsCapacity` when rows outnumber the slots,
    /// or any backend failure.
    pub fn write_into<'d, I>(&mut self, params: P, slots: I) -> Result<usize, TypedQueryError>
    where
        R: 'd,
        I: IntoIterator<Item = &'d mut R>,
    {
        self.query
            .get_result(params, |cursor| write_slots(cursor, "get_table", identity, slots))
    }
}
