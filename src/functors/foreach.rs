//! Row callbacks.
//!
//! A callback either visits every row ([`EveryRow`]) or decides per row
//! whether to keep going ([`Until`]). Rows arrive as the return-shape tuple,
//! so callbacks usually destructure it: `|(id, name): (i64, String)| ...`.

use std::fmt;
use std::ops::ControlFlow;

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::TypedQueryError;
use crate::lock::{LockMode, SingleThread};
use crate::query::PreparedQuery;
use crate::shape::{BindShape, ReturnShape};

/// How an iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visited {
    /// The callback saw every row.
    AllRows,
    /// The callback asked to stop before the rows ran out.
    StoppedEarly,
}

impl Visited {
    #[must_use]
    pub fn completed(self) -> bool {
        self == Visited::AllRows
    }
}

/// Consumer of rows driven by [`Foreach`] and [`Function`].
pub trait RowVisitor<R> {
    /// What the functor returns once iteration ends.
    type Output;

    fn visit(&mut self, row: R) -> ControlFlow<()>;

    fn finish(visited: Visited) -> Self::Output;
}

/// Calls `F` on every row and reports nothing.
#[derive(Debug, Clone)]
pub struct EveryRow<F>(pub F);

impl<R, F: FnMut(R)> RowVisitor<R> for EveryRow<F> {
    type Output = ();

    fn visit(&mut self, row: R) -> ControlFlow<()> {
        (self.0)(row);
        ControlFlow::Continue(())
    }

    fn finish(_visited: Visited) {}
}

/// Calls `F` on each row until it breaks, and reports whether it did.
#[derive(Debug, Clone)]
pub struct Until<F>(pub F);

impl<R, F: FnMut(R) -> ControlFlow<()>> RowVisitor<R> for Until<F> {
    type Output = Visited;

    fn visit(&mut self, row: R) -> ControlFlow<()> {
        (self.0)(row)
    }

    fn finish(visited: Visited) -> Visited {
        visited
    }
}

fn drive<B, R, P, M, V>(
    query: &mut PreparedQuery<'_, B, R, P, M>,
    params: P,
    visitor: &mut V,
) -> Result<V::Output, TypedQueryError>
where
    B: Backend,
    R: ReturnShape<B>,
    P: BindShape<B>,
    M: LockMode,
    V: RowVisitor<R>,
{
    query.get_result(params, |cursor| {
        while let Some(row) = cursor.try_fetch()? {
            if visitor.visit(row).is_break() {
                return Ok(V::finish(Visited::StoppedEarly));
            }
        }
        Ok(V::finish(Visited::AllRows))
    })
}

/// A query whose rows go to a callback supplied per call.
pub struct Foreach<'c, B: Backend, R, P, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, R, P, M>,
}

impl<B: Backend, R, P, M: LockMode> fmt::Debug for Foreach<'_, B, R, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Foreach").field("query", &self.query).finish()
    }
}

impl<'c, B, R, P, M> Foreach<'c, B, R, P, M>
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

    /// Call `f` on every row.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn for_each<F: FnMut(R)>(&mut self, params: P, f: F) -> Result<(), TypedQueryError> {
        drive(&mut self.query, params, &mut EveryRow(f))
    }

    /// Call `f` on each row until it returns `ControlFlow::Break`.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn for_each_until<F>(&mut self, params: P, f: F) -> Result<Visited, TypedQueryError>
    where
        F: FnMut(R) -> ControlFlow<()>,
    {
        drive(&mut self.query, params, &mut Until(f))
    }

    /// # Errors
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn visit<V: RowVisitor<R>>(
        &mut self,
        params: P,
        visitor: &mut V,
    ) -> Result<V::Output, TypedQueryError> {
        drive(&mut self.query, params, visitor)
    }
}

/// A query that owns the callback its rows go to.
pub struct Function<'c, B: Backend, R, P, V, M: LockMode = SingleThread> {
    query: PreparedQuery<'c, B, R, P, M>,
    visitor: V,
}

// Visitors are usually closures, so only the query is shown.
impl<B: Backend, R, P, V, M: LockMode> fmt::Debug for Function<'_, B, R, P, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl<'c, B, R, P, V, M> Function<'c, B, R, P, V, M>
where
    B: Backend,
    R: ReturnShape<B>,
    P: BindShape<B>,
    V: RowVisitor<R>,
    M: LockMode,
{
    /// # Errors
    /// Returns `TypedQueryError` if preparation or shape validation fails.
    pub fn new(
        conn: &'c Connection<B, M>,
        sql: &str,
        visitor: V,
    ) -> Result<Self, TypedQueryError> {
        let query = conn.prepare(sql)?;
        Ok(Self { query, visitor })
    }

    /// Run the query, feeding its rows to the owned visitor.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution or decoding fails.
    pub fn call(&mut self, params: P) -> Result<V::Output, TypedQueryError> {
        drive(&mut self.query, params, &mut self.visitor)
    }

    #[must_use]
    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn visitor_mut(&mut self) -> &mut V {
        &mut self.visitor
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }
}

impl<'c, B, R, P, F, M> Function<'c, B, R, P, EveryRow<F>, M>
where
    B: Backend,
    R: ReturnShape<B>,
    P: BindShape<B>,
    F: FnMut(R),
    M: LockMode,
{
    /// # Errors
    /// Returns `TypedQueryError` if preparation or shape validation fails.
    pub fn every_row(conn: &'c Connection<B, M>, sql: &str, f: F) -> Result<Self, TypedQueryError> {
        Self::new(conn, sql, EveryRow(f))
    }
}

impl<'c, B, R, P, F, M> Function<'c, B, R, P, Until<F>, M>
where
    B: Backend,
    R: ReturnShape<B>,
    P: BindShape<B>,
    F: FnMut(R) -> ControlFlow<()>,
    M: LockMode,
{
    /// # Errors
    /// Returns `TypedQueryError` if preparation or shape validation fails.
    pub fn until(conn: &'c Connection<B, M>, sql: &str, f: F) -> Result<Self, TypedQueryError> {
        Self::new(conn, sql, Until(f))
    }
}
