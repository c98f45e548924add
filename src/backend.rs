//! The capability contract every database backend implements.
//!
//! A backend is a zero-sized tag type implementing [`Backend`]. Its associated
//! types name the native pieces: the connection handle, the compiled statement
//! a query owns, the statement checked out of the handle for one call, the cursor produced by running the statement, and the
//! row the cursor yields. Per-value binding and fetching live in
//! [`crate::value`] and are implemented per backend for each supported type.
//!
//! Nothing here is optional except the row-count capability: a backend that
//! cannot count rows up front keeps the default `COUNTS_ROWS = false` and the
//! default [`NativeCursor::row_count`].

use std::fmt;

use crate::error::TypedQueryError;

/// Tag type tying together the native types of one database engine.
pub trait Backend: Sized + Send + Sync + 'static {
    /// Human readable engine name used in logs and error messages.
    const NAME: &'static str;

    /// Whether cursors report their row count right after execution.
    const COUNTS_ROWS: bool = false;

    /// Connection parameters accepted by [`NativeConnection::connect`].
    type Config;

    /// The native connection.
    type Handle: NativeConnection<Self>;

    /// A fetched row, as exposed by the native cursor.
    type Row<'r>: NativeRow
    where
        Self: 'r;

    /// Identifier of the row produced by an insert.
    type RowId: Copy + fmt::Debug + Send + 'static;
}

/// Native connection handle.
///
/// Every method takes `&self`, so a statement can run while a cursor from
/// another statement on the same handle is still open. Handles that need
/// mutable access to their client keep it behind interior mutability and
/// hold it only for the duration of one native call.
pub trait NativeConnection<B: Backend>: Send + Sized {
    /// Compiled form of one SQL text, owned by the query that prepared it.
    /// Dropping it releases whatever the engine holds for the statement.
    type Prepared: Send;

    /// A statement ready to be bound and run once.
    type Statement<'h>: NativeStatement<B>
    where
        Self: 'h;

    /// Open a native connection.
    ///
    /// # Errors
    /// Returns `TypedQueryError` carrying the backend's diagnostic when the
    /// engine refuses the connection.
    fn connect(config: &B::Config) -> Result<Self, TypedQueryError>;

    /// Close the native connection, surfacing any close-time failure.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the engine reports a failure while closing.
    fn disconnect(self) -> Result<(), TypedQueryError>;

    /// Compile `sql`.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the engine rejects the statement.
    fn prepare(&self, sql: &str) -> Result<Self::Prepared, TypedQueryError>;

    /// Check out a statement for one execution of `prepared`.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the engine cannot provide the statement.
    fn statement<'h>(
        &'h self,
        prepared: &Self::Prepared,
    ) -> Result<Self::Statement<'h>, TypedQueryError>;

    /// Run a script made of several `;` separated statements.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if any statement of the script fails.
    fn execute_batch(&self, sql: &str) -> Result<(), TypedQueryError>;
}

/// A prepared statement, bound positionally and then run once.
pub trait NativeStatement<B: Backend> {
    /// Cursor over the rows produced by [`NativeStatement::query`].
    type Cursor<'s>: NativeCursor<B>
    where
        Self: 's;

    /// Number of positional parameters the statement expects.
    fn parameter_count(&self) -> usize;

    /// Number of columns each result row carries.
    fn column_count(&self) -> usize;

    /// Run the statement and discard whatever rows it produces.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution fails.
    fn execute(&mut self) -> Result<(), TypedQueryError>;

    /// Run the statement as a single-row insert and report the new row id.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution fails or no id is available.
    fn insert(&mut self) -> Result<B::RowId, TypedQueryError>;

    /// Run the statement and open a cursor over its rows.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if execution fails.
    fn query<'s>(&'s mut self) -> Result<Self::Cursor<'s>, TypedQueryError>;
}

/// Lazily advancing cursor over result rows.
pub trait NativeCursor<B: Backend> {
    /// Advance to the next row, or report that the rows are exhausted.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the engine fails while stepping.
    fn next_row(&mut self) -> Result<Option<&B::Row<'_>>, TypedQueryError>;

    /// Rows produced by the execution, when the engine knows it up front.
    fn row_count(&self) -> Option<u64> {
        None
    }
}

/// Column-level access shared by every backend's row type.
pub trait NativeRow {
    /// Whether the value at `index` is SQL NULL.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `index` is out of range.
    fn is_null(&self, index: usize) -> Result<bool, TypedQueryError>;
}

/// The compiled statement a backend's handle produces.
pub type PreparedOf<B> = <<B as Backend>::Handle as NativeConnection<B>>::Prepared;

/// The statement type a backend's handle checks out.
pub type StatementOf<'h, B> = <<B as Backend>::Handle as NativeConnection<B>>::Statement<'h>;

/// The row type a backend's cursor yields.
pub type RowOf<'r, B> = <B as Backend>::Row<'r>;
