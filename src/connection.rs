use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::backend::{Backend, NativeConnection, NativeStatement};
use crate::error::TypedQueryError;
use crate::lock::{LockMode, SingleThread};
use crate::query::{PreparedQuery, check_shape};
use crate::shape::{BindShape, ReturnShape};
use crate::transaction::{ExitAction, Savepoint, Transaction};

/// A database connection for backend `B` under locking mode `M`.
///
/// The connection owns the native handle; dropping it closes the handle.
/// Every query, functor and transaction built on it borrows it, so the
/// borrow checker guarantees they are gone before the connection is.
pub struct Connection<B: Backend, M: LockMode = SingleThread> {
    handle: M::Cell<B::Handle>,
    savepoint_ids: AtomicU64,
}

impl<B: Backend, M: LockMode> Connection<B, M> {
    /// Open a connection with the backend's configuration.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the backend cannot connect.
    pub fn connect(config: &B::Config) -> Result<Self, TypedQueryError> {
        let handle = <B::Handle as NativeConnection<B>>::connect(config)?;
        tracing::debug!(backend = B::NAME, mode = M::NAME, "connection opened");
        Ok(Self::from_handle(handle))
    }

    /// Wrap an already opened native handle.
    pub fn from_handle(handle: B::Handle) -> Self {
        Self {
            handle: M::new_cell(handle),
            savepoint_ids: AtomicU64::new(0),
        }
    }

    /// Close the connection and report any failure the backend raises while
    /// doing so. Dropping the connection closes it too, silently.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the native close fails.
    pub fn close(self) -> Result<(), TypedQueryError> {
        tracing::debug!(backend = B::NAME, "closing connection");
        M::into_inner(self.handle).disconnect()
    }

    /// Run `f` against the native handle, holding the connection's lock for
    /// its duration.
    ///
    /// # Errors
    /// Returns whatever `f` returns.
    pub fn with_handle<T>(
        &self,
        f: impl FnOnce(&B::Handle) -> Result<T, TypedQueryError>,
    ) -> Result<T, TypedQueryError> {
        let handle = self.guard();
        f(&handle)
    }

    pub(crate) fn guard(&self) -> M::Guard<'_, B::Handle> {
        M::acquire(&self.handle)
    }

    /// Prepare `sql` with return-shape `R` and bind-shape `P`.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the backend rejects the SQL or if its
    /// parameter/column counts disagree with the shapes.
    pub fn prepare<R, P>(
        &self,
        sql: impl Into<Arc<str>>,
    ) -> Result<PreparedQuery<'_, B, R, P, M>, TypedQueryError>
    where
        R: ReturnShape<B>,
        P: BindShape<B>,
    {
        PreparedQuery::new(self, sql)
    }

    /// Prepare and run `sql` once, discarding any rows. The compiled
    /// statement is released before this returns.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if preparation, binding or execution fails.
    pub fn execute<P: BindShape<B>>(&self, sql: &str, params: P) -> Result<(), TypedQueryError> {
        let handle = self.guard();
        let prepared = handle.prepare(sql)?;
        let mut stmt = handle.statement(&prepared)?;
        check_shape::<B, (), P>(&stmt, sql)?;
        params.bind_all(&mut stmt)?;
        stmt.execute()
    }

    /// Prepare and run a single-row insert once.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if preparation, binding or execution fails.
    pub fn insert<P: BindShape<B>>(&self, sql: &str, params: P) -> Result<B::RowId, TypedQueryError> {
        let handle = self.guard();
        let prepared = handle.prepare(sql)?;
        let mut stmt = handle.statement(&prepared)?;
        check_shape::<B, (), P>(&stmt, sql)?;
        params.bind_all(&mut stmt)?;
        stmt.insert()
    }

    /// Run a script of `;` separated statements.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), TypedQueryError> {
        self.guard().execute_batch(sql)
    }

    /// Read a whole script from `reader` and run it.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if reading fails or the script fails.
    pub fn read_sql<R: Read>(&self, mut reader: R) -> Result<(), TypedQueryError> {
        let mut script = String::new();
        reader.read_to_string(&mut script)?;
        self.execute_batch(&script)
    }

    /// Run the script stored at `path`.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the file cannot be opened or read, or the
    /// script fails.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(), TypedQueryError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| TypedQueryError::Other(format!("Cannot open {}: {e}", path.display())))?;
        self.read_sql(file)
    }

    /// Begin a transaction that rolls back unless committed.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `BEGIN` fails.
    pub fn transaction(&self) -> Result<Transaction<'_, B, M>, TypedQueryError> {
        Transaction::begin_with(self, ExitAction::Rollback)
    }

    /// Begin a transaction that commits unless rolled back.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `BEGIN` fails.
    pub fn transaction_autocommit(&self) -> Result<Transaction<'_, B, M>, TypedQueryError> {
        Transaction::begin_with(self, ExitAction::Commit)
    }

    /// Open a savepoint that rolls back unless released.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `SAVEPOINT` fails.
    pub fn savepoint(&self) -> Result<Savepoint<'_, B, M>, TypedQueryError> {
        Savepoint::begin_with(self, ExitAction::Rollback)
    }

    /// Open a savepoint that is released unless rolled back.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `SAVEPOINT` fails.
    pub fn savepoint_autocommit(&self) -> Result<Savepoint<'_, B, M>, TypedQueryError> {
        Savepoint::begin_with(self, ExitAction::Commit)
    }

    pub(crate) fn next_savepoint_id(&self) -> u64 {
        self.savepoint_ids.fetch_add(1, Ordering::Relaxed)
    }
}

impl<B: Backend, M: LockMode> fmt::Debug for Connection<B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &B::NAME)
            .field("mode", &M::NAME)
            .finish_non_exhaustive()
    }
}
