//! Scoped transactions and savepoints.
//!
//! Both controllers issue their opening statement eagerly and are `Active`
//! from then on. `commit`, `rollback` and `finish` consume the controller.
//! A controller dropped while still `Active` performs its [`ExitAction`]
//! once; a failure there is logged and dropped, so callers that need it use
//! `finish` instead.

use std::fmt;

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::TypedQueryError;
use crate::lock::{LockMode, SingleThread};

/// What a controller does when it leaves scope while still active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitAction {
    #[default]
    Rollback,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Active,
    Committed,
    RolledBack,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxState::Active => f.write_str("active"),
            TxState::Committed => f.write_str("committed"),
            TxState::RolledBack => f.write_str("rolled back"),
        }
    }
}

#[derive(Debug)]
enum Scope {
    Transaction,
    Savepoint(String),
}

impl Scope {
    fn label(&self) -> &'static str {
        match self {
            Scope::Transaction => "transaction",
            Scope::Savepoint(_) => "savepoint",
        }
    }

    fn begin_sql(&self) -> String {
        match self {
            Scope::Transaction => "BEGIN TRANSACTION".to_owned(),
            Scope::Savepoint(name) => format!("SAVEPOINT {name}"),
        }
    }

    fn commit_sql(&self) -> String {
        match self {
            Scope::Transaction => "COMMIT".to_owned(),
            Scope::Savepoint(name) => format!("RELEASE SAVEPOINT {name}"),
        }
    }

    // A rolled back savepoint is still on the stack until released.
    fn rollback_sql(&self) -> String {
        match self {
            Scope::Transaction => "ROLLBACK".to_owned(),
            Scope::Savepoint(name) => {
                format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}")
            }
        }
    }
}

fn savepoint_name(id: u64) -> String {
    format!("s_q_{id}")
}

struct Controller<'c, B: Backend, M: LockMode> {
    conn: &'c Connection<B, M>,
    scope: Scope,
    on_exit: ExitAction,
    state: TxState,
}

impl<'c, B: Backend, M: LockMode> Controller<'c, B, M> {
    fn begin(
        conn: &'c Connection<B, M>,
        scope: Scope,
        on_exit: ExitAction,
    ) -> Result<Self, TypedQueryError> {
        conn.execute_batch(&scope.begin_sql())?;
        tracing::debug!(backend = B::NAME, kind = scope.label(), ?on_exit, "begin");
        Ok(Self {
            conn,
            scope,
            on_exit,
            state: TxState::Active,
        })
    }

    fn complete(&mut self, action: ExitAction) -> Result<TxState, TypedQueryError> {
        if self.state != TxState::Active {
            return Err(TypedQueryError::TransactionError(format!(
                "{} is already {}",
                self.scope.label(),
                self.state
            )));
        }
        let (sql, next) = match action {
            ExitAction::Commit => (self.scope.commit_sql(), TxState::Committed),
            ExitAction::Rollback => (self.scope.rollback_sql(), TxState::RolledBack),
        };
        // Terminal even on failure: the exit statement is never retried.
        self.state = next;
        self.conn.execute_batch(&sql)?;
        tracing::debug!(backend = B::NAME, kind = self.scope.label(), state = %next, "complete");
        Ok(next)
    }
}

impl<B: Backend, M: LockMode> Drop for Controller<'_, B, M> {
    fn drop(&mut self) {
        if self.state != TxState::Active {
            return;
        }
        if let Err(err) = self.complete(self.on_exit) {
            tracing::warn!(
                backend = B::NAME,
                kind = self.scope.label(),
                action = ?self.on_exit,
                error = %err,
                "implicit exit action failed"
            );
        }
    }
}

/// A transaction on one connection.
pub struct Transaction<'c, B: Backend, M: LockMode = SingleThread> {
    inner: Controller<'c, B, M>,
}

impl<'c, B: Backend, M: LockMode> Transaction<'c, B, M> {
    /// Begin a transaction that rolls back unless committed.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `BEGIN` fails.
    pub fn begin(conn: &'c Connection<B, M>) -> Result<Self, TypedQueryError> {
        Self::begin_with(conn, ExitAction::Rollback)
    }

    /// Begin a transaction that commits unless rolled back.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `BEGIN` fails.
    pub fn begin_autocommit(conn: &'c Connection<B, M>) -> Result<Self, TypedQueryError> {
        Self::begin_with(conn, ExitAction::Commit)
    }

    /// # Errors
    /// Returns `TypedQueryError` if `BEGIN` fails.
    pub fn begin_with(
        conn: &'c Connection<B, M>,
        on_exit: ExitAction,
    ) -> Result<Self, TypedQueryError> {
        Controller::begin(conn, Scope::Transaction, on_exit).map(|inner| Self { inner })
    }

    #[must_use]
    pub fn state(&self) -> TxState {
        self.inner.state
    }

    #[must_use]
    pub fn exit_action(&self) -> ExitAction {
        self.inner.on_exit
    }

    #[must_use]
    pub fn connection(&self) -> &'c Connection<B, M> {
        self.inner.conn
    }

    /// # Errors
    /// Returns `TypedQueryError` if `COMMIT` fails.
    pub fn commit(mut self) -> Result<(), TypedQueryError> {
        self.inner.complete(ExitAction::Commit).map(|_| ())
    }

    /// # Errors
    /// Returns `TypedQueryError` if `ROLLBACK` fails.
    pub fn rollback(mut self) -> Result<(), TypedQueryError> {
        self.inner.complete(ExitAction::Rollback).map(|_| ())
    }

    /// Perform the exit action now and report how the transaction ended.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the exit statement fails.
    pub fn finish(mut self) -> Result<TxState, TypedQueryError> {
        let action = self.inner.on_exit;
        self.inner.complete(action)
    }
}

impl<B: Backend, M: LockMode> fmt::Debug for Transaction<'_, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("backend", &B::NAME)
            .field("state", &self.inner.state)
            .field("on_exit", &self.inner.on_exit)
            .finish()
    }
}

/// A named savepoint, usable inside a transaction or another savepoint.
///
/// Names come from a per-connection counter, so nested savepoints never
/// collide.
pub struct Savepoint<'c, B: Backend, M: LockMode = SingleThread> {
    inner: Controller<'c, B, M>,
}

impl<'c, B: Backend, M: LockMode> Savepoint<'c, B, M> {
    /// Open a savepoint that rolls back unless released.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `SAVEPOINT` fails.
    pub fn begin(conn: &'c Connection<B, M>) -> Result<Self, TypedQueryError> {
        Self::begin_with(conn, ExitAction::Rollback)
    }

    /// Open a savepoint that is released unless rolled back.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `SAVEPOINT` fails.
    pub fn begin_autocommit(conn: &'c Connection<B, M>) -> Result<Self, TypedQueryError> {
        Self::begin_with(conn, ExitAction::Commit)
    }

    /// # Errors
    /// Returns `TypedQueryError` if `SAVEPOINT` fails.
    pub fn begin_with(
        conn: &'c Connection<B, M>,
        on_exit: ExitAction,
    ) -> Result<Self, TypedQueryError> {
        let name = savepoint_name(conn.next_savepoint_id());
        Controller::begin(conn, Scope::Savepoint(name), on_exit).map(|inner| Self { inner })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match &self.inner.scope {
            Scope::Savepoint(name) => name,
            Scope::Transaction => "",
        }
    }

    #[must_use]
    pub fn state(&self) -> TxState {
        self.inner.state
    }

    #[must_use]
    pub fn exit_action(&self) -> ExitAction {
        self.inner.on_exit
    }

    #[must_use]
    pub fn connection(&self) -> &'c Connection<B, M> {
        self.inner.conn
    }

    /// Release the savepoint, keeping its writes.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `RELEASE SAVEPOINT` fails.
    pub fn commit(mut self) -> Result<(), TypedQueryError> {
        self.inner.complete(ExitAction::Commit).map(|_| ())
    }

    /// Undo the writes made since the savepoint and release it.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `ROLLBACK TO SAVEPOINT` fails.
    pub fn rollback(mut self) -> Result<(), TypedQueryError> {
        self.inner.complete(ExitAction::Rollback).map(|_| ())
    }

    /// # Errors
    /// Returns `TypedQueryError` if the exit statement fails.
    pub fn finish(mut self) -> Result<TxState, TypedQueryError> {
        let action = self.inner.on_exit;
        self.inner.complete(action)
    }
}

impl<B: Backend, M: LockMode> fmt::Debug for Savepoint<'_, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Savepoint")
            .field("backend", &B::NAME)
            .field("name", &self.name())
            .field("state", &self.inner.state)
            .field("on_exit", &self.inner.on_exit)
            .finish()
    }
}
