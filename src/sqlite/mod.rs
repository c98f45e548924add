//! SQLite backend over `rusqlite`.
//!
//! - `config`: connection settings and their builder
//! - `connection`: the native handle and its cached statements
//! - `params` / `row`: per-type bind and fetch

pub mod config;
mod connection;
mod params;
mod row;

pub use config::{JournalMode, SqliteConfig, SqliteConfigBuilder};
pub use connection::{SqliteCursor, SqliteHandle, SqliteStatement};

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::TypedQueryError;
use crate::lock::{LockMode, SingleThread};
use crate::query::PreparedQuery;

/// Backend tag for SQLite.
#[derive(Debug)]
pub enum Sqlite {}

impl Backend for Sqlite {
    const NAME: &'static str = "sqlite";

    type Config = SqliteConfig;
    type Handle = SqliteHandle;
    type Row<'r> = rusqlite::Row<'r>;
    type RowId = i64;
}

pub type SqliteConnection<M = SingleThread> = Connection<Sqlite, M>;

pub type SqliteQuery<'c, R, P, M = SingleThread> = PreparedQuery<'c, Sqlite, R, P, M>;

impl<M: LockMode> Connection<Sqlite, M> {
    /// Open the database file at `path` with default settings.
    ///
    /// # Errors
    /// Returns `TypedQueryError::ConnectionError` if the file cannot be opened.
    pub fn open(path: impl Into<String>) -> Result<Self, TypedQueryError> {
        Self::connect(&SqliteConfig::new(path))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, TypedQueryError> {
        Self::connect(&SqliteConfig::in_memory())
    }
}
