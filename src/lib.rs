//! Typed prepared queries over `SQLite` and PostgreSQL.
//!
//! A query is declared with a return-shape `R` and a bind-shape `P`, both
//! tuples of Rust value types. Binding and fetching are resolved per tuple
//! position at compile time, and the SQL text is checked against both shapes
//! when the query is prepared.
//!
//! ```no_run
//! use sql_typed_query::prelude::*;
//!
//! # fn main() -> Result<(), TypedQueryError> {
//! let conn: SqliteConnection = Connection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")?;
//!
//! let mut insert: Insert<'_, Sqlite, (&str,)> =
//!     Insert::new(&conn, "INSERT INTO t (name) VALUES (?1)")?;
//! let id = insert.call(("alice",))?;
//!
//! let mut name: GetValueUnique<'_, Sqlite, String, (i64,)> =
//!     GetValueUnique::new(&conn, "SELECT name FROM t WHERE id = ?1")?;
//! assert_eq!(name.call((id,))?, "alice");
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod connection;
pub mod error;
pub mod functors;
pub mod lock;
pub mod prelude;
pub mod query;
pub mod shape;
pub mod transaction;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use connection::Connection;
pub use error::{CardinalityViolation, TypedQueryError};
pub use lock::{LockMode, MultiThread, SingleThread};
pub use query::{PreparedQuery, ResultCursor};
pub use transaction::{ExitAction, Savepoint, Transaction, TxState};
pub use value::Null;
