//! Convenient imports for common functionality.

pub use crate::backend::Backend;
pub use crate::connection::Connection;
pub use crate::error::{CardinalityViolation, TypedQueryError};
pub use crate::functors::{
    EveryRow, Execute, Foreach, Function, GetColumn, GetRowOptional, GetRowUnique, GetTable,
    GetValueOptional, GetValueUnique, Insert, RowVisitor, Until, Visited,
};
pub use crate::lock::{LockMode, MultiThread, SingleThread};
pub use crate::query::{PreparedQuery, ResultCursor};
pub use crate::shape::{BindShape, ReturnShape};
pub use crate::transaction::{ExitAction, Savepoint, Transaction, TxState};
pub use crate::value::{BindValue, FetchValue, Null};

#[cfg(feature = "postgres")]
pub use crate::postgres::{Postgres, PostgresConfig, PostgresConnection, PostgresQuery};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{
    JournalMode, Sqlite, SqliteConfig, SqliteConfigBuilder, SqliteConnection, SqliteQuery,
};
