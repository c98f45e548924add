//! PostgreSQL backend over the blocking `postgres` client.
//!
//! - `config`: connection settings, validated before connecting
//! - `connection`: the client, owned statements and buffered cursors
//! - `params` / `row`: per-type bind and fetch

pub mod config;
mod connection;
mod params;
mod row;

pub use config::PostgresConfig;
pub use connection::{PgCursor, PgHandle, PgStatement};

use crate::backend::Backend;
use crate::connection::Connection;
use crate::lock::SingleThread;
use crate::query::PreparedQuery;

/// Backend tag for PostgreSQL.
///
/// Results are buffered by the client, so the row count is known as soon as
/// a query returns. Inserts report the first column of a `RETURNING` clause.
#[derive(Debug)]
pub enum Postgres {}

impl Backend for Postgres {
    const NAME: &'static str = "postgres";
    const COUNTS_ROWS: bool = true;

    type Config = PostgresConfig;
    type Handle = PgHandle;
    type Row<'r> = postgres::Row;
    type RowId = i64;
}

pub type PostgresConnection<M = SingleThread> = Connection<Postgres, M>;

pub type PostgresQuery<'c, R, P, M = SingleThread> = PreparedQuery<'c, Postgres, R, P, M>;
