//! Per-type bind and fetch for PostgreSQL.
//!
//! Bound values are copied into the statement, so a call never borrows from
//! its caller past `bind`. The server checks every value against the
//! parameter's declared type.

use chrono::NaiveDateTime;
use postgres::Row;

use crate::error::TypedQueryError;
use crate::value::{BindValue, FetchValue, Null, i64_to_u64, text_to_char, u64_to_i64};

use super::connection::PgNull;
use super::{PgStatement, Postgres};

macro_rules! pg_native {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BindValue<Postgres> for $ty {
                fn bind(&self, stmt: &mut PgStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
                    stmt.bind_boxed(index, Box::new(self.clone()))
                }
            }

            impl FetchValue<Postgres> for $ty {
                fn fetch(row: &Row, index: usize) -> Result<Self, TypedQueryError> {
                    Ok(row.try_get(index)?)
                }
            }
        )*
    };
}

pg_native!(i32, i64, f64, bool, String, Vec<u8>, NaiveDateTime, serde_json::Value);

impl BindValue<Postgres> for str {
    fn bind(&self, stmt: &mut PgStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_boxed(index, Box::new(self.to_owned()))
    }
}

impl BindValue<Postgres> for [u8] {
    fn bind(&self, stmt: &mut PgStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_boxed(index, Box::new(self.to_vec()))
    }
}

impl BindValue<Postgres> for Null {
    fn bind(&self, stmt: &mut PgStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_boxed(index, Box::new(PgNull))
    }
}

impl BindValue<Postgres> for u64 {
    fn bind(&self, stmt: &mut PgStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_boxed(index, Box::new(u64_to_i64(*self)?))
    }
}

impl FetchValue<Postgres> for u64 {
    fn fetch(row: &Row, index: usize) -> Result<Self, TypedQueryError> {
        i64_to_u64(row.try_get(index)?)
    }
}

impl BindValue<Postgres> for char {
    fn bind(&self, stmt: &mut PgStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_boxed(index, Box::new(self.to_string()))
    }
}

impl FetchValue<Postgres> for char {
    fn fetch(row: &Row, index: usize) -> Result<Self, TypedQueryError> {
        let text: String = row.try_get(index)?;
        text_to_char(&text)
    }
}
