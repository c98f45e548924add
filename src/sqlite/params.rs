//! Per-type bind and fetch for `SQLite`.
//!
//! Integers, reals, text, blobs, timestamps (`%F %T%.f` text) and JSON (text)
//! go through rusqlite's own `ToSql`/`FromSql`. Unsigned integers, booleans
//! and `char` are checked on the way in or out instead of wrapping.

use chrono::NaiveDateTime;
use rusqlite::Row;

use crate::error::TypedQueryError;
use crate::value::{BindValue, FetchValue, Null, i64_to_bool, i64_to_u64, text_to_char, u64_to_i64};

use super::{Sqlite, SqliteStatement};

macro_rules! sqlite_native {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BindValue<Sqlite> for $ty {
                fn bind(&self, stmt: &mut SqliteStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
                    stmt.bind_raw(index, self)
                }
            }

            impl FetchValue<Sqlite> for $ty {
                fn fetch(row: &Row<'_>, index: usize) -> Result<Self, TypedQueryError> {
                    Ok(row.get(index)?)
                }
            }
        )*
    };
}

sqlite_native!(i32, i64, f64, String, Vec<u8>, NaiveDateTime, serde_json::Value);

impl BindValue<Sqlite> for str {
    fn bind(&self, stmt: &mut SqliteStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_raw(index, self)
    }
}

impl BindValue<Sqlite> for [u8] {
    fn bind(&self, stmt: &mut SqliteStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_raw(index, self)
    }
}

impl BindValue<Sqlite> for Null {
    fn bind(&self, stmt: &mut SqliteStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_raw(index, rusqlite::types::Null)
    }
}

impl BindValue<Sqlite> for bool {
    fn bind(&self, stmt: &mut SqliteStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_raw(index, i64::from(*self))
    }
}

impl FetchValue<Sqlite> for bool {
    fn fetch(row: &Row<'_>, index: usize) -> Result<Self, TypedQueryError> {
        i64_to_bool(row.get(index)?)
    }
}

impl BindValue<Sqlite> for u64 {
    fn bind(&self, stmt: &mut SqliteStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        stmt.bind_raw(index, u64_to_i64(*self)?)
    }
}

impl FetchValue<Sqlite> for u64 {
    fn fetch(row: &Row<'_>, index: usize) -> Result<Self, TypedQueryError> {
        i64_to_u64(row.get(index)?)
    }
}

impl BindValue<Sqlite> for char {
    fn bind(&self, stmt: &mut SqliteStatement<'_>, index: usize) -> Result<(), TypedQueryError> {
        let mut buf = [0_u8; 4];
        stmt.bind_raw(index, &*self.encode_utf8(&mut buf))
    }
}

impl FetchValue<Sqlite> for char {
    fn fetch(row: &Row<'_>, index: usize) -> Result<Self, TypedQueryError> {
        let text: String = row.get(index)?;
        text_to_char(&text)
    }
}
