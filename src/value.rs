//! Per-value bind and fetch primitives.
//!
//! Each backend implements [`BindValue`] and [`FetchValue`] for the Rust types
//! its engine understands. The generic pieces live here: the [`Null`] marker,
//! `Option<T>` as a nullable wrapper, and bind-through-reference.

use crate::backend::{Backend, NativeRow, RowOf, StatementOf};
use crate::error::TypedQueryError;

/// SQL NULL.
///
/// Binding `Null` binds NULL at its position. Fetching into `Null` reads
/// nothing and just skips the column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Null;

/// Bind one value at a 0-based parameter position.
pub trait BindValue<B: Backend> {
    /// # Errors
    /// Returns `TypedQueryError` if the value cannot be represented by the
    /// engine or the position is rejected.
    fn bind(&self, stmt: &mut StatementOf<'_, B>, index: usize) -> Result<(), TypedQueryError>;
}

/// Read one value from a 0-based column position of the current row.
pub trait FetchValue<B: Backend>: Sized {
    /// # Errors
    /// Returns `TypedQueryError` if the column holds a value that does not
    /// convert into `Self`.
    fn fetch(row: &RowOf<'_, B>, index: usize) -> Result<Self, TypedQueryError>;
}

impl<B, T> BindValue<B> for Option<T>
where
    B: Backend,
    T: BindValue<B>,
    Null: BindValue<B>,
{
    fn bind(&self, stmt: &mut StatementOf<'_, B>, index: usize) -> Result<(), TypedQueryError> {
        match self {
            Some(value) => value.bind(stmt, index),
            None => Null.bind(stmt, index),
        }
    }
}

impl<B, T> FetchValue<B> for Option<T>
where
    B: Backend,
    T: FetchValue<B>,
{
    fn fetch(row: &RowOf<'_, B>, index: usize) -> Result<Self, TypedQueryError> {
        if row.is_null(index)? {
            Ok(None)
        } else {
            T::fetch(row, index).map(Some)
        }
    }
}

impl<B, T> BindValue<B> for &T
where
    B: Backend,
    T: BindValue<B> + ?Sized,
{
    fn bind(&self, stmt: &mut StatementOf<'_, B>, index: usize) -> Result<(), TypedQueryError> {
        (**self).bind(stmt, index)
    }
}

impl<B: Backend> FetchValue<B> for Null {
    fn fetch(_row: &RowOf<'_, B>, _index: usize) -> Result<Self, TypedQueryError> {
        Ok(Null)
    }
}

/// Narrow an unsigned value into the signed 64-bit integer engines store.
pub(crate) fn u64_to_i64(value: u64) -> Result<i64, TypedQueryError> {
    i64::try_from(value).map_err(|_| {
        TypedQueryError::ConversionError(format!("{value} does not fit in a signed 64-bit integer"))
    })
}

pub(crate) fn i64_to_u64(value: i64) -> Result<u64, TypedQueryError> {
    u64::try_from(value).map_err(|_| {
        TypedQueryError::ConversionError(format!("negative value {value} read into an unsigned column"))
    })
}

/// Booleans are stored as 0/1; anything else is rejected rather than coerced.
pub(crate) fn i64_to_bool(value: i64) -> Result<bool, TypedQueryError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TypedQueryError::ConversionError(format!(
            "expected 0 or 1 for a boolean column, found {other}"
        ))),
    }
}

/// A `char` column must hold exactly one character.
pub(crate) fn text_to_char(text: &str) -> Result<char, TypedQueryError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(TypedQueryError::ConversionError(format!(
            "expected a single character, found {text:?}"
        ))),
    }
}
