use std::error::Error;

use postgres::types::{FromSql, Type};

use crate::backend::NativeRow;
use crate::error::TypedQueryError;

/// Decodes any column into whether it was NULL.
struct NullProbe(bool);

impl<'a> FromSql<'a> for NullProbe {
    fn from_sql(_ty: &Type, _raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(NullProbe(false))
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(NullProbe(true))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl NativeRow for postgres::Row {
    fn is_null(&self, index: usize) -> Result<bool, TypedQueryError> {
        let NullProbe(null) = self.try_get(index)?;
        Ok(null)
    }
}
