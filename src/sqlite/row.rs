use rusqlite::types::ValueRef;

use crate::backend::NativeRow;
use crate::error::TypedQueryError;

impl NativeRow for rusqlite::Row<'_> {
    fn is_null(&self, index: usize) -> Result<bool, TypedQueryError> {
        Ok(matches!(self.get_ref(index)?, ValueRef::Null))
    }
}
