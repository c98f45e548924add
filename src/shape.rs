//! Bind-shapes and return-shapes.
//!
//! A shape is a tuple of value types. Binding walks the tuple from position 0
//! upward, dispatching each element to its own [`BindValue`] impl; fetching
//! does the same with [`FetchValue`]. The walk is generated per tuple arity,
//! so a wrong number of values simply does not type-check.

use crate::backend::{Backend, RowOf, StatementOf};
use crate::error::TypedQueryError;
use crate::value::{BindValue, FetchValue};

/// Ordered parameter types bound into a statement.
pub trait BindShape<B: Backend> {
    /// Number of positional parameters.
    const ARITY: usize;

    /// Bind every element at its own position.
    ///
    /// # Errors
    /// Stops at, and returns, the first failing position.
    fn bind_all(&self, stmt: &mut StatementOf<'_, B>) -> Result<(), TypedQueryError>;
}

/// Ordered column types read from each result row.
pub trait ReturnShape<B: Backend>: Sized {
    /// Number of columns.
    const ARITY: usize;

    /// Read every column of `row` into a fresh value.
    ///
    /// # Errors
    /// Stops at, and returns, the first failing column.
    fn fetch_row(row: &RowOf<'_, B>) -> Result<Self, TypedQueryError>;
}

macro_rules! impl_shapes {
    ($arity:expr; $($idx:tt $T:ident),*) => {
        impl<B: Backend, $($T: BindValue<B>),*> BindShape<B> for ($($T,)*) {
            const ARITY: usize = $arity;

            #[allow(unused_variables)]
            fn bind_all(&self, stmt: &mut StatementOf<'_, B>) -> Result<(), TypedQueryError> {
                $( self.$idx.bind(stmt, $idx)?; )*
                Ok(())
            }
        }

        impl<B: Backend, $($T: FetchValue<B>),*> ReturnShape<B> for ($($T,)*) {
            const ARITY: usize = $arity;

            #[allow(unused_variables)]
            fn fetch_row(row: &RowOf<'_, B>) -> Result<Self, TypedQueryError> {
                Ok(($( $T::fetch(row, $idx)?, )*))
            }
        }
    };
}

impl_shapes!(0;);
impl_shapes!(1; 0 T0);
impl_shapes!(2; 0 T0, 1 T1);
impl_shapes!(3; 0 T0, 1 T1, 2 T2);
impl_shapes!(4; 0 T0, 1 T1, 2 T2, 3 T3);
impl_shapes!(5; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4);
impl_shapes!(6; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5);
impl_shapes!(7; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6);
impl_shapes!(8; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7);
impl_shapes!(9; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8);
impl_shapes!(10; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9);
impl_shapes!(11; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9, 10 T10);
impl_shapes!(12; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9, 10 T10, 11 T11);
