//! Functors: a prepared query bundled with one way of consuming its rows.
//!
//! Each functor prepares its SQL once, at construction, against a borrowed
//! [`crate::Connection`], and is then called any number of times with the
//! bind-shape values. The connection's lock mode carries over to the
//! functor, so a functor built on a `MultiThread` connection takes the lock
//! for construction and for every call.

mod collect;
mod execute;
mod foreach;
mod optional;
mod unique;

pub use collect::{GetColumn, GetTable};
pub use execute::{Execute, Insert};
pub use foreach::{EveryRow, Foreach, Function, RowVisitor, Until, Visited};
pub use optional::{GetRowOptional, GetValueOptional};
pub use unique::{GetRowUnique, GetValueUnique};
