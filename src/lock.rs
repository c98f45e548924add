//! Locking modes for a connection's native handle.
//!
//! The mode is a type parameter of [`crate::Connection`] and of everything
//! prepared against it. Handles are only ever reached through shared
//! references, so a statement can run from inside another statement's row
//! callback in either mode.
//!
//! [`SingleThread`] takes no lock at all; its cell is `!Sync`, so the
//! compiler refuses to share the connection between threads.
//! [`MultiThread`] keeps the handle behind a re-entrant mutex that each
//! operation holds from prepare to the last fetched row. Other threads wait;
//! nested operations on the holding thread go straight through.

use std::cell::Cell;
use std::marker::PhantomData;
use std::ops::Deref;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

mod sealed {
    pub trait Sealed {}
}

/// Storage and acquisition policy for a connection handle.
pub trait LockMode: sealed::Sealed + 'static {
    /// Container owning the handle.
    type Cell<T: Send>;

    /// Scoped access to the handle; dropping it releases the handle.
    type Guard<'a, T: Send + 'a>: Deref<Target = T>
    where
        Self: 'a;

    /// Short name for logs.
    const NAME: &'static str;

    fn new_cell<T: Send>(value: T) -> Self::Cell<T>;

    fn into_inner<T: Send>(cell: Self::Cell<T>) -> T;

    /// Acquire the handle for one operation.
    fn acquire<'a, T: Send + 'a>(cell: &'a Self::Cell<T>) -> Self::Guard<'a, T>;
}

/// No locking: the connection stays on one thread.
#[derive(Debug)]
pub enum SingleThread {}

/// Connection-level re-entrant mutex held for the whole of each operation.
#[derive(Debug)]
pub enum MultiThread {}

impl sealed::Sealed for SingleThread {}
impl sealed::Sealed for MultiThread {}

/// Handle storage for [`SingleThread`] connections: `Send` but not `Sync`.
#[derive(Debug)]
pub struct Unshared<T> {
    value: T,
    _not_sync: PhantomData<Cell<()>>,
}

impl LockMode for SingleThread {
    type Cell<T: Send> = Unshared<T>;
    type Guard<'a, T: Send + 'a> = &'a T;

    const NAME: &'static str = "single-thread";

    fn new_cell<T: Send>(value: T) -> Unshared<T> {
        Unshared {
            value,
            _not_sync: PhantomData,
        }
    }

    fn into_inner<T: Send>(cell: Unshared<T>) -> T {
        cell.value
    }

    fn acquire<'a, T: Send + 'a>(cell: &'a Unshared<T>) -> &'a T {
        &cell.value
    }
}

impl LockMode for MultiThread {
    type Cell<T: Send> = ReentrantMutex<T>;
    type Guard<'a, T: Send + 'a> = ReentrantMutexGuard<'a, T>;

    const NAME: &'static str = "multi-thread";

    fn new_cell<T: Send>(value: T) -> ReentrantMutex<T> {
        ReentrantMutex::new(value)
    }

    fn into_inner<T: Send>(cell: ReentrantMutex<T>) -> T {
        cell.into_inner()
    }

    fn acquire<'a, T: Send + 'a>(cell: &'a ReentrantMutex<T>) -> ReentrantMutexGuard<'a, T> {
        cell.lock()
    }
}
