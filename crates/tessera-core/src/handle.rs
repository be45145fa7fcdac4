//! Shared, lockable data handles carried inside parameter values.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A reference-counted handle to data shared between an output pin and every
/// input reading through it.
///
/// Cloning the handle shares the same buffer. Equality is identity.
pub struct Handle<T>(Arc<RwLock<T>>);

impl<T> Handle<T> {
    /// Wrap `data` in a new handle.
    pub fn new(data: T) -> Self {
        Self(Arc::new(RwLock::new(data)))
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Returns `true` if both handles point at the same data.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Clone the data out of the lock.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.0.read().clone()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Handle<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(data) => f.debug_tuple("Handle").field(&*data).finish(),
            None => f.write_str("Handle(<locked>)"),
        }
    }
}
