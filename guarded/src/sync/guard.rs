use super::Lock;
use crate::error::Result;

use std::fmt;
use std::marker::PhantomData;

/// Holds a [`Lock`] for the rest of the enclosing scope.
///
/// The lock is acquired by [`ScopedGuard::new`] and released exactly once
/// when the guard is dropped, whether the scope ends normally, through `?`,
/// or by unwinding.
///
/// The guard is not `Send`: a pthread mutex must be released by the thread
/// that acquired it.
///
/// # Examples
///
/// ```
/// use guarded::{Lock, ScopedGuard};
///
/// let lock = Lock::default();
/// {
///     let _guard = ScopedGuard::new(&lock)?;
///     // critical section
/// }
/// assert!(lock.try_lock()?);
/// # unsafe { lock.unlock()? };
/// # Ok::<(), guarded::Error>(())
/// ```
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ScopedGuard<'a> {
    lock: &'a Lock,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ScopedGuard<'a> {
    /// Acquires `lock`, blocking until it is available.
    pub fn new(lock: &'a Lock) -> Result<Self> {
        lock.lock()?;

        Ok(Self {
            lock,
            _not_send: PhantomData,
        })
    }

    /// Acquires `lock` only if it is immediately available.
    pub fn try_new(lock: &'a Lock) -> Result<Option<Self>> {
        if !lock.try_lock()? {
            return Ok(None);
        }

        Ok(Some(Self {
            lock,
            _not_send: PhantomData,
        }))
    }

    /// Returns the lock this guard holds.
    pub fn lock(&self) -> &'a Lock {
        self.lock
    }
}

impl Drop for ScopedGuard<'_> {
    /// Releases the lock.
    ///
    /// A release failure cannot be propagated out of `drop`, so it is
    /// logged instead.
    fn drop(&mut self) {
        // Safety: constructing the guard acquired the lock on this thread.
        if let Err(err) = unsafe { self.lock.unlock() } {
            log::error!("{} lock: release failed: {err}", self.lock.kind());
        }
    }
}

impl fmt::Debug for ScopedGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedGuard")
            .field("lock", self.lock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, LockKind};

    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::thread;

    fn free_elsewhere(lock: &Arc<Lock>) -> bool {
        let other = lock.clone();
        thread::spawn(move || ScopedGuard::try_new(&other).unwrap().is_some())
            .join()
            .unwrap()
    }

    #[test]
    fn releases_at_scope_end() {
        let lock = Arc::new(Lock::default());

        {
            let _guard = ScopedGuard::new(&lock).unwrap();
            assert!(!free_elsewhere(&lock));
        }

        assert!(free_elsewhere(&lock));
    }

    #[test]
    fn releases_on_early_return() {
        fn fails(lock: &Lock) -> Result<()> {
            let _guard = ScopedGuard::new(lock)?;
            Err(Error::OutOfRange { index: 1, len: 0 })
        }

        let lock = Arc::new(Lock::default());
        assert!(fails(&lock).is_err());
        assert!(free_elsewhere(&lock));
    }

    #[test]
    fn releases_on_panic() {
        let lock = Arc::new(Lock::default());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = ScopedGuard::new(&lock).unwrap();
            panic!("boom");
        }));

        assert!(result.is_err());
        assert!(free_elsewhere(&lock));
    }

    #[test]
    fn try_new_reports_busy() {
        let lock = Lock::new(LockKind::ErrorCheck);
        let _guard = ScopedGuard::new(&lock).unwrap();

        assert!(ScopedGuard::try_new(&lock).unwrap().is_none());
        assert_eq!(ScopedGuard::new(&lock).unwrap_err(), Error::WouldDeadlock);
    }

    #[test]
    fn nested_guards_on_recursive_lock() {
        let lock = Arc::new(Lock::new(LockKind::Recursive));

        let outer = ScopedGuard::new(&lock).unwrap();
        let inner = ScopedGuard::new(&lock).unwrap();
        assert_eq!(inner.lock().kind(), LockKind::Recursive);

        drop(inner);
        assert!(!free_elsewhere(&lock));

        drop(outer);
        assert!(free_elsewhere(&lock));
    }
}
