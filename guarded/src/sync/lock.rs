use super::LockKind;
use super::sys::RawMutex;
use crate::error::Result;

use std::fmt;
use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A cross-platform mutual-exclusion lock.
///
/// `Lock` is a thin façade over the platform mutex. It protects no data by
/// itself; pair it with a [`ScopedGuard`](super::ScopedGuard), or use
/// [`ThreadSafe`](crate::ThreadSafe) which owns both a lock and a value.
///
/// The locking semantics are fixed at construction by a [`LockKind`]:
///
/// - [`Normal`](LockKind::Normal): relocking from the owner deadlocks.
/// - [`ErrorCheck`](LockKind::ErrorCheck): relocking from the owner returns
///   [`Error::WouldDeadlock`](crate::Error::WouldDeadlock).
/// - [`Recursive`](LockKind::Recursive): the owner may relock and must
///   unlock as many times.
///
/// # Examples
///
/// ```
/// use guarded::{Lock, LockKind, ScopedGuard};
///
/// let lock = Lock::new(LockKind::Recursive);
/// let outer = ScopedGuard::new(&lock)?;
/// let inner = ScopedGuard::new(&lock)?;
/// drop(inner);
/// drop(outer);
/// # Ok::<(), guarded::Error>(())
/// ```
pub struct Lock {
    /// Native primitive. Wrapped so that a lock dropped while still held
    /// can be leaked rather than destroyed.
    raw: ManuallyDrop<RawMutex>,

    kind: LockKind,

    /// Outstanding acquisitions. Only read on drop.
    holds: AtomicUsize,
}

impl Lock {
    /// Creates a new, unlocked lock of the given kind.
    ///
    /// # Panics
    ///
    /// Panics if the platform refuses to initialize the mutex, which only
    /// happens under resource exhaustion. Use [`Lock::try_new`] to handle
    /// that case.
    pub fn new(kind: LockKind) -> Self {
        match Self::try_new(kind) {
            Ok(lock) => lock,
            Err(err) => panic!("failed to create {kind} lock: {err}"),
        }
    }

    /// Creates a new, unlocked lock of the given kind, reporting platform
    /// initialization failures.
    pub fn try_new(kind: LockKind) -> Result<Self> {
        let raw = RawMutex::new(kind)?;

        Ok(Self {
            raw: ManuallyDrop::new(raw),
            kind,
            holds: AtomicUsize::new(0),
        })
    }

    /// Returns the kind this lock was created with.
    pub fn kind(&self) -> LockKind {
        self.kind
    }

    /// Blocks the calling thread until the lock is acquired.
    ///
    /// For a recursive lock already held by the caller this only increments
    /// the hold count. A normal lock already held by the caller deadlocks.
    ///
    /// # Errors
    ///
    /// - [`Error::WouldDeadlock`](crate::Error::WouldDeadlock) if an
    ///   error-checking lock is already held by the caller.
    /// - [`Error::LockFailure`](crate::Error::LockFailure) if the platform
    ///   primitive fails.
    pub fn lock(&self) -> Result<()> {
        if let Err(err) = self.raw.lock() {
            log::trace!("{} lock: acquire failed: {err}", self.kind);
            return Err(err);
        }

        self.holds.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Attempts to acquire the lock without blocking.
    ///
    /// Returns `Ok(false)` if the lock is currently held elsewhere (or, for
    /// normal and error-checking kinds, by the caller itself).
    pub fn try_lock(&self) -> Result<bool> {
        let acquired = self.raw.try_lock()?;

        if acquired {
            self.holds.fetch_add(1, Ordering::Relaxed);
        }

        Ok(acquired)
    }

    /// Releases one acquisition of the lock.
    ///
    /// Prefer [`ScopedGuard`](super::ScopedGuard), which calls this exactly
    /// once per successful acquisition.
    ///
    /// # Errors
    ///
    /// Error-checking and recursive locks return
    /// [`Error::NotOwner`](crate::Error::NotOwner) when the caller does not
    /// hold the lock.
    ///
    /// # Safety
    ///
    /// For a [`Normal`](LockKind::Normal) lock the calling thread must
    /// currently hold the lock. Releasing an unheld normal lock is undefined
    /// behavior on some platforms.
    pub unsafe fn unlock(&self) -> Result<()> {
        unsafe { self.raw.unlock() }?;

        self.holds.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Default for Lock {
    /// Creates a normal lock.
    fn default() -> Self {
        Self::new(LockKind::Normal)
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock").field("kind", &self.kind).finish()
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        // A guard that was `mem::forget`-ed leaves the lock held, and
        // destroying a held pthread mutex is undefined.
        if *self.holds.get_mut() != 0 {
            log::warn!("{} lock dropped while held; leaking native mutex", self.kind);
            return;
        }

        unsafe { ManuallyDrop::drop(&mut self.raw) };
    }
}
