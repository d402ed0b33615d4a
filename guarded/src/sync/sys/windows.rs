//! Windows backend.
//!
//! `SRWLOCK` is a non-recursive exclusive lock with no notion of ownership,
//! so the owner thread and hold depth are tracked here to provide the
//! error-checking and recursive kinds.

use crate::error::{Error, Result};
use crate::sync::LockKind;

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use windows_sys::Win32::System::Threading::{
    AcquireSRWLockExclusive, GetCurrentThreadId, ReleaseSRWLockExclusive, SRWLOCK, SRWLOCK_INIT,
    TryAcquireSRWLockExclusive,
};

/// Thread id meaning "no owner". Windows never hands out id 0.
const NO_OWNER: u32 = 0;

pub(crate) struct RawMutex {
    /// Native lock, boxed so it never moves while in use.
    lock: Box<UnsafeCell<SRWLOCK>>,

    kind: LockKind,

    /// Thread id of the current holder.
    ///
    /// Only the holder stores its own id, so a relaxed load that matches
    /// the caller's id is always accurate.
    owner: AtomicU32,

    /// Number of outstanding acquisitions by the owner.
    depth: AtomicUsize,
}

// Safety: the SRW lock is only accessed through the Win32 API, and the
// bookkeeping fields are atomics.
unsafe impl Send for RawMutex {}
unsafe impl Sync for RawMutex {}

impl RawMutex {
    /// Creates a new, unlocked mutex of the given kind.
    pub(crate) fn new(kind: LockKind) -> Result<Self> {
        Ok(Self {
            lock: Box::new(UnsafeCell::new(SRWLOCK_INIT)),
            kind,
            owner: AtomicU32::new(NO_OWNER),
            depth: AtomicUsize::new(0),
        })
    }

    /// Returns `Some(result)` when the caller already owns the lock and the
    /// kind decides the outcome without touching the native lock.
    fn reenter(&self, me: u32, blocking: bool) -> Option<Result<bool>> {
        if !self.kind.checks_owner() || self.owner.load(Ordering::Relaxed) != me {
            return None;
        }

        match self.kind {
            LockKind::Recursive => {
                self.depth.fetch_add(1, Ordering::Relaxed);
                Some(Ok(true))
            }
            _ if blocking => Some(Err(Error::WouldDeadlock)),
            _ => Some(Ok(false)),
        }
    }

    fn acquired(&self, me: u32) {
        self.owner.store(me, Ordering::Relaxed);
        self.depth.store(1, Ordering::Relaxed);
    }

    /// Blocks until the mutex is acquired.
    pub(crate) fn lock(&self) -> Result<()> {
        let me = unsafe { GetCurrentThreadId() };

        if let Some(result) = self.reenter(me, true) {
            return result.map(|_| ());
        }

        unsafe { AcquireSRWLockExclusive(self.lock.get()) };
        self.acquired(me);

        Ok(())
    }

    /// Attempts to acquire the mutex without blocking.
    pub(crate) fn try_lock(&self) -> Result<bool> {
        let me = unsafe { GetCurrentThreadId() };

        if let Some(result) = self.reenter(me, false) {
            return result;
        }

        if unsafe { TryAcquireSRWLockExclusive(self.lock.get()) } != 0 {
            self.acquired(me);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Releases the mutex.
    ///
    /// # Safety
    ///
    /// For a normal mutex the calling thread must currently hold it.
    pub(crate) unsafe fn unlock(&self) -> Result<()> {
        if self.kind.checks_owner() {
            let me = unsafe { GetCurrentThreadId() };
            if self.owner.load(Ordering::Relaxed) != me {
                return Err(Error::NotOwner);
            }

            if self.depth.fetch_sub(1, Ordering::Relaxed) > 1 {
                return Ok(());
            }
        }

        self.owner.store(NO_OWNER, Ordering::Relaxed);
        unsafe { ReleaseSRWLockExclusive(self.lock.get()) };

        Ok(())
    }
}
