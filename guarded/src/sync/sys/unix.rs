//! POSIX threads backend.

use crate::error::{Error, Result};
use crate::sync::LockKind;

use libc::{
    EBUSY, EDEADLK, EPERM, PTHREAD_MUTEX_ERRORCHECK, PTHREAD_MUTEX_INITIALIZER,
    PTHREAD_MUTEX_NORMAL, PTHREAD_MUTEX_RECURSIVE, c_int, pthread_mutex_destroy,
    pthread_mutex_init, pthread_mutex_lock, pthread_mutex_t, pthread_mutex_trylock,
    pthread_mutex_unlock, pthread_mutexattr_destroy, pthread_mutexattr_init,
    pthread_mutexattr_settype, pthread_mutexattr_t,
};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

/// A `pthread_mutex_t` initialized with the requested mutex type.
///
/// The mutex lives in its own heap allocation: POSIX forbids moving an
/// initialized `pthread_mutex_t`.
pub(crate) struct RawMutex {
    inner: Box<UnsafeCell<pthread_mutex_t>>,
}

// Safety: pthread mutexes are designed to be shared between threads; the
// native object is only touched through the pthread API.
unsafe impl Send for RawMutex {}
unsafe impl Sync for RawMutex {}

/// Maps a lock kind onto the pthread mutex type attribute.
fn mutex_type(kind: LockKind) -> c_int {
    match kind {
        LockKind::Normal => PTHREAD_MUTEX_NORMAL,
        LockKind::ErrorCheck => PTHREAD_MUTEX_ERRORCHECK,
        LockKind::Recursive => PTHREAD_MUTEX_RECURSIVE,
    }
}

/// Converts a pthread return code into a crate error.
///
/// pthread functions report failures through their return value rather
/// than `errno`.
fn check(op: &'static str, rc: c_int) -> Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(Error::LockFailure { op, code: rc })
    }
}

impl RawMutex {
    /// Initializes a new, unlocked mutex of the given kind.
    pub(crate) fn new(kind: LockKind) -> Result<Self> {
        let mut attr = MaybeUninit::<pthread_mutexattr_t>::uninit();
        check("pthread_mutexattr_init", unsafe {
            pthread_mutexattr_init(attr.as_mut_ptr())
        })?;

        let rc = unsafe { pthread_mutexattr_settype(attr.as_mut_ptr(), mutex_type(kind)) };
        if rc != 0 {
            unsafe { pthread_mutexattr_destroy(attr.as_mut_ptr()) };
            return Err(Error::LockFailure {
                op: "pthread_mutexattr_settype",
                code: rc,
            });
        }

        let inner = Box::new(UnsafeCell::new(PTHREAD_MUTEX_INITIALIZER));
        let rc = unsafe { pthread_mutex_init(inner.get(), attr.as_ptr()) };
        unsafe { pthread_mutexattr_destroy(attr.as_mut_ptr()) };
        check("pthread_mutex_init", rc)?;

        Ok(Self { inner })
    }

    /// Blocks until the mutex is acquired.
    pub(crate) fn lock(&self) -> Result<()> {
        match unsafe { pthread_mutex_lock(self.inner.get()) } {
            0 => Ok(()),
            EDEADLK => Err(Error::WouldDeadlock),
            code => Err(Error::LockFailure {
                op: "pthread_mutex_lock",
                code,
            }),
        }
    }

    /// Attempts to acquire the mutex without blocking.
    pub(crate) fn try_lock(&self) -> Result<bool> {
        match unsafe { pthread_mutex_trylock(self.inner.get()) } {
            0 => Ok(true),
            EBUSY => Ok(false),
            code => Err(Error::LockFailure {
                op: "pthread_mutex_trylock",
                code,
            }),
        }
    }

    /// Releases the mutex.
    ///
    /// # Safety
    ///
    /// For a normal mutex the calling thread must currently hold it.
    pub(crate) unsafe fn unlock(&self) -> Result<()> {
        match unsafe { pthread_mutex_unlock(self.inner.get()) } {
            0 => Ok(()),
            EPERM => Err(Error::NotOwner),
            code => Err(Error::LockFailure {
                op: "pthread_mutex_unlock",
                code,
            }),
        }
    }
}

impl Drop for RawMutex {
    /// Destroys the native mutex.
    ///
    /// The owning façade never drops a mutex that is still held.
    fn drop(&mut self) {
        unsafe {
            pthread_mutex_destroy(self.inner.get());
        }
    }
}
