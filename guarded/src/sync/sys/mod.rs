//! Platform-specific mutex primitives.
//!
//! This module provides a unified [`RawMutex`] over whatever native
//! mutual-exclusion object the target operating system offers:
//!
//! - `pthread_mutex_t` on Unix, with the lock kind mapped onto the
//!   mutex type attribute,
//! - `SRWLOCK` on Windows, with owner tracking layered on top for the
//!   error-checking and recursive kinds.
//!
//! The concrete implementation is selected at compile time. Every backend
//! keeps its native object on the heap so the façade can be moved while the
//! lock is not held.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub(crate) use unix::RawMutex;

#[cfg(windows)]
pub(crate) use windows::RawMutex;
