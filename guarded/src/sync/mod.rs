//! Mutual-exclusion primitives.
//!
//! This module provides the locking layer the containers of this crate are
//! built on:
//!
//! - [`Lock`] — a cross-platform mutex whose semantics are selected by a
//!   [`LockKind`] (normal, error-checking or recursive).
//! - [`ScopedGuard`] — acquires a `Lock` on construction and releases it
//!   when dropped, on every exit path.
//!
//! ## Design notes
//!
//! - A `Lock` guards no data by itself. To protect a value, use
//!   [`ThreadSafe`](crate::ThreadSafe), which owns a value and a `Lock` and
//!   only hands out access while the lock is held.
//! - The platform primitive is chosen at compile time: pthread mutexes on
//!   Unix, SRW locks on Windows.
//! - There is no poisoning. A panic inside a critical section releases the
//!   lock during unwinding and leaves the protected value as it was.

mod guard;
mod kind;
mod lock;
mod sys;

pub use guard::ScopedGuard;
pub use kind::{LockKind, ParseLockKindError};
pub use lock::Lock;
