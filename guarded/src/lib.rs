//! # Guarded
//!
//! **Guarded** is a small locking toolkit for the **Nebula** ecosystem: a
//! cross-platform mutex façade, a scope-bound guard, and containers that
//! route every access to their contents through that mutex.
//!
//! It is meant for multi-threaded code that shares one ordered collection
//! between threads and does not want hand-rolled locking at every call site.
//! Locking is coarse on purpose: one lock per container, one thread inside a
//! critical section at a time.
//!
//! The crate provides:
//!
//! - A [`Lock`] over the platform mutex (pthreads on Unix, SRW locks on
//!   Windows) with **normal**, **error-checking** and **recursive** kinds
//! - A [`ScopedGuard`] that releases its lock on every exit path
//! - [`ThreadSafe<V>`], a value only reachable through a [`LockedView`]
//!   obtained by locking
//! - [`ThreadSafeVec<T>`], an ordered sequence with per-operation locking,
//!   and [`remove_if`] for atomic bulk removal
//! - `#[guarded::test]`, a timeout-bounded test attribute, and the
//!   [`sequence!`] constructor
//!
//! ## Quick Start
//!
//! ```rust
//! use guarded::{ThreadSafeVec, remove_if};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let shared = Arc::new(ThreadSafeVec::default());
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|id| {
//!         let shared = shared.clone();
//!         thread::spawn(move || shared.push_back(id))
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     worker.join().unwrap()?;
//! }
//!
//! remove_if(&shared, |id| id % 2 == 1)?;
//! assert_eq!(shared.size()?, 2);
//! # Ok::<(), guarded::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`sync`] — Locks, lock kinds and scoped guards
//!
//! ## Getting Started
//!
//! Add Guarded to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! guarded = { git = "https://github.com/Nebula-ecosystem/Guarded", package = "guarded" }
//! ```

extern crate self as guarded;

mod builder;
mod error;
mod value;
mod vec;

pub mod sync;

pub use builder::ThreadSafeBuilder;
pub use error::{Error, Result};
pub use sync::{Lock, LockKind, ScopedGuard};
pub use value::{LockedView, ThreadSafe};
pub use vec::{ThreadSafeVec, remove_if};

pub use guarded_macros::*;
