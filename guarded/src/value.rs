use crate::error::{Error, Result};
use crate::sync::{Lock, LockKind, ScopedGuard};

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

/// A value that can only be reached while its lock is held.
///
/// `ThreadSafe<V>` owns exactly one `V` and one [`Lock`]. Every operation
/// acquires the lock for its whole duration, so other threads never observe
/// a value that an [`assign`](Self::assign) has not finished writing.
///
/// To perform several operations under a single acquisition, take a
/// [`LockedView`] with [`lock`](Self::lock). The view dereferences to the
/// value and releases the lock when dropped; there is no way to reach the
/// value without one.
///
/// # Re-entrancy
///
/// A thread that holds a view must not ask for another one on the same
/// value:
///
/// - with a [`Normal`](LockKind::Normal) lock it deadlocks,
/// - with an [`ErrorCheck`](LockKind::ErrorCheck) lock it fails with
///   [`Error::WouldDeadlock`],
/// - with a [`Recursive`](LockKind::Recursive) lock it fails with
///   [`Error::Reentrant`], since two views would alias the same value.
///
/// # Examples
///
/// ```
/// use guarded::ThreadSafe;
///
/// let counter = ThreadSafe::new(0u32);
/// counter.assign(41)?;
/// counter.with_mut(|n| *n += 1)?;
///
/// assert!(counter.equals(&42)?);
/// # Ok::<(), guarded::Error>(())
/// ```
pub struct ThreadSafe<V> {
    lock: Lock,

    /// Set while a [`LockedView`] exists. Only touched with `lock` held.
    borrowed: AtomicBool,

    value: UnsafeCell<V>,
}

// Safety: the value is only reachable through a `LockedView`, which holds
// the lock and is exclusive even for recursive locks.
unsafe impl<V: Send> Send for ThreadSafe<V> {}
unsafe impl<V: Send> Sync for ThreadSafe<V> {}

impl<V> ThreadSafe<V> {
    /// Wraps `value` behind a normal lock.
    pub fn new(value: V) -> Self {
        Self::with_kind(value, LockKind::Normal)
    }

    /// Wraps `value` behind a lock of the given kind.
    pub fn with_kind(value: V, kind: LockKind) -> Self {
        Self::from_parts(value, Lock::new(kind))
    }

    pub(crate) fn from_parts(value: V, lock: Lock) -> Self {
        Self {
            lock,
            borrowed: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Returns the kind of the underlying lock.
    pub fn kind(&self) -> LockKind {
        self.lock.kind()
    }

    /// Returns the underlying lock.
    ///
    /// This is for callers that bracket a critical section themselves, for
    /// instance to coordinate with state outside this value. Holding the
    /// raw lock does not grant access to the value; use [`lock`](Self::lock)
    /// for that.
    pub fn raw(&self) -> &Lock {
        &self.lock
    }

    /// Acquires the lock and returns a view of the value.
    ///
    /// The lock is held until the view is dropped.
    pub fn lock(&self) -> Result<LockedView<'_, V>> {
        let guard = ScopedGuard::new(&self.lock)?;
        LockedView::enter(self, guard)
    }

    /// Acquires the lock only if it is immediately available.
    pub fn try_lock(&self) -> Result<Option<LockedView<'_, V>>> {
        match ScopedGuard::try_new(&self.lock)? {
            Some(guard) => LockedView::enter(self, guard).map(Some),
            None => Ok(None),
        }
    }

    /// Runs `f` with shared access to the value while the lock is held.
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> Result<R> {
        let view = self.lock()?;
        Ok(f(&view))
    }

    /// Runs `f` with exclusive access to the value while the lock is held.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut V) -> R) -> Result<R> {
        let mut view = self.lock()?;
        Ok(f(&mut view))
    }

    /// Returns a mutable reference without locking.
    ///
    /// The exclusive borrow proves no other thread can reach the value.
    pub fn get_mut(&mut self) -> &mut V {
        self.value.get_mut()
    }

    /// Consumes the holder and returns the value.
    pub fn into_inner(self) -> V {
        self.value.into_inner()
    }
}

impl<V: Clone> ThreadSafe<V> {
    /// Returns a copy of the current value.
    pub fn value(&self) -> Result<V> {
        self.with(V::clone)
    }

    /// Replaces the value and returns a copy of the newly stored value.
    pub fn assign(&self, value: V) -> Result<V> {
        let mut view = self.lock()?;
        *view = value;

        Ok(view.clone())
    }
}

impl<V: PartialEq> ThreadSafe<V> {
    /// Compares the current value with `other` while the lock is held.
    pub fn equals(&self, other: &V) -> Result<bool> {
        self.with(|v| v == other)
    }

    /// Negation of [`equals`](Self::equals).
    pub fn not_equals(&self, other: &V) -> Result<bool> {
        self.equals(other).map(|eq| !eq)
    }
}

impl<V: Default> Default for ThreadSafe<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V> From<V> for ThreadSafe<V> {
    fn from(value: V) -> Self {
        Self::new(value)
    }
}

impl<V: fmt::Debug> fmt::Debug for ThreadSafe<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ThreadSafe");
        d.field("kind", &self.kind());

        match self.try_lock() {
            Ok(Some(view)) => d.field("value", &&*view),
            _ => d.field("value", &format_args!("<locked>")),
        };

        d.finish()
    }
}

/// Access to a [`ThreadSafe`] value while its lock is held.
///
/// Returned by [`ThreadSafe::lock`]. The view dereferences to the value, and
/// anything borrowed from it (slices, iterators) cannot outlive it, so
/// nothing obtained through the view survives past the critical section.
#[must_use = "the lock is released as soon as the view is dropped"]
pub struct LockedView<'a, V> {
    owner: &'a ThreadSafe<V>,
    _guard: ScopedGuard<'a>,
}

impl<'a, V> LockedView<'a, V> {
    fn enter(owner: &'a ThreadSafe<V>, guard: ScopedGuard<'a>) -> Result<Self> {
        // Only a recursive lock lets the holder get here twice.
        if owner.borrowed.swap(true, Ordering::Relaxed) {
            return Err(Error::Reentrant);
        }

        Ok(Self {
            owner,
            _guard: guard,
        })
    }
}

impl<V> Deref for LockedView<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        unsafe { &*self.owner.value.get() }
    }
}

impl<V> DerefMut for LockedView<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        unsafe { &mut *self.owner.value.get() }
    }
}

impl<V> Drop for LockedView<'_, V> {
    /// Clears the borrow flag. The guard field releases the lock afterwards.
    fn drop(&mut self) {
        self.owner.borrowed.store(false, Ordering::Relaxed);
    }
}

impl<V: fmt::Debug> fmt::Debug for LockedView<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    #[test]
    fn value_and_assign() {
        let v = ThreadSafe::new(String::from("a"));

        assert_eq!(v.value().unwrap(), "a");
        assert_eq!(v.assign(String::from("b")).unwrap(), "b");
        assert_eq!(v.value().unwrap(), "b");
    }

    #[test]
    fn equality() {
        let v = ThreadSafe::new(3);

        assert!(v.equals(&3).unwrap());
        assert!(!v.equals(&4).unwrap());
        assert!(v.not_equals(&4).unwrap());
    }

    #[test]
    fn view_holds_the_lock() {
        let v = Arc::new(ThreadSafe::new(vec![1, 2]));
        let mut view = v.lock().unwrap();
        view.push(3);

        let other = v.clone();
        let busy = thread::spawn(move || other.try_lock().unwrap().is_none())
            .join()
            .unwrap();
        assert!(busy);

        drop(view);
        assert_eq!(v.value().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn recursive_reentry_is_refused() {
        let v = ThreadSafe::with_kind(1, LockKind::Recursive);
        let view = v.lock().unwrap();

        assert_eq!(v.value().unwrap_err(), Error::Reentrant);
        assert_eq!(v.try_lock().unwrap_err(), Error::Reentrant);
        assert_eq!(*view, 1);

        drop(view);

        // The refused attempts released their extra holds.
        let other = thread::scope(|s| s.spawn(|| v.value()).join().unwrap());
        assert_eq!(other, Ok(1));
    }

    #[test]
    fn error_check_reentry_is_refused() {
        let v = ThreadSafe::with_kind(1, LockKind::ErrorCheck);
        let _view = v.lock().unwrap();

        assert_eq!(v.assign(2).unwrap_err(), Error::WouldDeadlock);
    }

    #[test]
    fn with_mut_applies_closure() {
        let v = ThreadSafe::new(10);
        let doubled = v.with_mut(|n| {
            *n *= 2;
            *n
        });

        assert_eq!(doubled, Ok(20));
        assert_eq!(v.with(|n| *n + 1), Ok(21));
    }

    #[test]
    fn concurrent_assign_is_never_torn() {
        let v = Arc::new(ThreadSafe::new((0u64, 0u64)));

        let writers: Vec<_> = (1..=4u64)
            .map(|id| {
                let v = v.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        v.assign((id, id * 10)).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..1_000 {
            let (a, b) = v.value().unwrap();
            assert_eq!(b, a * 10);
        }

        for w in writers {
            w.join().unwrap();
        }
    }

    #[test]
    fn exclusive_access_without_lock() {
        let mut v = ThreadSafe::from(5);
        *v.get_mut() += 1;

        assert_eq!(v.into_inner(), 6);
    }

    #[test]
    fn debug_output() {
        let v = ThreadSafe::new(7);
        assert_eq!(format!("{v:?}"), "ThreadSafe { kind: Normal, value: 7 }");

        let _view = v.lock().unwrap();
        assert_eq!(
            format!("{v:?}"),
            "ThreadSafe { kind: Normal, value: <locked> }"
        );
    }
}
