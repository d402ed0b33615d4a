use crate::error::Result;
use crate::sync::{Lock, LockKind};
use crate::{ThreadSafe, ThreadSafeVec};

/// Builder for configuring and creating lock-guarded values.
///
/// `ThreadSafeBuilder` selects the lock kind and, for sequences, the
/// initial capacity before construction. Unlike [`ThreadSafe::new`], the
/// `build_*` methods report a platform failure to create the lock instead
/// of panicking.
///
/// # Examples
///
/// ```
/// use guarded::{LockKind, ThreadSafeBuilder};
///
/// let names = ThreadSafeBuilder::new()
///     .kind(LockKind::ErrorCheck)
///     .capacity(16)
///     .build_vec::<String>()?;
///
/// names.push_back("ada".to_owned())?;
/// # Ok::<(), guarded::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ThreadSafeBuilder {
    /// Kind of the lock created for the value.
    kind: LockKind,

    /// Initial capacity reserved by [`build_vec`](Self::build_vec).
    capacity: usize,
}

impl ThreadSafeBuilder {
    /// Creates a builder for a normal lock and an unreserved sequence.
    pub fn new() -> Self {
        Self {
            kind: LockKind::default(),
            capacity: 0,
        }
    }

    /// Sets the lock kind.
    ///
    /// # Examples
    ///
    /// ```
    /// # use guarded::{LockKind, ThreadSafeBuilder};
    /// let kind: LockKind = "recursive".parse().unwrap();
    /// let builder = ThreadSafeBuilder::new().kind(kind);
    /// ```
    pub fn kind(mut self, kind: LockKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the number of elements [`build_vec`](Self::build_vec) reserves
    /// up front. Ignored by [`build_value`](Self::build_value).
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Wraps `value` behind a lock with the configured kind.
    pub fn build_value<V>(self, value: V) -> Result<ThreadSafe<V>> {
        log::debug!("creating thread-safe value with {} lock", self.kind);

        let lock = Lock::try_new(self.kind)?;
        Ok(ThreadSafe::from_parts(value, lock))
    }

    /// Creates an empty sequence with the configured kind and capacity.
    pub fn build_vec<T>(self) -> Result<ThreadSafeVec<T>> {
        self.build_value(Vec::with_capacity(self.capacity))
    }
}

impl Default for ThreadSafeBuilder {
    /// Creates a default `ThreadSafeBuilder`.
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn defaults() {
        let v = ThreadSafeBuilder::default().build_value(1u8).unwrap();
        assert_eq!(v.kind(), LockKind::Normal);
    }

    #[test]
    fn configured_kind_is_applied() {
        let v = ThreadSafeBuilder::new()
            .kind(LockKind::ErrorCheck)
            .build_value(())
            .unwrap();

        let _view = v.lock().unwrap();
        assert_eq!(v.lock().unwrap_err(), Error::WouldDeadlock);
    }

    #[test]
    fn capacity_is_reserved() {
        let v = ThreadSafeBuilder::new()
            .capacity(32)
            .build_vec::<u64>()
            .unwrap();

        assert!(v.with(Vec::capacity).unwrap() >= 32);
        assert_eq!(v.empty(), Ok(true));
    }
}
