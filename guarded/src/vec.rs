//! A lock-guarded ordered sequence.

use crate::ThreadSafe;
use crate::error::{Error, Result};

use std::ops::Range;

/// A `Vec<T>` whose every operation runs under the owning lock.
///
/// `ThreadSafeVec<T>` is [`ThreadSafe<Vec<T>>`](ThreadSafe), so everything
/// the generic holder offers (`value`, `assign`, `equals`, `with`,
/// `with_mut`, `lock`, `try_lock`, `raw`) is available, plus the sequence
/// operations below. Each of them holds the lock for its whole duration, so
/// operations on one instance are linearizable.
///
/// Iteration goes through either a [`snapshot`](ThreadSafe::snapshot) (a
/// copy taken at one instant) or a [`LockedView`](crate::LockedView), whose
/// iterators cannot outlive the lock.
///
/// # Examples
///
/// ```
/// use guarded::{ThreadSafeVec, remove_if};
///
/// let numbers: ThreadSafeVec<i32> = (1..=6).collect();
/// remove_if(&numbers, |n| n % 2 == 0)?;
///
/// assert_eq!(numbers.snapshot()?, vec![1, 3, 5]);
/// # Ok::<(), guarded::Error>(())
/// ```
pub type ThreadSafeVec<T> = ThreadSafe<Vec<T>>;

impl<T> ThreadSafe<Vec<T>> {
    /// Appends `value` to the end of the sequence.
    pub fn push_back(&self, value: T) -> Result<()> {
        self.with_mut(|v| v.push(value))
    }

    /// Returns the number of elements.
    pub fn size(&self) -> Result<usize> {
        self.with(Vec::len)
    }

    /// Returns `true` if the sequence holds no elements.
    pub fn empty(&self) -> Result<bool> {
        self.with(Vec::is_empty)
    }

    /// Removes the elements in `[range.start, range.end)`, shifting the
    /// remaining elements down.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRange`] if `range.start > range.end`.
    /// - [`Error::OutOfRange`] if `range.end > size()`.
    ///
    /// The sequence is left untouched on error.
    pub fn erase(&self, range: Range<usize>) -> Result<()> {
        let mut view = self.lock()?;
        let len = view.len();

        if range.start > range.end {
            return Err(Error::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > len {
            return Err(Error::OutOfRange {
                index: range.end,
                len,
            });
        }

        view.drain(range);
        Ok(())
    }

    /// Removes every element. Clearing an empty sequence is a no-op.
    pub fn clear(&self) -> Result<()> {
        self.with_mut(Vec::clear)
    }
}

impl<T: Clone> ThreadSafe<Vec<T>> {
    /// Returns a copy of the element at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `index >= size()`.
    pub fn at(&self, index: usize) -> Result<T> {
        let view = self.lock()?;

        view.get(index).cloned().ok_or(Error::OutOfRange {
            index,
            len: view.len(),
        })
    }

    /// Returns a copy of the current contents.
    ///
    /// The copy is consistent: it reflects the sequence between two
    /// operations, never during one.
    pub fn snapshot(&self) -> Result<Vec<T>> {
        self.value()
    }
}

impl<T> FromIterator<T> for ThreadSafe<Vec<T>> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Removes every element of `values` for which `should_erase` returns
/// `true`, preserving the order of the kept elements.
///
/// The lock is taken once for the whole operation and the filtering runs
/// on the locked view, so no other thread can observe a partially filtered
/// sequence. The public locking operations are never re-entered, which
/// keeps this correct for every [`LockKind`](crate::LockKind).
///
/// Returns the number of removed elements.
pub fn remove_if<T, F>(values: &ThreadSafeVec<T>, mut should_erase: F) -> Result<usize>
where
    F: FnMut(&T) -> bool,
{
    let mut view = values.lock()?;
    let before = view.len();

    view.retain(|item| !should_erase(item));

    Ok(before - view.len())
}
