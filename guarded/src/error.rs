use std::io;

use thiserror::Error;

/// Errors reported by locks and the containers built on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The platform primitive reported a nonzero status.
    ///
    /// This is fatal for the surrounding operation and is never retried.
    #[error("{op} failed: {}", os_error(.code))]
    LockFailure {
        /// Name of the primitive call that failed.
        op: &'static str,
        /// Raw OS status code.
        code: i32,
    },

    /// An error-checking lock was relocked by the thread that holds it.
    #[error("lock is already held by the current thread")]
    WouldDeadlock,

    /// A lock was released by a thread that does not hold it.
    #[error("lock is not held by the current thread")]
    NotOwner,

    /// A second view was requested by the thread already holding one.
    #[error("value is already borrowed by the current thread")]
    Reentrant,

    /// An index or range fell outside the current sequence.
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// Offending index, or the end of an offending range.
        index: usize,
        /// Length of the sequence at the time of the call.
        len: usize,
    },

    /// A range whose start lies past its end.
    #[error("range start {start} is greater than end {end}")]
    InvalidRange {
        /// First index of the range.
        start: usize,
        /// One past the last index of the range.
        end: usize,
    },
}

fn os_error(code: &i32) -> io::Error {
    io::Error::from_raw_os_error(*code)
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message() {
        let err = Error::OutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of range for length 3");
    }

    #[test]
    fn lock_failure_includes_os_text() {
        let err = Error::LockFailure {
            op: "pthread_mutex_lock",
            code: 22,
        };
        let msg = err.to_string();

        assert!(msg.starts_with("pthread_mutex_lock failed: "), "{msg}");
        assert!(msg.len() > "pthread_mutex_lock failed: ".len());
    }
}
