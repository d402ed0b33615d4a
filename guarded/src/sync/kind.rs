use std::fmt;
use std::str::FromStr;

/// Locking semantics selected when a [`Lock`](super::Lock) is created.
///
/// The kind is fixed for the lifetime of the lock. The platform layer maps
/// each kind onto whatever its native primitive supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockKind {
    /// Fastest kind. Relocking from the owning thread deadlocks.
    #[default]
    Normal,

    /// Relocking from the owner, or unlocking from a non-owner, reports an
    /// error instead of deadlocking or invoking undefined behavior.
    ErrorCheck,

    /// The owner may lock repeatedly and must unlock the same number of
    /// times before another thread can acquire the lock.
    Recursive,
}

impl LockKind {
    /// Returns `true` if the kind tracks its owner and reports misuse.
    pub fn checks_owner(self) -> bool {
        !matches!(self, LockKind::Normal)
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LockKind::Normal => "normal",
            LockKind::ErrorCheck => "error-check",
            LockKind::Recursive => "recursive",
        };

        f.write_str(name)
    }
}

/// Error returned when a string does not name a [`LockKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lock kind `{0}` (expected normal, error-check or recursive)")]
pub struct ParseLockKindError(String);

impl FromStr for LockKind {
    type Err = ParseLockKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "fast" | "default" => Ok(LockKind::Normal),
            "error-check" | "errorcheck" | "error_check" => Ok(LockKind::ErrorCheck),
            "recursive" | "reentrant" => Ok(LockKind::Recursive),
            _ => Err(ParseLockKindError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(LockKind::default(), LockKind::Normal);
        assert!(!LockKind::Normal.checks_owner());
        assert!(LockKind::ErrorCheck.checks_owner());
        assert!(LockKind::Recursive.checks_owner());
    }

    #[test]
    fn parses_config_names() {
        assert_eq!("normal".parse::<LockKind>(), Ok(LockKind::Normal));
        assert_eq!(" ErrorCheck ".parse::<LockKind>(), Ok(LockKind::ErrorCheck));
        assert_eq!("error-check".parse::<LockKind>(), Ok(LockKind::ErrorCheck));
        assert_eq!("RECURSIVE".parse::<LockKind>(), Ok(LockKind::Recursive));

        let err = "spin".parse::<LockKind>().unwrap_err();
        assert!(err.to_string().contains("`spin`"));
    }

    #[test]
    fn display_parses_back() {
        for kind in [LockKind::Normal, LockKind::ErrorCheck, LockKind::Recursive] {
            assert_eq!(kind.to_string().parse::<LockKind>(), Ok(kind));
        }
    }
}
