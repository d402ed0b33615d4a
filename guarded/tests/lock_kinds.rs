use guarded::{Error, Lock, LockKind, ScopedGuard, ThreadSafe, ThreadSafeVec};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Spawns a thread that blocks on `lock` and reports once it gets through.
fn contender(lock: &Arc<Lock>) -> (mpsc::Receiver<()>, thread::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let lock = lock.clone();

    let handle = thread::spawn(move || {
        let _guard = ScopedGuard::new(&lock).unwrap();
        tx.send(()).unwrap();
    });

    (rx, handle)
}

#[guarded::test]
fn recursive_lock_needs_matching_releases() {
    let lock = Arc::new(Lock::new(LockKind::Recursive));

    let outer = ScopedGuard::new(&lock).unwrap();
    let inner = ScopedGuard::new(&lock).unwrap();

    let (acquired, handle) = contender(&lock);

    drop(inner);
    assert_eq!(
        acquired.recv_timeout(Duration::from_millis(100)),
        Err(mpsc::RecvTimeoutError::Timeout),
        "other thread got in after a single release"
    );

    drop(outer);
    acquired
        .recv_timeout(Duration::from_secs(5))
        .expect("other thread never acquired the lock");

    handle.join().unwrap();
}

#[guarded::test(timeout_ms = 200)]
#[should_panic(expected = "exceeded timeout")]
fn normal_lock_relock_deadlocks() {
    let lock = Lock::new(LockKind::Normal);

    let _first = ScopedGuard::new(&lock).unwrap();
    let _second = ScopedGuard::new(&lock).unwrap();
}

#[guarded::test(timeout_ms = 200)]
#[should_panic(expected = "exceeded timeout")]
fn nested_operation_on_normal_vec_deadlocks() {
    let v: ThreadSafeVec<u8> = vec![1].into();

    let _view = v.lock().unwrap();
    let _ = v.size();
}

#[guarded::test]
fn error_check_lock_reports_instead_of_deadlocking() {
    let lock = Lock::new(LockKind::ErrorCheck);

    let _first = ScopedGuard::new(&lock).unwrap();
    assert_eq!(ScopedGuard::new(&lock).unwrap_err(), Error::WouldDeadlock);
}

#[guarded::test]
fn recursive_holder_refuses_second_view() {
    let v = ThreadSafe::with_kind(vec![1, 2, 3], LockKind::Recursive);

    let view = v.lock().unwrap();
    assert_eq!(v.size(), Err(Error::Reentrant));
    assert_eq!(view.len(), 3);
    drop(view);

    assert_eq!(v.size(), Ok(3));
}

#[guarded::test]
fn kinds_from_configuration_strings() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for (name, kind) in [
        ("normal", LockKind::Normal),
        ("errorcheck", LockKind::ErrorCheck),
        ("recursive", LockKind::Recursive),
    ] {
        let lock = Lock::try_new(name.parse()?)?;
        assert_eq!(lock.kind(), kind);
    }

    Ok(())
}
