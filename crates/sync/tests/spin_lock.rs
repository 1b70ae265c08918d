use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sync::{SpinCondvar, SpinLock};

#[test]
fn test_spin_lock_counter() {
    test_support::mock::arch::install();

    let lock = Arc::new(SpinLock::new(0usize));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let lock = lock.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    *lock.lock() += 1;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(*lock.lock(), 4000);
}

#[test]
fn test_try_lock_contended() {
    test_support::mock::arch::install();

    let lock = SpinLock::new(1);
    let guard = lock.lock();
    assert!(lock.try_lock().is_none());
    drop(guard);
    assert_eq!(*lock.try_lock().unwrap(), 1);
}

#[test]
fn test_condvar_wakes_all_waiters() {
    test_support::mock::arch::install();

    struct Shared {
        state: SpinLock<(bool, usize)>,
        cond: SpinCondvar,
    }
    let shared = Arc::new(Shared {
        state: SpinLock::new((false, 0)),
        cond: SpinCondvar::new(),
    });

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut guard = shared.state.lock();
                while !guard.0 {
                    guard.1 += 1;
                    guard = shared.cond.wait(guard);
                }
            })
        })
        .collect();

    // 等三个等待者都进入 wait
    loop {
        if shared.state.lock().1 == 3 {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }

    {
        let mut guard = shared.state.lock();
        guard.0 = true;
        shared.cond.notify_all();
    }
    for w in waiters {
        w.join().unwrap();
    }
    assert_eq!(shared.cond.generation(), 1);
}

#[test]
fn test_condvar_spurious_wakeup_rechecks() {
    test_support::mock::arch::install();

    let state = Arc::new(SpinLock::new(0u32));
    let cond = Arc::new(SpinCondvar::new());

    let waiter = {
        let state = state.clone();
        let cond = cond.clone();
        thread::spawn(move || {
            let mut guard = state.lock();
            let mut wakeups = 0;
            while *guard < 2 {
                guard = cond.wait(guard);
                wakeups += 1;
            }
            wakeups
        })
    };

    for _ in 0..2 {
        thread::sleep(Duration::from_millis(20));
        let mut guard = state.lock();
        *guard += 1;
        cond.notify_all();
    }
    assert!(waiter.join().unwrap() >= 1);
}

#[test]
fn test_arch_ops_registered_after_install() {
    test_support::mock::arch::install();
    assert!(sync::arch_ops_registered());
}
