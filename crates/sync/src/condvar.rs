//! 自旋锁条件变量
//!
//! 管程式等待：在持锁状态下检查条件，条件不满足时释放锁等待通知，
//! 被唤醒后重新持锁并再次检查条件。
//!
//! 等待者在持锁时记下通知序号，通知者在持锁时递增序号，
//! 因此“检查条件 → 开始等待”之间不会丢失通知。
//! 唤醒可能是伪唤醒（例如多个事件合并为一次序号变化），调用者必须循环检查。

use core::hint;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::spin_lock::SpinLockGuard;

/// 配合 [`crate::SpinLock`] 使用的条件变量
///
/// # 示例
/// ```ignore
/// let mut guard = lock.lock();
/// while !guard.ready {
///     guard = cond.wait(guard);
/// }
/// ```
#[derive(Debug, Default)]
pub struct SpinCondvar {
    seq: AtomicUsize,
}

impl SpinCondvar {
    /// 创建条件变量
    pub const fn new() -> Self {
        Self {
            seq: AtomicUsize::new(0),
        }
    }

    /// 释放 `guard` 并等待通知，返回时重新持有同一把锁
    ///
    /// 等待期间中断保持原状态（保护器已释放），不会长时间关中断自旋。
    pub fn wait<'a, T>(&self, guard: SpinLockGuard<'a, T>) -> SpinLockGuard<'a, T> {
        let lock = guard.lock_ref();
        let seen = self.seq.load(Ordering::Acquire);
        drop(guard);

        while self.seq.load(Ordering::Acquire) == seen {
            hint::spin_loop();
        }

        lock.lock()
    }

    /// 唤醒所有等待者
    ///
    /// 应在持有与等待者相同的锁时调用。
    pub fn notify_all(&self) {
        self.seq.fetch_add(1, Ordering::Release);
    }

    /// 当前通知序号 (仅用于调试/测试)
    pub fn generation(&self) -> usize {
        self.seq.load(Ordering::Acquire)
    }
}
