//! 时钟 Mock

use std::sync::Mutex;

use uapi::time::TimeSpec;
use vfs::VfsOps;

/// 可手动拨动的时钟
pub struct MockClock {
    now: Mutex<TimeSpec>,
}

impl MockClock {
    /// 以给定时间创建
    pub fn new(now: TimeSpec) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// 设置当前时间
    pub fn set(&self, now: TimeSpec) {
        *self.now.lock().unwrap() = now;
    }

    /// 前进 `secs` 秒
    pub fn advance(&self, secs: i64) {
        self.now.lock().unwrap().tv_sec += secs;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(TimeSpec::new(1_700_000_000, 0))
    }
}

impl VfsOps for MockClock {
    fn timespec_now(&self) -> TimeSpec {
        *self.now.lock().unwrap()
    }
}
