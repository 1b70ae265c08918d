//! 时间结构

/// 秒 + 纳秒的时间表示
///
/// 对应 POSIX 的 `struct timespec`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpec {
    /// 秒
    pub tv_sec: i64,
    /// 纳秒（0..1_000_000_000）
    pub tv_nsec: i64,
}

impl TimeSpec {
    /// 纪元零点
    pub const ZERO: TimeSpec = TimeSpec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    /// 由秒和纳秒构造
    pub const fn new(tv_sec: i64, tv_nsec: i64) -> Self {
        Self { tv_sec, tv_nsec }
    }

    /// 是否为纪元零点
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}
