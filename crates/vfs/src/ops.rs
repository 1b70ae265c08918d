//! VFS 运行时操作 trait 定义
//!
//! 驱动需要宿主提供的运行时服务。实现由宿主构造，随驱动上下文显式传入，
//! 不经过全局注册。

use uapi::time::TimeSpec;

/// VFS 运行时操作
pub trait VfsOps: Send + Sync {
    /// 获取当前时间
    fn timespec_now(&self) -> TimeSpec;
}
