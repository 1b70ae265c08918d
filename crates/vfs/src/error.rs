//! VFS 错误类型
//!
//! 定义了与 POSIX 兼容的文件系统错误码，可通过 [`FsError::to_errno()`] 转换为系统调用错误码。

use core::fmt;

/// VFS 错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    // 文件/目录相关
    /// 文件不存在 (-ENOENT)
    NotFound,
    /// 不是目录 (-ENOTDIR)
    NotDirectory,

    // 参数相关
    /// 无效参数 (-EINVAL)
    InvalidArgument,

    // 资源相关
    /// 内存不足 (-ENOMEM)
    NoMemory,
    /// 缓冲区空间不足 (-ENOBUFS)
    NoBuffers,
    /// 对象正被使用 (-EBUSY)
    Busy,

    // 文件系统相关
    /// 只读文件系统 (-EROFS)
    ReadOnlyFs,
    /// I/O 错误 (-EIO)
    IoError,
    /// 句柄已失效 (-ESTALE)
    Stale,

    // 其他
    /// 操作不支持 (-ENOTSUP)
    NotSupported,
}

impl FsError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            FsError::NotFound => -2,
            FsError::IoError => -5,
            FsError::NoMemory => -12,
            FsError::Busy => -16,
            FsError::NotDirectory => -20,
            FsError::InvalidArgument => -22,
            FsError::ReadOnlyFs => -30,
            FsError::NotSupported => -95,
            FsError::NoBuffers => -105,
            FsError::Stale => -116,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FsError::NotFound => "no such file or directory",
            FsError::NotDirectory => "not a directory",
            FsError::InvalidArgument => "invalid argument",
            FsError::NoMemory => "out of memory",
            FsError::NoBuffers => "no buffer space available",
            FsError::Busy => "resource busy",
            FsError::ReadOnlyFs => "read-only file system",
            FsError::IoError => "input/output error",
            FsError::Stale => "stale handle",
            FsError::NotSupported => "operation not supported",
        };
        write!(f, "{} ({})", msg, self.to_errno())
    }
}

impl core::error::Error for FsError {}
