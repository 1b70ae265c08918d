//! 对象属性
//!
//! 分发层的 getattr 以 [`InodeMetadata`] 为结果，驱动只填写它支持的字段。

use uapi::fs::{DT_BLK, DT_CHR, DT_DIR, DT_FIFO, DT_LNK, DT_REG, DT_SOCK};
use uapi::time::TimeSpec;

/// 文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    /// 普通文件
    File,
    /// 目录
    Directory,
    /// 符号链接
    Symlink,
    /// 字符设备
    CharDevice,
    /// 块设备
    BlockDevice,
    /// 命名管道
    Fifo,
    /// 套接字
    Socket,
}

impl InodeType {
    /// 对应的目录项类型（`DT_*`）
    pub fn to_d_type(self) -> u8 {
        match self {
            InodeType::File => DT_REG,
            InodeType::Directory => DT_DIR,
            InodeType::Symlink => DT_LNK,
            InodeType::CharDevice => DT_CHR,
            InodeType::BlockDevice => DT_BLK,
            InodeType::Fifo => DT_FIFO,
            InodeType::Socket => DT_SOCK,
        }
    }

    /// 对应的 `S_IFMT` 类型位
    pub fn to_mode_bits(self) -> FileMode {
        match self {
            InodeType::File => FileMode::S_IFREG,
            InodeType::Directory => FileMode::S_IFDIR,
            InodeType::Symlink => FileMode::S_IFLNK,
            InodeType::CharDevice => FileMode::S_IFCHR,
            InodeType::BlockDevice => FileMode::S_IFBLK,
            InodeType::Fifo => FileMode::S_IFIFO,
            InodeType::Socket => FileMode::S_IFSOCK,
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// 文件权限和类型（与 POSIX 兼容）
    pub struct FileMode: u32 {
        // 文件类型掩码
        /// 文件类型掩码
        const S_IFMT   = 0o170000;
        /// 普通文件
        const S_IFREG  = 0o100000;
        /// 目录
        const S_IFDIR  = 0o040000;
        /// 符号链接
        const S_IFLNK  = 0o120000;
        /// 字符设备
        const S_IFCHR  = 0o020000;
        /// 块设备
        const S_IFBLK  = 0o060000;
        /// FIFO
        const S_IFIFO  = 0o010000;
        /// Socket
        const S_IFSOCK = 0o140000;

        // 用户权限
        /// 用户读
        const S_IRUSR  = 0o400;
        /// 用户写
        const S_IWUSR  = 0o200;
        /// 用户执行
        const S_IXUSR  = 0o100;

        // 组权限
        /// 组读
        const S_IRGRP  = 0o040;
        /// 组写
        const S_IWGRP  = 0o020;
        /// 组执行
        const S_IXGRP  = 0o010;

        // 其他用户权限
        /// 其他读
        const S_IROTH  = 0o004;
        /// 其他写
        const S_IWOTH  = 0o002;
        /// 其他执行
        const S_IXOTH  = 0o001;
    }
}

impl FileMode {
    /// 权限位（去掉类型位）
    pub fn permissions(&self) -> u32 {
        self.bits() & 0o7777
    }

    /// 检查是否有写权限（任一类用户）
    pub fn any_write(&self) -> bool {
        self.intersects(FileMode::S_IWUSR | FileMode::S_IWGRP | FileMode::S_IWOTH)
    }
}

/// 对象元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeMetadata {
    /// 对象编号
    pub inode_no: u64,
    /// 文件类型
    pub inode_type: InodeType,
    /// 类型与权限位
    pub mode: FileMode,
    /// 硬链接数
    pub nlinks: u32,
    /// 逻辑大小（字节）
    pub size: u64,
    /// 设备号（仅对设备文件有意义）
    pub rdev: u64,
    /// 所在卷的设备号
    pub fsid: u64,
    /// 创建时间
    pub crtime: TimeSpec,
    /// 访问时间
    pub atime: TimeSpec,
    /// 修改时间
    pub mtime: TimeSpec,
    /// 状态改变时间
    pub ctime: TimeSpec,
}
