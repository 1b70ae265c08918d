//! 文件系统抽象
//!
//! [`FileSystemType`] 是一个驱动对外注册的挂载入口，每次成功挂载得到一个
//! [`FileSystem`]，分发层之后的卷级操作都经由它完成。

use alloc::sync::Arc;

use crate::{FsError, Vnode, VfsAttr, VnodeRef};

/// 卷标识，由分发层在挂载时分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(pub u64);

bitflags::bitflags! {
    /// 挂载标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MountFlags: u32 {
        /// 只读
        const RDONLY = 0x0000_0001;
        /// 同步写
        const SYNCHRONOUS = 0x0000_0002;
        /// 禁止执行
        const NOEXEC = 0x0000_0004;
        /// 忽略 set-id 位
        const NOSUID = 0x0000_0008;
        /// 不解释设备文件
        const NODEV = 0x0000_0010;
        /// 本地卷
        const LOCAL = 0x0000_1000;
        /// 更新已有挂载
        const UPDATE = 0x0001_0000;
        /// 忽略所有权
        const IGNORE_OWNERSHIP = 0x0020_0000;
    }
}

bitflags::bitflags! {
    /// 卸载标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UnmountFlags: u32 {
        /// 强制卸载
        const FORCE = 0x0008_0000;
    }
}

bitflags::bitflags! {
    /// 文件系统类型注册标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FsTypeFlags: u32 {
        /// 驱动自行处理并发
        const THREADSAFE = 0x0001;
        /// 驱动自行处理对象锁
        const FSNODELOCK = 0x0002;
        /// 不需要分发层分配类型号
        const NOTYPENUM = 0x0004;
        /// 本地卷
        const LOCALVOL = 0x0008;
        /// 支持 64 位调用者
        const READY_64BIT = 0x0010;
    }
}

/// 卷 ID：设备号 + 文件系统类型号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FsId {
    /// 卷所在设备号
    pub dev: u64,
    /// 文件系统类型号
    pub type_num: u32,
}

/// 一次挂载请求
#[derive(Debug, Clone, Copy)]
pub struct MountRequest<'a> {
    /// 分发层为该卷分配的标识
    pub mount: MountId,
    /// 调用者传入的挂载标志
    pub flags: MountFlags,
    /// 设备对象（调用者持有引用）
    pub device: VnodeRef,
    /// 驱动私有的挂载参数块
    pub data: &'a [u8],
    /// 分发层分配的文件系统类型号
    pub type_num: u32,
}

/// 文件系统统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFs {
    /// 块大小（单位：字节）
    pub block_size: u32,
    /// 最佳 I/O 大小
    pub io_size: u32,
    /// 总块数
    pub total_blocks: u64,
    /// 空闲块数
    pub free_blocks: u64,
    /// 可用块数（非特权用户）
    pub available_blocks: u64,
    /// 已用块数
    pub used_blocks: u64,
    /// 总对象数
    pub total_files: u64,
    /// 空闲对象数
    pub free_files: u64,
    /// 卷 ID
    pub fsid: FsId,
}

/// 已挂载卷
///
/// 所有文件系统实现都必须实现此 trait
pub trait FileSystem: Send + Sync {
    /// 文件系统类型名称
    fn fs_type(&self) -> &'static str;

    /// 卷标识
    fn mount_id(&self) -> MountId;

    /// 卷当前的挂载标志
    fn mount_flags(&self) -> MountFlags;

    /// 挂载完成后、首次使用前调用
    fn start(&self, _flags: u32) -> Result<(), FsError> {
        Ok(())
    }

    /// 获取根对象（返回的句柄持有一个 iocount）
    fn root(&self) -> Result<Vnode, FsError>;

    /// 卷属性
    fn getattr(&self) -> Result<VfsAttr, FsError>;

    /// 获取文件系统统计信息
    fn statfs(&self) -> Result<StatFs, FsError>;

    /// 卸载
    fn unmount(&self, flags: UnmountFlags) -> Result<(), FsError>;
}

/// 文件系统类型
pub trait FileSystemType: Send + Sync {
    /// 类型名称
    fn name(&self) -> &'static str;

    /// 注册标志
    fn flags(&self) -> FsTypeFlags;

    /// 挂载一个新卷
    fn mount(&self, req: MountRequest<'_>) -> Result<Arc<dyn FileSystem>, FsError>;
}
