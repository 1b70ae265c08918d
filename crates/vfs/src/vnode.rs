//! Vnode 抽象层 - 驱动与活跃对象缓存之间的契约
//!
//! 分发层维护一个全局的活跃对象缓存，缓存中的每个对象称为 vnode。
//! vnode 的生命周期由缓存决定，驱动只能：
//!
//! - 通过 [`VnodeCache::create`] 创建新 vnode（创建结果带一个 iocount）
//! - 通过 [`VnodeCache::add_fs_ref`] 登记自己记住了某个 vnode（软引用）
//! - 通过 [`VnodeCache::get_with_vid`] 用“标识 + 代号”复活一个记住的 vnode
//! - 在 [`VnodeOps::reclaim`] 回调中忘记它
//!
//! 驱动自己保存的永远是 [`VnodeRef`]（不持有任何计数），真正的持有型句柄是
//! [`Vnode`]，离开作用域时自动归还 iocount。

use alloc::sync::Arc;
use core::fmt;

use crate::{FsError, InodeMetadata, InodeType, MountId, Uio};

/// 缓存为每个 vnode 分配的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VnodeId(pub u64);

/// 非持有型 vnode 引用：标识 + 代号
///
/// 标识可能被缓存回收后复用，代号 (vid) 在每次回收时改变，
/// 因此同一个 `VnodeRef` 在被回收后再也无法通过 [`VnodeCache::get_with_vid`] 复活。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VnodeRef {
    id: VnodeId,
    vid: u32,
}

impl VnodeRef {
    /// 由缓存构造
    pub const fn new(id: VnodeId, vid: u32) -> Self {
        Self { id, vid }
    }

    /// 标识
    pub fn id(&self) -> VnodeId {
        self.id
    }

    /// 代号
    pub fn vid(&self) -> u32 {
        self.vid
    }
}

impl fmt::Display for VnodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vnode#{}.{}", self.id.0, self.vid)
    }
}

bitflags::bitflags! {
    /// vnode 创建标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VnodeCreateFlags: u32 {
        /// 不进入名字缓存
        const NOCACHE = 0x01;
        /// 永远不能进入名字缓存
        const CANTCACHE = 0x02;
    }
}

bitflags::bitflags! {
    /// 刷新标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FlushFlags: u32 {
        /// 正在使用的 vnode 也强制回收
        const FORCECLOSE = 0x02;
    }
}

bitflags::bitflags! {
    /// open / close 模式位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u32 {
        /// 读
        const READ = 0x0001;
        /// 写
        const WRITE = 0x0002;
        /// 非阻塞
        const NONBLOCK = 0x0004;
        /// 只用于事件通知
        const EVTONLY = 0x8000;
    }
}

bitflags::bitflags! {
    /// readdir 选项
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReadDirFlags: u32 {
        /// 扩展目录项格式
        const EXTENDED = 0x0001;
        /// 每项都要求返回 seek 偏移
        const REQSEEKOFF = 0x0002;
    }
}

bitflags::bitflags! {
    /// 路径分量标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComponentFlags: u32 {
        /// 分量是 ".."
        const ISDOTDOT = 0x0000_2000;
        /// 允许进入名字缓存
        const MAKEENTRY = 0x0000_4000;
        /// 路径的最后一个分量
        const ISLASTCN = 0x0000_8000;
    }
}

/// 待查找的路径分量
#[derive(Debug, Clone, Copy)]
pub struct ComponentName<'a> {
    name: &'a str,
    flags: ComponentFlags,
}

impl<'a> ComponentName<'a> {
    /// 构造分量，名字为 ".." 时自动设置 [`ComponentFlags::ISDOTDOT`]
    pub fn new(name: &'a str) -> Self {
        let mut flags = ComponentFlags::ISLASTCN;
        if name == ".." {
            flags |= ComponentFlags::ISDOTDOT;
        }
        Self { name, flags }
    }

    /// 使用调用者给定的标志构造
    pub fn with_flags(name: &'a str, flags: ComponentFlags) -> Self {
        Self { name, flags }
    }

    /// 名字
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// 标志
    pub fn flags(&self) -> ComponentFlags {
        self.flags
    }

    /// 是否指向父目录
    pub fn is_dotdot(&self) -> bool {
        self.flags.contains(ComponentFlags::ISDOTDOT)
    }
}

/// readdir 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadDirResult {
    /// 已经返回了目录的最后一项
    pub eof: bool,
    /// 本次写出的记录数
    pub num_entries: usize,
}

/// vnode 创建参数
pub struct VnodeParams {
    /// 所属卷
    pub mount: MountId,
    /// 对象类型
    pub vtype: InodeType,
    /// 该 vnode 的操作表
    pub ops: Arc<dyn VnodeOps>,
    /// 是否是卷的根
    pub is_root: bool,
    /// 是否是系统 vnode
    pub is_system: bool,
    /// 设备号（只对设备文件有意义）
    pub rdev: u64,
    /// 文件大小（目录无意义）
    pub file_size: u64,
    /// 创建标志
    pub flags: VnodeCreateFlags,
}

impl fmt::Debug for VnodeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VnodeParams")
            .field("mount", &self.mount)
            .field("vtype", &self.vtype)
            .field("is_root", &self.is_root)
            .field("is_system", &self.is_system)
            .field("rdev", &self.rdev)
            .field("file_size", &self.file_size)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// 分发层的活跃对象缓存
///
/// 实现必须保证：某个 vnode 被回收（`reclaim` 回调返回）之后，
/// 回收前的 [`VnodeRef`] 在 `get` / `get_with_vid` 中都返回 [`FsError::Stale`]。
pub trait VnodeCache: Send + Sync {
    /// 创建一个新 vnode，返回时调用者持有一个 iocount
    fn create(&self, params: VnodeParams) -> Result<VnodeRef, FsError>;

    /// 在调用者已持有的 vnode 上再取一个 iocount
    fn get(&self, vn: VnodeRef) -> Result<(), FsError>;

    /// 复活一个未持有的 vnode：代号一致且未在回收中时取得一个 iocount
    fn get_with_vid(&self, vn: VnodeRef) -> Result<(), FsError>;

    /// 归还一个 iocount
    fn put(&self, vn: VnodeRef);

    /// 登记驱动持有的软引用
    fn add_fs_ref(&self, vn: VnodeRef) -> Result<(), FsError>;

    /// 撤销驱动持有的软引用
    fn remove_fs_ref(&self, vn: VnodeRef) -> Result<(), FsError>;

    /// 取得一个长期使用引用（usecount）
    fn use_ref(&self, vn: VnodeRef) -> Result<(), FsError>;

    /// 归还长期使用引用
    fn use_rele(&self, vn: VnodeRef);

    /// 对象类型
    fn vtype(&self, vn: VnodeRef) -> Result<InodeType, FsError>;

    /// 设备 vnode 的设备号
    fn spec_rdev(&self, vn: VnodeRef) -> Result<u64, FsError>;

    /// 回收卷上所有未被使用的 vnode
    ///
    /// 没有 [`FlushFlags::FORCECLOSE`] 时，仍有 vnode 在使用则返回 [`FsError::Busy`]。
    fn flush(&self, mount: MountId, flags: FlushFlags) -> Result<(), FsError>;
}

/// 持有型 vnode 句柄
///
/// 持有一个 iocount，Drop 时归还。
pub struct Vnode {
    vref: VnodeRef,
    cache: Arc<dyn VnodeCache>,
}

impl Vnode {
    /// 接管调用者已经持有的一个 iocount
    pub fn from_iocount(cache: Arc<dyn VnodeCache>, vref: VnodeRef) -> Self {
        Self { vref, cache }
    }

    /// 非持有型引用
    pub fn vref(&self) -> VnodeRef {
        self.vref
    }

    /// 标识
    pub fn id(&self) -> VnodeId {
        self.vref.id
    }

    /// 所在缓存
    pub fn cache(&self) -> &Arc<dyn VnodeCache> {
        &self.cache
    }

    /// 在同一对象上再取一个 iocount
    pub fn try_clone(&self) -> Result<Vnode, FsError> {
        self.cache.get(self.vref)?;
        Ok(Self::from_iocount(self.cache.clone(), self.vref))
    }

    /// 对象类型
    pub fn vtype(&self) -> Result<InodeType, FsError> {
        self.cache.vtype(self.vref)
    }

    /// 是否是目录
    pub fn is_dir(&self) -> bool {
        matches!(self.vtype(), Ok(InodeType::Directory))
    }
}

impl Drop for Vnode {
    fn drop(&mut self) {
        self.cache.put(self.vref);
    }
}

impl fmt::Debug for Vnode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Vnode").field(&self.vref).finish()
    }
}

/// 单个对象上的操作表
///
/// 没有列出的操作（读写、创建、删除……）由分发层直接以 [`FsError::NotSupported`] 拒绝。
pub trait VnodeOps: Send + Sync {
    /// 在目录 `dvp` 中查找分量，返回的句柄持有一个 iocount
    fn lookup(&self, dvp: &Vnode, cn: &ComponentName<'_>) -> Result<Vnode, FsError>;

    /// 打开
    fn open(&self, vp: &Vnode, mode: OpenMode) -> Result<(), FsError>;

    /// 关闭
    fn close(&self, vp: &Vnode, fflag: OpenMode) -> Result<(), FsError>;

    /// 获取对象属性
    fn getattr(&self, vp: &Vnode) -> Result<InodeMetadata, FsError>;

    /// 从 `uio` 的游标开始枚举目录项
    fn readdir(&self, vp: &Vnode, uio: &mut Uio, flags: ReadDirFlags)
    -> Result<ReadDirResult, FsError>;

    /// 缓存即将回收 `vn`，驱动必须忘记它
    fn reclaim(&self, vn: VnodeRef) -> Result<(), FsError>;
}
