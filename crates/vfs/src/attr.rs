//! 卷属性与能力位
//!
//! 位值与 getattrlist 接口保持一致，卷 getattr 以 [`VfsAttr`] 整体返回。

use alloc::string::String;
use uapi::time::TimeSpec;

use crate::FsId;

bitflags::bitflags! {
    /// 卷格式能力
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VolCapFormat: u32 {
        /// 对象 ID 持久
        const PERSISTENTOBJECTIDS = 0x0000_0001;
        /// 支持符号链接
        const SYMBOLICLINKS = 0x0000_0002;
        /// 支持硬链接
        const HARDLINKS = 0x0000_0004;
        /// 支持日志
        const JOURNAL = 0x0000_0008;
        /// 日志已启用
        const JOURNAL_ACTIVE = 0x0000_0010;
        /// 根目录不维护时间
        const NO_ROOT_TIMES = 0x0000_0020;
        /// 支持稀疏文件
        const SPARSE_FILES = 0x0000_0040;
        /// 零区段不占空间
        const ZERO_RUNS = 0x0000_0080;
        /// 大小写敏感
        const CASE_SENSITIVE = 0x0000_0100;
        /// 保留大小写
        const CASE_PRESERVING = 0x0000_0200;
        /// statfs 代价低
        const FAST_STATFS = 0x0000_0400;
        /// 支持 2TB 以上文件
        const FILESIZE_2TB = 0x0000_0800;
    }
}

bitflags::bitflags! {
    /// 卷接口能力
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VolCapInterfaces: u32 {
        /// searchfs
        const SEARCHFS = 0x0000_0001;
        /// getattrlist / setattrlist
        const ATTRLIST = 0x0000_0002;
        /// 可被 NFS 导出
        const NFSEXPORT = 0x0000_0004;
        /// readdirattr
        const READDIRATTR = 0x0000_0008;
        /// exchangedata
        const EXCHANGEDATA = 0x0000_0010;
        /// copyfile
        const COPYFILE = 0x0000_0020;
        /// 预分配
        const ALLOCATE = 0x0000_0040;
        /// 卷重命名
        const VOL_RENAME = 0x0000_0080;
        /// POSIX 记录锁
        const ADVLOCK = 0x0000_0100;
        /// flock
        const FLOCK = 0x0000_0200;
        /// 扩展安全属性
        const EXTENDED_SECURITY = 0x0000_0400;
        /// 用户访问检查
        const USERACCESS = 0x0000_0800;
    }
}

bitflags::bitflags! {
    /// 通用属性
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommonAttrs: u32 {
        /// 名字
        const NAME = 0x0000_0001;
        /// 设备号
        const DEVID = 0x0000_0002;
        /// 卷 ID
        const FSID = 0x0000_0004;
        /// 对象类型
        const OBJTYPE = 0x0000_0008;
        /// 对象标签
        const OBJTAG = 0x0000_0010;
        /// 对象 ID
        const OBJID = 0x0000_0020;
        /// 持久对象 ID
        const OBJPERMANENTID = 0x0000_0040;
        /// 父对象 ID
        const PAROBJID = 0x0000_0080;
        /// 文字编码
        const SCRIPT = 0x0000_0100;
        /// 创建时间
        const CRTIME = 0x0000_0200;
        /// 修改时间
        const MODTIME = 0x0000_0400;
        /// 状态改变时间
        const CHGTIME = 0x0000_0800;
        /// 访问时间
        const ACCTIME = 0x0000_1000;
        /// 备份时间
        const BKUPTIME = 0x0000_2000;
        /// Finder 信息
        const FNDRINFO = 0x0000_4000;
        /// 所有者
        const OWNERID = 0x0000_8000;
        /// 组
        const GRPID = 0x0001_0000;
        /// 访问掩码
        const ACCESSMASK = 0x0002_0000;
        /// 标志
        const FLAGS = 0x0004_0000;
        /// 调用者访问权限
        const USERACCESS = 0x0020_0000;
        /// 扩展安全属性
        const EXTENDED_SECURITY = 0x0040_0000;
        /// 所有者 UUID
        const UUID = 0x0080_0000;
        /// 组 UUID
        const GRPUUID = 0x0100_0000;
    }
}

bitflags::bitflags! {
    /// 卷属性
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VolumeAttrs: u32 {
        /// 文件系统类型
        const FSTYPE = 0x0000_0001;
        /// 卷签名
        const SIGNATURE = 0x0000_0002;
        /// 卷大小
        const SIZE = 0x0000_0004;
        /// 空闲空间
        const SPACEFREE = 0x0000_0008;
        /// 可用空间
        const SPACEAVAIL = 0x0000_0010;
        /// 最小分配单元
        const MINALLOCATION = 0x0000_0020;
        /// 分配簇大小
        const ALLOCATIONCLUMP = 0x0000_0040;
        /// 最佳 I/O 大小
        const IOBLOCKSIZE = 0x0000_0080;
        /// 对象数
        const OBJCOUNT = 0x0000_0100;
        /// 文件数
        const FILECOUNT = 0x0000_0200;
        /// 目录数
        const DIRCOUNT = 0x0000_0400;
        /// 最大对象数
        const MAXOBJCOUNT = 0x0000_0800;
        /// 挂载点
        const MOUNTPOINT = 0x0000_1000;
        /// 卷名
        const NAME = 0x0000_2000;
        /// 挂载标志
        const MOUNTFLAGS = 0x0000_4000;
        /// 挂载设备
        const MOUNTEDDEVICE = 0x0000_8000;
        /// 已用编码
        const ENCODINGSUSED = 0x0001_0000;
        /// 能力位
        const CAPABILITIES = 0x0002_0000;
        /// 属性位
        const ATTRIBUTES = 0x4000_0000;
    }
}

bitflags::bitflags! {
    /// 目录属性
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirAttrs: u32 {
        /// 链接数
        const LINKCOUNT = 0x0000_0001;
        /// 条目数
        const ENTRYCOUNT = 0x0000_0002;
        /// 挂载状态
        const MOUNTSTATUS = 0x0000_0004;
    }
}

bitflags::bitflags! {
    /// 文件属性
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAttrs: u32 {
        /// 链接数
        const LINKCOUNT = 0x0000_0001;
        /// 总大小
        const TOTALSIZE = 0x0000_0002;
        /// 分配大小
        const ALLOCSIZE = 0x0000_0004;
        /// 最佳 I/O 大小
        const IOBLOCKSIZE = 0x0000_0008;
        /// 设备类型
        const DEVTYPE = 0x0000_0020;
        /// 分支数
        const FORKCOUNT = 0x0000_0080;
        /// 分支列表
        const FORKLIST = 0x0000_0100;
        /// 数据分支长度
        const DATALENGTH = 0x0000_0200;
        /// 数据分支分配大小
        const DATAALLOCSIZE = 0x0000_0400;
        /// 资源分支长度
        const RSRCLENGTH = 0x0000_1000;
        /// 资源分支分配大小
        const RSRCALLOCSIZE = 0x0000_2000;
    }
}

/// 卷能力：`capabilities` 是支持的位，`valid` 是驱动“认识”的位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolCapabilities {
    /// 格式能力
    pub format: VolCapFormat,
    /// 驱动认识的格式能力
    pub format_valid: VolCapFormat,
    /// 接口能力
    pub interfaces: VolCapInterfaces,
    /// 驱动认识的接口能力
    pub interfaces_valid: VolCapInterfaces,
}

/// 一组属性位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSet {
    /// 通用属性
    pub common: CommonAttrs,
    /// 卷属性
    pub volume: VolumeAttrs,
    /// 目录属性
    pub dir: DirAttrs,
    /// 文件属性
    pub file: FileAttrs,
    /// 分支属性（当前没有定义任何位）
    pub fork: u32,
}

/// 卷支持的属性：`valid` 是能回答的，`native` 是无需转换直接回答的
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolAttributes {
    /// 能回答的属性
    pub valid: AttrSet,
    /// 原生支持的属性
    pub native: AttrSet,
}

/// 卷属性快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsAttr {
    /// 对象总数
    pub objcount: u64,
    /// 文件数
    pub filecount: u64,
    /// 目录数
    pub dircount: u64,
    /// 最大对象数
    pub maxobjcount: u64,
    /// 块大小
    pub bsize: u32,
    /// 最佳 I/O 大小
    pub iosize: u32,
    /// 总块数
    pub blocks: u64,
    /// 空闲块数
    pub bfree: u64,
    /// 可用块数
    pub bavail: u64,
    /// 已用块数
    pub bused: u64,
    /// 总对象槽数
    pub files: u64,
    /// 空闲对象槽数
    pub ffree: u64,
    /// 卷 ID
    pub fsid: FsId,
    /// 能力位
    pub capabilities: VolCapabilities,
    /// 属性位
    pub attributes: VolAttributes,
    /// 卷创建时间
    pub create_time: TimeSpec,
    /// 子类型
    pub fssubtype: u32,
    /// 卷名
    pub vol_name: String,
}
