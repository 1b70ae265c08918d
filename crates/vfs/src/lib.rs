//! 虚拟文件系统分发层接口
//!
//! 此 crate 定义驱动与上层分发层之间的契约：
//!
//! - [`FileSystemType`] - 文件系统类型（挂载入口）
//! - [`FileSystem`] - 已挂载卷的操作
//! - [`VnodeOps`] - 单个对象的操作（lookup / open / readdir / reclaim ...）
//! - [`VnodeCache`] - 分发层维护的活跃对象缓存，驱动只通过它创建和复活 vnode
//! - [`Vnode`] / [`VnodeRef`] - 持有型句柄与非持有型（标识 + 代号）引用
//! - [`Uio`] - 调用者提供的输出缓冲区与游标

#![no_std]
#![allow(clippy::module_inception)]

extern crate alloc;

pub mod attr;
pub mod error;
pub mod ops;

mod file_system;
mod inode;
mod uio;
mod vnode;

// Re-export ops
pub use ops::VfsOps;

// Re-export error
pub use error::FsError;

// Re-export attr
pub use attr::{
    AttrSet, CommonAttrs, DirAttrs, FileAttrs, VfsAttr, VolAttributes, VolCapFormat,
    VolCapInterfaces, VolCapabilities, VolumeAttrs,
};

// Re-export inode
pub use inode::{FileMode, InodeMetadata, InodeType};

// Re-export file_system
pub use file_system::{
    FileSystem, FileSystemType, FsId, FsTypeFlags, MountFlags, MountId, MountRequest, StatFs,
    UnmountFlags,
};

// Re-export uio
pub use uio::Uio;

// Re-export vnode
pub use vnode::{
    ComponentFlags, ComponentName, FlushFlags, OpenMode, ReadDirFlags, ReadDirResult, Vnode,
    VnodeCache, VnodeCreateFlags, VnodeId, VnodeOps, VnodeParams, VnodeRef,
};

// Re-export uapi types for convenience
pub use uapi::fs::{DIRENT_RECLEN, Dirent};
pub use uapi::time::TimeSpec;
