//! 卷与根目录的静态属性
//!
//! 所有值在挂载时一次算好，之后只读，不需要加锁。

use alloc::string::String;

use uapi::fs::DIRENT_RECLEN;
use uapi::time::TimeSpec;
use vfs::{
    AttrSet, CommonAttrs, DirAttrs, FileAttrs, FileMode, FsId, InodeMetadata, InodeType, StatFs,
    VfsAttr, VolAttributes, VolCapFormat, VolCapInterfaces, VolCapabilities, VolumeAttrs,
};

/// 卷名
pub const VOLUME_NAME: &str = "EmptyFS";

/// 块大小和最佳 I/O 大小
pub const BLOCK_SIZE: u32 = 4096;

/// 根目录（也是卷上唯一对象）的对象编号
pub const ROOT_FILEID: u64 = 2;

/// 根目录的权限：r-xr-xr-x
pub const ROOT_MODE: FileMode = FileMode::S_IFDIR
    .union(FileMode::S_IRUSR)
    .union(FileMode::S_IXUSR)
    .union(FileMode::S_IRGRP)
    .union(FileMode::S_IXGRP)
    .union(FileMode::S_IROTH)
    .union(FileMode::S_IXOTH);

/// 卷能力
pub fn volume_capabilities() -> VolCapabilities {
    VolCapabilities {
        format: VolCapFormat::NO_ROOT_TIMES
            | VolCapFormat::CASE_SENSITIVE
            | VolCapFormat::CASE_PRESERVING
            | VolCapFormat::FAST_STATFS
            | VolCapFormat::FILESIZE_2TB,
        format_valid: VolCapFormat::all(),
        interfaces: VolCapInterfaces::ATTRLIST,
        interfaces_valid: VolCapInterfaces::all(),
    }
}

/// 卷支持的属性，全部原生支持
pub fn volume_attributes() -> VolAttributes {
    let valid = AttrSet {
        common: CommonAttrs::NAME
            | CommonAttrs::DEVID
            | CommonAttrs::FSID
            | CommonAttrs::OBJTYPE
            | CommonAttrs::OBJID
            | CommonAttrs::PAROBJID
            | CommonAttrs::CRTIME
            | CommonAttrs::OWNERID
            | CommonAttrs::GRPID
            | CommonAttrs::ACCESSMASK
            | CommonAttrs::FLAGS,
        volume: VolumeAttrs::FSTYPE
            | VolumeAttrs::SIZE
            | VolumeAttrs::SPACEFREE
            | VolumeAttrs::SPACEAVAIL
            | VolumeAttrs::IOBLOCKSIZE
            | VolumeAttrs::OBJCOUNT
            | VolumeAttrs::FILECOUNT
            | VolumeAttrs::DIRCOUNT
            | VolumeAttrs::MAXOBJCOUNT
            | VolumeAttrs::MOUNTPOINT
            | VolumeAttrs::NAME
            | VolumeAttrs::MOUNTFLAGS
            | VolumeAttrs::MOUNTEDDEVICE
            | VolumeAttrs::CAPABILITIES
            | VolumeAttrs::ATTRIBUTES,
        dir: DirAttrs::empty(),
        file: FileAttrs::TOTALSIZE
            | FileAttrs::IOBLOCKSIZE
            | FileAttrs::DATALENGTH
            | FileAttrs::DATAALLOCSIZE,
        fork: 0,
    };
    VolAttributes {
        valid,
        native: valid,
    }
}

/// 挂载时生成卷属性快照
pub fn build_vfs_attr(rdev: u64, type_num: u32, create_time: TimeSpec) -> VfsAttr {
    VfsAttr {
        objcount: 1,
        filecount: 0,
        dircount: 1,
        maxobjcount: 1,
        bsize: BLOCK_SIZE,
        iosize: BLOCK_SIZE,
        blocks: 1,
        bfree: 0,
        bavail: 0,
        bused: 1,
        files: 1,
        ffree: 0,
        fsid: FsId { dev: rdev, type_num },
        capabilities: volume_capabilities(),
        attributes: volume_attributes(),
        create_time,
        fssubtype: 0,
        vol_name: String::from(VOLUME_NAME),
    }
}

/// statfs 字段直接取自快照
pub fn statfs_from(attr: &VfsAttr) -> StatFs {
    StatFs {
        block_size: attr.bsize,
        io_size: attr.iosize,
        total_blocks: attr.blocks,
        free_blocks: attr.bfree,
        available_blocks: attr.bavail,
        used_blocks: attr.bused,
        total_files: attr.files,
        free_files: attr.ffree,
        fsid: attr.fsid,
    }
}

/// 根目录属性
///
/// 只有创建时间是真实维护的；访问、修改、状态改变时间固定为零点。
pub fn root_metadata(attr: &VfsAttr) -> InodeMetadata {
    InodeMetadata {
        inode_no: ROOT_FILEID,
        inode_type: InodeType::Directory,
        mode: ROOT_MODE,
        nlinks: 2,
        size: 2 * DIRENT_RECLEN as u64,
        rdev: 0,
        fsid: attr.fsid.dev,
        crtime: attr.create_time,
        atime: TimeSpec::ZERO,
        mtime: TimeSpec::ZERO,
        ctime: TimeSpec::ZERO,
    }
}
