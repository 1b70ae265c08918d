//! 根 vnode 的操作表
//!
//! 卷上只有一个 vnode，所有操作都以它为对象。未列出的操作由分发层以
//! [`FsError::NotSupported`] 拒绝。

use vfs::{
    ComponentName, FsError, InodeMetadata, OpenMode, ReadDirFlags, ReadDirResult, Uio, Vnode,
    VnodeOps, VnodeRef,
};

use crate::attr;
use crate::context::EMPTYFS_NAME;
use crate::mount::EmptyFsMount;
use crate::readdir;

impl VnodeOps for EmptyFsMount {
    /// 只有 "." 和 ".." 能解析，都指向目录自身
    ///
    /// 根的父目录还是根，所以两者的实现相同：在 `dvp` 上再取一个 iocount 返回。
    fn lookup(&self, dvp: &Vnode, cn: &ComponentName<'_>) -> Result<Vnode, FsError> {
        debug_assert!(dvp.is_dir());
        debug_assert!(self.is_valid_vnode(dvp.vref()));

        if self.debug_level > 0 {
            log::debug!("{}: lookup {:?} in {}", EMPTYFS_NAME, cn.name(), dvp.vref());
        }

        if cn.is_dotdot() || cn.name() == "." {
            dvp.try_clone()
        } else {
            Err(FsError::NotFound)
        }
    }

    fn open(&self, vp: &Vnode, mode: OpenMode) -> Result<(), FsError> {
        debug_assert!(self.is_valid_vnode(vp.vref()));
        warn_unknown_flags!(mode.bits(), OpenMode::all().bits());
        debug_assert!(vp.is_dir());
        Ok(())
    }

    fn close(&self, vp: &Vnode, fflag: OpenMode) -> Result<(), FsError> {
        debug_assert!(self.is_valid_vnode(vp.vref()));
        warn_unknown_flags!(fflag.bits(), OpenMode::all().bits());
        debug_assert!(vp.is_dir());
        Ok(())
    }

    fn getattr(&self, vp: &Vnode) -> Result<InodeMetadata, FsError> {
        debug_assert!(self.is_valid_vnode(vp.vref()));
        debug_assert!(vp.is_dir());
        Ok(attr::root_metadata(&self.attr))
    }

    fn readdir(
        &self,
        vp: &Vnode,
        uio: &mut Uio,
        flags: ReadDirFlags,
    ) -> Result<ReadDirResult, FsError> {
        debug_assert!(self.is_valid_vnode(vp.vref()));
        warn_unknown_flags!(flags.bits(), ReadDirFlags::all().bits());
        debug_assert!(vp.is_dir());

        let result = readdir::read_root_dir(uio, flags);
        if self.debug_level > 0 {
            log::debug!(
                "{}: readdir {} -> {:?}, cursor {}",
                EMPTYFS_NAME,
                vp.vref(),
                result,
                uio.offset()
            );
        }
        result
    }

    /// 缓存回收根 vnode：从根槽中忘记它
    fn reclaim(&self, vn: VnodeRef) -> Result<(), FsError> {
        if self.debug_level > 0 {
            log::debug!("{}: reclaim {}", EMPTYFS_NAME, vn);
        }
        self.root.detach(self.shared_cache(), vn);
        Ok(())
    }
}
