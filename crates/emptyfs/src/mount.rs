//! 已挂载的 EmptyFS 卷
//!
//! 除根槽外，卷上的字段在挂载时一次设置好，之后不再改变，不需要加锁。
//! 设备引用是例外：卸载时释放并清空，用一把小锁保护。

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicBool, Ordering};

use sync::SpinLock;
use uapi::mount::EmptyFsMountArgs;
use vfs::{
    FileSystem, FlushFlags, FsError, InodeType, MountFlags, MountId, MountRequest, StatFs,
    UnmountFlags, VfsAttr, Vnode, VnodeCache, VnodeCreateFlags, VnodeOps, VnodeParams, VnodeRef,
};

use crate::attr;
use crate::context::{EMPTYFS_NAME, Shared};
use crate::root::{RootSlot, RootSnapshot};

/// 挂载后卷上固定设置的标志
pub const EMPTYFS_MOUNT_FLAGS: MountFlags = MountFlags::RDONLY
    .union(MountFlags::NOEXEC)
    .union(MountFlags::NOSUID)
    .union(MountFlags::NODEV)
    .union(MountFlags::IGNORE_OWNERSHIP);

/// 一个已挂载的卷
///
/// 同时实现 [`FileSystem`]（卷操作）和 [`VnodeOps`]（根 vnode 的操作表）。
pub struct EmptyFsMount {
    me: Weak<EmptyFsMount>,
    shared: Arc<Shared>,
    mount_id: MountId,
    flags: MountFlags,
    pub(crate) debug_level: u32,
    rdev: u64,
    volume_name: String,
    pub(crate) attr: VfsAttr,
    device: SpinLock<Option<VnodeRef>>,
    pub(crate) root: RootSlot,
    unmounted: AtomicBool,
}

impl EmptyFsMount {
    pub(crate) fn mount(shared: Arc<Shared>, req: &MountRequest<'_>) -> Result<Arc<Self>, FsError> {
        if req.flags.contains(MountFlags::UPDATE) {
            return Err(FsError::NotSupported);
        }

        let args = EmptyFsMountArgs::from_bytes(req.data).map_err(|err| {
            log::warn!("{}: bad mount arguments: {:?}", EMPTYFS_NAME, err);
            FsError::InvalidArgument
        })?;

        // 对设备持有 usecount，直到卸载
        let cache = shared.cache.clone();
        cache.use_ref(req.device)?;
        let rdev = match cache.spec_rdev(req.device) {
            Ok(rdev) => rdev,
            Err(err) => {
                cache.use_rele(req.device);
                return Err(err);
            }
        };
        if let Err(err) = shared.register_mount() {
            cache.use_rele(req.device);
            return Err(err);
        }

        let vfs_attr = attr::build_vfs_attr(rdev, shared.type_num, shared.ops.timespec_now());
        let mount = Arc::new_cyclic(|me| Self {
            me: me.clone(),
            mount_id: req.mount,
            flags: req.flags | EMPTYFS_MOUNT_FLAGS | MountFlags::LOCAL,
            debug_level: args.debug_level,
            rdev,
            volume_name: String::from(attr::VOLUME_NAME),
            attr: vfs_attr,
            device: SpinLock::new(Some(req.device)),
            root: RootSlot::new(),
            unmounted: AtomicBool::new(false),
            shared,
        });
        debug_assert!(mount.root.snapshot().is_idle());

        if args.force_failure {
            log::warn!("{}: mount succeeded, force failure", EMPTYFS_NAME);
            if let Err(err) = mount.unmount(UnmountFlags::FORCE) {
                log::error!("{}: cleanup unmount failed: {}", EMPTYFS_NAME, err);
            }
            return Err(FsError::NotSupported);
        }

        log::info!(
            "{}: mount succeeded on {} (rdev {:#x})",
            EMPTYFS_NAME,
            args.device_path(),
            rdev
        );
        Ok(mount)
    }

    /// 卷标识
    pub fn id(&self) -> MountId {
        self.mount_id
    }

    /// 卷所在设备号（卸载后为 0）
    pub fn rdev(&self) -> u64 {
        if self.device.lock().is_some() {
            self.rdev
        } else {
            0
        }
    }

    /// 卷名
    pub fn volume_name(&self) -> &str {
        &self.volume_name
    }

    /// 挂载参数中的调试级别
    pub fn debug_level(&self) -> u32 {
        self.debug_level
    }

    /// 根槽状态（调试用）
    pub fn root_snapshot(&self) -> RootSnapshot {
        self.root.snapshot()
    }

    /// 是否已经卸载
    pub fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::Acquire)
    }

    /// 取得根 vnode，必要时创建
    ///
    /// 返回的 [`Vnode`] 持有一个 iocount，由调用者归还（drop）或转交给它的调用者。
    pub fn root_vnode(&self) -> Result<Vnode, FsError> {
        if self.is_unmounted() {
            return Err(FsError::Stale);
        }
        self.root.get_or_create(&self.shared.cache, || {
            if self.debug_level > 0 {
                log::debug!("{}: creating root vnode for {:?}", EMPTYFS_NAME, self.mount_id);
            }
            let ops: Arc<dyn VnodeOps> = self.me.upgrade().ok_or(FsError::Stale)?;
            self.shared.cache.create(VnodeParams {
                mount: self.mount_id,
                vtype: InodeType::Directory,
                ops,
                is_root: true,
                is_system: false,
                rdev: 0,
                file_size: 0,
                flags: VnodeCreateFlags::NOCACHE | VnodeCreateFlags::CANTCACHE,
            })
        })
    }

    /// 在本卷上有效的 vnode 只有根
    pub(crate) fn is_valid_vnode(&self, vn: VnodeRef) -> bool {
        self.root.contains(vn)
    }

    pub(crate) fn shared_cache(&self) -> &dyn VnodeCache {
        &*self.shared.cache
    }
}

impl FileSystem for EmptyFsMount {
    fn fs_type(&self) -> &'static str {
        EMPTYFS_NAME
    }

    fn mount_id(&self) -> MountId {
        self.mount_id
    }

    fn mount_flags(&self) -> MountFlags {
        self.flags
    }

    fn start(&self, flags: u32) -> Result<(), FsError> {
        warn_unknown_flags!(flags, 0u32);
        Ok(())
    }

    fn root(&self) -> Result<Vnode, FsError> {
        self.root_vnode()
    }

    fn getattr(&self) -> Result<VfsAttr, FsError> {
        Ok(self.attr.clone())
    }

    fn statfs(&self) -> Result<StatFs, FsError> {
        Ok(attr::statfs_from(&self.attr))
    }

    /// 卸载
    ///
    /// 先关闭根槽（等待进行中的构造结束），再让缓存回收本卷的所有 vnode
    /// （根槽因此被清空），最后释放设备引用。回收失败时重新开放根槽。
    /// 重复调用是安全的：设备引用和已挂载计数都只释放一次。
    fn unmount(&self, flags: UnmountFlags) -> Result<(), FsError> {
        warn_unknown_flags!(flags.bits(), UnmountFlags::FORCE.bits());

        self.root.close();

        let flush = if flags.contains(UnmountFlags::FORCE) {
            FlushFlags::FORCECLOSE
        } else {
            FlushFlags::empty()
        };
        if let Err(err) = self.shared.cache.flush(self.mount_id, flush) {
            if !self.is_unmounted() {
                self.root.reopen();
            }
            return Err(err);
        }

        if self.unmounted.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let device = self.device.lock().take();
        if let Some(device) = device {
            self.shared.cache.use_rele(device);
        }
        self.shared.unregister_mount();

        let root = self.root.snapshot();
        assert!(
            !root.attaching && root.vnode.is_none() && root.orphans == 0,
            "{}: unmount with live root slot {:?}",
            EMPTYFS_NAME,
            root
        );

        log::info!("{}: unmounted {:?}", EMPTYFS_NAME, self.mount_id);
        Ok(())
    }
}

impl core::fmt::Debug for EmptyFsMount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EmptyFsMount")
            .field("mount_id", &self.mount_id)
            .field("flags", &self.flags)
            .field("volume_name", &self.volume_name)
            .finish_non_exhaustive()
    }
}

impl Drop for EmptyFsMount {
    fn drop(&mut self) {
        if !self.is_unmounted() {
            log::warn!("{}: {:?} dropped while still mounted", EMPTYFS_NAME, self.mount_id);
        }
    }
}
