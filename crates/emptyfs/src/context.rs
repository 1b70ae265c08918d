//! 驱动上下文
//!
//! 驱动加载时由宿主显式构造 [`EmptyFs`]，把对象缓存和运行时服务交给它，
//! 之后每次挂载都经由它进行。上下文记录已挂载卷的数量，有卷时拒绝卸载驱动。

use alloc::sync::Arc;

use sync::SpinLock;
use vfs::{FileSystem, FileSystemType, FsError, FsTypeFlags, MountRequest, VfsOps, VnodeCache};

use crate::mount::EmptyFsMount;

/// 文件系统类型名
pub const EMPTYFS_NAME: &str = "EmptyFS";

#[derive(Debug)]
struct LoadState {
    loaded: bool,
    mounted: usize,
}

/// 各个卷共享的驱动状态
pub(crate) struct Shared {
    pub(crate) cache: Arc<dyn VnodeCache>,
    pub(crate) ops: Arc<dyn VfsOps>,
    pub(crate) type_num: u32,
    state: SpinLock<LoadState>,
}

impl Shared {
    /// 为一个新卷登记，驱动已卸载时失败
    pub(crate) fn register_mount(&self) -> Result<(), FsError> {
        let mut state = self.state.lock();
        if !state.loaded {
            return Err(FsError::NotSupported);
        }
        state.mounted += 1;
        Ok(())
    }

    pub(crate) fn unregister_mount(&self) {
        let mut state = self.state.lock();
        assert!(state.mounted > 0, "EmptyFS: unmount without a matching mount");
        state.mounted -= 1;
    }
}

/// EmptyFS 驱动上下文
#[derive(Clone)]
pub struct EmptyFs {
    shared: Arc<Shared>,
}

impl EmptyFs {
    /// 加载驱动
    ///
    /// - `cache`: 分发层的对象缓存
    /// - `ops`: 运行时服务（时间）
    /// - `type_num`: 分发层分配的文件系统类型号
    pub fn load(cache: Arc<dyn VnodeCache>, ops: Arc<dyn VfsOps>, type_num: u32) -> Self {
        log::info!("{}: loaded, type number {}", EMPTYFS_NAME, type_num);
        Self {
            shared: Arc::new(Shared {
                cache,
                ops,
                type_num,
                state: SpinLock::new(LoadState {
                    loaded: true,
                    mounted: 0,
                }),
            }),
        }
    }

    /// 卸载驱动，仍有卷挂载时返回 [`FsError::Busy`]
    pub fn unload(&self) -> Result<(), FsError> {
        let mut state = self.shared.state.lock();
        if state.mounted > 0 {
            log::warn!(
                "{}: unload refused, {} volume(s) still mounted",
                EMPTYFS_NAME,
                state.mounted
            );
            return Err(FsError::Busy);
        }
        state.loaded = false;
        drop(state);
        log::info!("{}: unloaded", EMPTYFS_NAME);
        Ok(())
    }

    /// 驱动是否处于加载状态
    pub fn is_loaded(&self) -> bool {
        self.shared.state.lock().loaded
    }

    /// 已挂载的卷数
    pub fn mounted_count(&self) -> usize {
        self.shared.state.lock().mounted
    }

    /// 挂载一个卷，返回具体类型
    ///
    /// 成功、失败都会打印一行结果。失败时已经获取的资源全部释放，不留下任何可达的状态。
    pub fn mount_volume(&self, req: &MountRequest<'_>) -> Result<Arc<EmptyFsMount>, FsError> {
        let result = EmptyFsMount::mount(self.shared.clone(), req);
        if let Err(err) = &result {
            log::warn!(
                "{}: mount failed with error {}",
                EMPTYFS_NAME,
                err.to_errno()
            );
        }
        result
    }
}

impl FileSystemType for EmptyFs {
    fn name(&self) -> &'static str {
        EMPTYFS_NAME
    }

    fn flags(&self) -> FsTypeFlags {
        FsTypeFlags::THREADSAFE
            | FsTypeFlags::FSNODELOCK
            | FsTypeFlags::NOTYPENUM
            | FsTypeFlags::LOCALVOL
            | FsTypeFlags::READY_64BIT
    }

    fn mount(&self, req: MountRequest<'_>) -> Result<Arc<dyn FileSystem>, FsError> {
        let mount: Arc<dyn FileSystem> = self.mount_volume(&req)?;
        Ok(mount)
    }
}
