//! 活跃对象缓存 Mock
//!
//! 模拟分发层的 vnode 缓存：标识 + 代号、iocount / usecount、软引用、
//! 驱逐与刷新。驱逐时先把对象标记为回收中，释放内部锁后再调用驱动的
//! `reclaim`，最后删除条目，与真实缓存的顺序一致。
//!
//! 另外提供故障注入和一个“创建闸门”，用来把构造过程卡在锁外，
//! 测试等待者和回收通知的交错。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use vfs::{
    FlushFlags, FsError, InodeType, MountId, VnodeCache, VnodeCreateFlags, VnodeId, VnodeOps,
    VnodeParams, VnodeRef,
};

/// 一次 `create` 调用看到的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecord {
    /// 所属卷
    pub mount: MountId,
    /// 类型
    pub vtype: InodeType,
    /// 是否标记为根
    pub is_root: bool,
    /// 是否标记为系统 vnode
    pub is_system: bool,
    /// 设备号
    pub rdev: u64,
    /// 文件大小
    pub file_size: u64,
    /// 创建标志
    pub flags: VnodeCreateFlags,
}

struct Entry {
    vid: u32,
    mount: Option<MountId>,
    vtype: InodeType,
    rdev: u64,
    ops: Option<Arc<dyn VnodeOps>>,
    iocount: usize,
    usecount: usize,
    fsref: bool,
    reclaiming: bool,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: HashMap<VnodeId, Entry>,
    create_calls: usize,
    get_with_vid_calls: usize,
    creates: Vec<CreateRecord>,
    fail_create: VecDeque<FsError>,
    fail_add_fs_ref: VecDeque<FsError>,
    stale_get_with_vid: usize,
    create_delay: Option<Duration>,
}

#[derive(Default)]
struct Gate {
    closed: bool,
    entered: usize,
}

/// 内存中的 vnode 缓存
#[derive(Default)]
pub struct MockVnodeCache {
    inner: Mutex<Inner>,
    gate: Mutex<Gate>,
    gate_cond: Condvar,
}

impl MockVnodeCache {
    /// 创建空缓存
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn alloc_id(inner: &mut Inner) -> VnodeId {
        inner.next_id += 1;
        VnodeId(inner.next_id)
    }

    /// 注册一个块设备 vnode，返回它的引用（不持有任何计数）
    pub fn add_block_device(&self, rdev: u64) -> VnodeRef {
        let mut inner = self.lock();
        let id = Self::alloc_id(&mut inner);
        inner.entries.insert(
            id,
            Entry {
                vid: 1,
                mount: None,
                vtype: InodeType::BlockDevice,
                rdev,
                ops: None,
                iocount: 0,
                usecount: 0,
                fsref: false,
                reclaiming: false,
            },
        );
        VnodeRef::new(id, 1)
    }

    // ---- 故障注入 ----

    /// 下一次 `create` 返回 `err`（可排队多次）
    pub fn fail_next_create(&self, err: FsError) {
        self.lock().fail_create.push_back(err);
    }

    /// 下一次 `add_fs_ref` 返回 `err`
    pub fn fail_next_add_fs_ref(&self, err: FsError) {
        self.lock().fail_add_fs_ref.push_back(err);
    }

    /// 接下来 `n` 次 `get_with_vid` 返回 [`FsError::Stale`]
    pub fn stale_next_get_with_vid(&self, n: usize) {
        self.lock().stale_get_with_vid += n;
    }

    /// 每次 `create` 在返回前睡眠 `delay`，用于放大竞争窗口
    pub fn set_create_delay(&self, delay: Option<Duration>) {
        self.lock().create_delay = delay;
    }

    // ---- 创建闸门 ----

    /// 关闭闸门：之后进入 `create` 的线程会停在闸门前
    pub fn pause_create(&self) {
        self.gate.lock().unwrap().closed = true;
    }

    /// 打开闸门并放行所有停住的线程
    pub fn resume_create(&self) {
        self.gate.lock().unwrap().closed = false;
        self.gate_cond.notify_all();
    }

    /// 已经进入 `create` 的调用次数（包括停在闸门前的）
    pub fn create_entered(&self) -> usize {
        self.gate.lock().unwrap().entered
    }

    /// 等待直到至少 `n` 个线程进入了 `create`
    pub fn wait_create_entered(&self, n: usize) {
        let mut gate = self.gate.lock().unwrap();
        while gate.entered < n {
            gate = self
                .gate_cond
                .wait_timeout(gate, Duration::from_millis(5))
                .unwrap()
                .0;
        }
    }

    fn pass_gate(&self) {
        let mut gate = self.gate.lock().unwrap();
        gate.entered += 1;
        self.gate_cond.notify_all();
        while gate.closed {
            gate = self.gate_cond.wait(gate).unwrap();
        }
    }

    // ---- 驱逐 ----

    /// 像缓存压力那样驱逐一个未被使用的 vnode
    ///
    /// 仍有 iocount 或 usecount 时返回 [`FsError::Busy`]。
    pub fn evict(&self, vn: VnodeRef) -> Result<(), FsError> {
        let ops = {
            let mut inner = self.lock();
            let entry = Self::live_entry(&mut inner, vn)?;
            if entry.iocount > 0 || entry.usecount > 0 {
                return Err(FsError::Busy);
            }
            entry.reclaiming = true;
            entry.ops.clone()
        };
        self.finish_reclaim(vn, ops)
    }

    fn finish_reclaim(&self, vn: VnodeRef, ops: Option<Arc<dyn VnodeOps>>) -> Result<(), FsError> {
        let result = match ops {
            Some(ops) => ops.reclaim(vn),
            None => Ok(()),
        };
        self.lock().entries.remove(&vn.id());
        result
    }

    fn live_entry(inner: &mut Inner, vn: VnodeRef) -> Result<&mut Entry, FsError> {
        match inner.entries.get_mut(&vn.id()) {
            Some(e) if e.vid == vn.vid() && !e.reclaiming => Ok(e),
            _ => Err(FsError::Stale),
        }
    }

    // ---- 观察 ----

    /// `create` 被调用的总次数（包括失败的）
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    /// `get_with_vid` 被调用的总次数
    pub fn get_with_vid_calls(&self) -> usize {
        self.lock().get_with_vid_calls
    }

    /// 每次成功创建的参数
    pub fn creates(&self) -> Vec<CreateRecord> {
        self.lock().creates.clone()
    }

    /// vnode 是否仍然存活
    pub fn is_live(&self, vn: VnodeRef) -> bool {
        Self::live_entry(&mut self.lock(), vn).is_ok()
    }

    /// 当前 iocount，已回收时为 `None`
    pub fn iocount(&self, vn: VnodeRef) -> Option<usize> {
        Self::live_entry(&mut self.lock(), vn).ok().map(|e| e.iocount)
    }

    /// 当前 usecount，已回收时为 `None`
    pub fn usecount(&self, vn: VnodeRef) -> Option<usize> {
        Self::live_entry(&mut self.lock(), vn).ok().map(|e| e.usecount)
    }

    /// 驱动是否登记了软引用
    pub fn has_fs_ref(&self, vn: VnodeRef) -> bool {
        Self::live_entry(&mut self.lock(), vn).is_ok_and(|e| e.fsref)
    }

    /// 卷上存活的 vnode 数
    pub fn live_count(&self, mount: MountId) -> usize {
        self.lock()
            .entries
            .values()
            .filter(|e| e.mount == Some(mount))
            .count()
    }
}

impl VnodeCache for MockVnodeCache {
    fn create(&self, params: VnodeParams) -> Result<VnodeRef, FsError> {
        self.pass_gate();

        let delay = {
            let mut inner = self.lock();
            inner.create_calls += 1;
            if let Some(err) = inner.fail_create.pop_front() {
                return Err(err);
            }
            inner.create_delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let mut inner = self.lock();
        let id = Self::alloc_id(&mut inner);
        inner.creates.push(CreateRecord {
            mount: params.mount,
            vtype: params.vtype,
            is_root: params.is_root,
            is_system: params.is_system,
            rdev: params.rdev,
            file_size: params.file_size,
            flags: params.flags,
        });
        inner.entries.insert(
            id,
            Entry {
                vid: 1,
                mount: Some(params.mount),
                vtype: params.vtype,
                rdev: params.rdev,
                ops: Some(params.ops),
                iocount: 1,
                usecount: 0,
                fsref: false,
                reclaiming: false,
            },
        );
        Ok(VnodeRef::new(id, 1))
    }

    fn get(&self, vn: VnodeRef) -> Result<(), FsError> {
        Self::live_entry(&mut self.lock(), vn)?.iocount += 1;
        Ok(())
    }

    fn get_with_vid(&self, vn: VnodeRef) -> Result<(), FsError> {
        let mut inner = self.lock();
        inner.get_with_vid_calls += 1;
        if inner.stale_get_with_vid > 0 {
            inner.stale_get_with_vid -= 1;
            return Err(FsError::Stale);
        }
        Self::live_entry(&mut inner, vn)?.iocount += 1;
        Ok(())
    }

    fn put(&self, vn: VnodeRef) {
        let mut inner = self.lock();
        // 强制回收后仍在外面的句柄归还时，条目已经不在了
        match inner.entries.get_mut(&vn.id()) {
            Some(e) if e.vid == vn.vid() => {
                assert!(e.iocount > 0, "put on {vn} without iocount");
                e.iocount -= 1;
            }
            _ => {}
        }
    }

    fn add_fs_ref(&self, vn: VnodeRef) -> Result<(), FsError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_add_fs_ref.pop_front() {
            return Err(err);
        }
        let entry = Self::live_entry(&mut inner, vn)?;
        if entry.fsref {
            return Err(FsError::InvalidArgument);
        }
        entry.fsref = true;
        Ok(())
    }

    fn remove_fs_ref(&self, vn: VnodeRef) -> Result<(), FsError> {
        let mut inner = self.lock();
        // reclaim 回调期间条目处于回收中，仍然允许撤销软引用
        let entry = match inner.entries.get_mut(&vn.id()) {
            Some(e) if e.vid == vn.vid() => e,
            _ => return Err(FsError::Stale),
        };
        if !entry.fsref {
            return Err(FsError::InvalidArgument);
        }
        entry.fsref = false;
        Ok(())
    }

    fn use_ref(&self, vn: VnodeRef) -> Result<(), FsError> {
        Self::live_entry(&mut self.lock(), vn)?.usecount += 1;
        Ok(())
    }

    fn use_rele(&self, vn: VnodeRef) {
        if let Ok(e) = Self::live_entry(&mut self.lock(), vn) {
            assert!(e.usecount > 0, "use_rele on {vn} without usecount");
            e.usecount -= 1;
        }
    }

    fn vtype(&self, vn: VnodeRef) -> Result<InodeType, FsError> {
        Ok(Self::live_entry(&mut self.lock(), vn)?.vtype)
    }

    fn spec_rdev(&self, vn: VnodeRef) -> Result<u64, FsError> {
        let mut inner = self.lock();
        let entry = Self::live_entry(&mut inner, vn)?;
        match entry.vtype {
            InodeType::BlockDevice | InodeType::CharDevice => Ok(entry.rdev),
            _ => Err(FsError::InvalidArgument),
        }
    }

    fn flush(&self, mount: MountId, flags: FlushFlags) -> Result<(), FsError> {
        let force = flags.contains(FlushFlags::FORCECLOSE);
        let (victims, busy) = {
            let mut inner = self.lock();
            let mut victims = Vec::new();
            let mut busy = false;
            for (id, e) in inner.entries.iter_mut() {
                if e.mount != Some(mount) || e.reclaiming {
                    continue;
                }
                if (e.iocount > 0 || e.usecount > 0) && !force {
                    busy = true;
                    continue;
                }
                e.reclaiming = true;
                victims.push((VnodeRef::new(*id, e.vid), e.ops.clone()));
            }
            (victims, busy)
        };

        // 每个已标记的对象都要回收完，返回第一个错误
        let mut first_err = None;
        for (vn, ops) in victims {
            if let Err(err) = self.finish_reclaim(vn, ops) {
                first_err.get_or_insert(err);
            }
        }
        if let Some(err) = first_err {
            return Err(err);
        }
        if busy { Err(FsError::Busy) } else { Ok(()) }
    }
}
