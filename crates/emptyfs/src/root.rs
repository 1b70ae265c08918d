//! 根 vnode 槽
//!
//! 对象缓存由分发层统一管理，驱动只能跟随缓存的决定。驱动必须保证同一个对象
//! 不会对应两个 vnode，所以需要一个“哪些对象当前在内存中”的表。一般的驱动
//! 用以对象编号为键的哈希表，EmptyFS 只有根一个对象，表退化成卷上的一个槽。
//!
//! 槽里只保存 [`VnodeRef`]（标识 + 代号），不持有任何计数。每次取用时都在锁外
//! 用 [`VnodeCache::get_with_vid`] 重新确认，失败说明对象刚被回收，重新来过即可。
//!
//! 锁保护三个字段：
//!
//! - `vnode`: 当前根，可能为空
//! - `attaching`: 有线程正在锁外构造根
//! - `waiting`: 有线程在等待构造完成
//!
//! 不变式：`attaching ⇒ vnode 为空`，`waiting ⇒ attaching`。
//! 构造以及可能阻塞在其他锁上的缓存调用都不在持锁时进行。
//!
//! 构造成功但登记软引用失败的 vnode 仍然留在缓存里，之后会被回收。
//! 这些“孤儿”单独记下，它们的回收通知不影响槽里的根。
//!
//! 卸载前先 [`RootSlot::close`]：等正在进行的构造结束，之后的取用都返回
//! [`FsError::Stale`]。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hint;

use sync::{SpinCondvar, SpinLock};
use vfs::{FsError, Vnode, VnodeCache, VnodeRef};

#[derive(Debug, Default)]
struct SlotState {
    attaching: bool,
    waiting: bool,
    closed: bool,
    vnode: Option<VnodeRef>,
    orphans: Vec<VnodeRef>,
}

/// 槽状态的一次快照（调试用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RootSnapshot {
    /// 有线程正在构造
    pub attaching: bool,
    /// 有线程在等待构造完成
    pub waiting: bool,
    /// 当前记住的根
    pub vnode: Option<VnodeRef>,
    /// 已关闭，不再构造或交出根
    pub closed: bool,
    /// 登记软引用失败、尚未被回收的 vnode 数
    pub orphans: usize,
}

impl RootSnapshot {
    /// 没有构造在进行，也没有记住任何 vnode
    pub fn is_idle(&self) -> bool {
        !self.attaching && !self.waiting && self.vnode.is_none() && self.orphans == 0
    }
}

/// 根 vnode 槽
#[derive(Debug, Default)]
pub struct RootSlot {
    state: SpinLock<SlotState>,
    cond: SpinCondvar,
}

impl RootSlot {
    /// 创建空槽
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得根 vnode，不存在时用 `construct` 创建
    ///
    /// `construct` 在锁外调用，成功时返回的引用必须已带一个 iocount。
    /// 返回的 [`Vnode`] 持有一个属于调用者的 iocount。
    ///
    /// 构造失败只报告给本次构造的调用者；等待者被唤醒后重新判断，会自己再尝试构造。
    pub fn get_or_create<F>(&self, cache: &Arc<dyn VnodeCache>, mut construct: F) -> Result<Vnode, FsError>
    where
        F: FnMut() -> Result<VnodeRef, FsError>,
    {
        let mut state = self.state.lock();
        loop {
            debug_assert!(!state.attaching || state.vnode.is_none());
            debug_assert!(!state.waiting || state.attaching);

            if state.closed {
                return Err(FsError::Stale);
            }

            if state.attaching {
                // 别人正在构造，等它完成后从头再来
                state.waiting = true;
                state = self.cond.wait(state);
                continue;
            }

            let current = state.vnode;
            match current {
                None => {
                    state.attaching = true;
                    drop(state);

                    let created = construct();

                    let mut state = self.state.lock();
                    assert!(state.attaching, "root slot: attaching cleared during construction");
                    assert!(
                        state.vnode.is_none(),
                        "root slot: vnode installed during construction"
                    );

                    let outcome = match created {
                        Ok(vref) => {
                            let vn = Vnode::from_iocount(cache.clone(), vref);
                            match cache.add_fs_ref(vref) {
                                Ok(()) => {
                                    state.vnode = Some(vref);
                                    Ok(vn)
                                }
                                Err(err) => {
                                    state.orphans.push(vref);
                                    Err((err, Some(vn)))
                                }
                            }
                        }
                        Err(err) => Err((err, None)),
                    };

                    state.attaching = false;
                    if state.waiting {
                        state.waiting = false;
                        self.cond.notify_all();
                    }
                    drop(state);

                    return match outcome {
                        Ok(vn) => Ok(vn),
                        Err((err, orphan)) => {
                            // 放到锁外归还 iocount
                            drop(orphan);
                            Err(err)
                        }
                    };
                }
                Some(candidate) => {
                    drop(state);
                    if cache.get_with_vid(candidate).is_ok() {
                        // 确认成功后不再回到锁内：iocount 已经保证它不会被回收
                        return Ok(Vnode::from_iocount(cache.clone(), candidate));
                    }
                    // 在放锁和确认之间被回收了，重新来过
                    hint::spin_loop();
                    state = self.state.lock();
                }
            }
        }
    }

    /// 缓存回收 `vn` 时忘记它，并撤销软引用
    ///
    /// 槽为空时是迟到或重复的通知，什么也不做。构造进行中槽必然为空，所以也是空操作。
    /// 孤儿的回收只把它从孤儿表中去掉，它从未登记过软引用。
    ///
    /// # Panics
    ///
    /// `vn` 既不是孤儿也不是槽中记住的根时 panic。
    pub fn detach(&self, cache: &dyn VnodeCache, vn: VnodeRef) {
        let mut state = self.state.lock();
        assert!(!state.attaching || state.vnode.is_none());

        if let Some(pos) = state.orphans.iter().position(|&o| o == vn) {
            state.orphans.swap_remove(pos);
            return;
        }

        let Some(current) = state.vnode else {
            return;
        };
        assert_eq!(current, vn, "root slot: reclaim of {vn} but the root is {current}");

        if let Err(err) = cache.remove_fs_ref(current) {
            log::error!("root slot: remove_fs_ref({}) failed: {}", current, err);
        }
        state.vnode = None;
    }

    /// 关闭槽：等待正在进行的构造结束，此后 [`RootSlot::get_or_create`] 返回
    /// [`FsError::Stale`]
    ///
    /// 已经记住的根留在槽里，由缓存回收时照常 detach。
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        while state.attaching {
            state.waiting = true;
            state = self.cond.wait(state);
        }
    }

    /// 重新开放槽（卸载失败时）
    pub fn reopen(&self) {
        self.state.lock().closed = false;
    }

    /// `vn` 是否是当前记住的根
    pub fn contains(&self, vn: VnodeRef) -> bool {
        self.state.lock().vnode == Some(vn)
    }

    /// 当前状态
    pub fn snapshot(&self) -> RootSnapshot {
        let state = self.state.lock();
        RootSnapshot {
            attaching: state.attaching,
            waiting: state.waiting,
            vnode: state.vnode,
            closed: state.closed,
            orphans: state.orphans.len(),
        }
    }
}
