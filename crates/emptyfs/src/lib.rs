//! # EmptyFS
//!
//! 一个最小的文件系统驱动：每个卷只有一个永久存在的根目录，目录里只有 "." 和 ".."。
//!
//! 驱动本身几乎没有状态，它的价值在于完整地演示了驱动与分发层对象缓存协作的协议：
//!
//! - **根对象协议**（[`root`]）：根 vnode 按需创建，驱动只记住“标识 + 代号”，
//!   每次使用前都向缓存重新确认；同一时刻至多一个线程在构造，其他线程等待。
//! - **目录游标协议**（[`readdir`]）：不透明游标 = 条目序号 × 7，记录放不下时既不拷贝也不前进。
//! - **卷生命周期**（[`EmptyFs`] / [`EmptyFsMount`]）：挂载、启动、根、属性、卸载。
//!
//! 模块级状态由显式构造的 [`EmptyFs`] 上下文持有，挂载时传入，没有全局变量。

#![no_std]

extern crate alloc;

#[macro_use]
mod flags;

pub mod attr;
pub mod readdir;
pub mod root;

mod context;
mod mount;
mod vnops;

pub use context::{EMPTYFS_NAME, EmptyFs};
pub use mount::{EMPTYFS_MOUNT_FLAGS, EmptyFsMount};
pub use readdir::CURSOR_STRIDE;
pub use root::{RootSlot, RootSnapshot};
