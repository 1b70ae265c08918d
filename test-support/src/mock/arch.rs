//! 架构相关操作的 Mock 实现

use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use sync::ArchOps;

const SIE: usize = 0x2;

/// Mock 架构操作
///
/// 宿主机上没有真正的中断，这里只记录一个“中断使能”位。
pub struct MockArchOps {
    interrupt_state: AtomicBool,
}

impl MockArchOps {
    /// 创建实例，初始为中断使能
    pub const fn new() -> Self {
        Self {
            interrupt_state: AtomicBool::new(true),
        }
    }
}

impl Default for MockArchOps {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchOps for MockArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        if self.interrupt_state.swap(false, Ordering::SeqCst) {
            SIE
        } else {
            0
        }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        self.interrupt_state
            .store(flags & SIE != 0, Ordering::SeqCst);
    }

    fn interrupt_enable_mask(&self) -> usize {
        SIE
    }
}

/// 全局 Mock 实例
pub static MOCK_ARCH_OPS: MockArchOps = MockArchOps::new();

/// 注册 Mock 架构操作（可重复调用，只注册一次）
pub fn install() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        // SAFETY: Once 保证只注册一次，且发生在任何锁被使用之前
        unsafe { sync::register_arch_ops(&MOCK_ARCH_OPS) };
    });
    debug_assert!(sync::arch_ops_registered());
}
