//! 中断保护器
//!
//! 创建时禁用本地中断，销毁时恢复原状态。
//! 只能排除本地 CPU 上“任务 vs 中断”的并发，跨 CPU 的互斥仍需要自旋锁。

use crate::arch_ops;

/// 基于 RAII 的中断保护器
///
/// # 示例
/// ```ignore
/// {
///     let _guard = IntrGuard::new(); // 禁用中断
///     // 临界区代码
/// } // 恢复进入前的中断状态
/// ```
pub struct IntrGuard {
    flags: usize,
}

impl IntrGuard {
    /// 禁用中断并保存之前的状态
    pub fn new() -> Self {
        // SAFETY: 保存的 flags 只会在 Drop 中原样恢复，嵌套的保护器按相反顺序恢复
        let flags = unsafe { arch_ops().read_and_disable_interrupts() };
        IntrGuard { flags }
    }

    /// 进入临界区前中断是否处于启用状态
    pub fn was_enabled(&self) -> bool {
        self.flags & arch_ops().interrupt_enable_mask() != 0
    }
}

impl Default for IntrGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntrGuard {
    fn drop(&mut self) {
        // SAFETY: flags 来自 new() 中的 read_and_disable_interrupts
        unsafe { arch_ops().restore_interrupts(self.flags) };
    }
}
