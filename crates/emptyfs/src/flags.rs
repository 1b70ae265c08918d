//! 未知标志位检查
//!
//! 调用者传来的标志里出现驱动不认识的位时只是警告，不是错误。
//! 每个调用点只警告一次。

use core::sync::atomic::{AtomicBool, Ordering};

/// 检查 `flags` 是否只包含 `known` 中的位，每个调用点只打印一次警告
///
/// 返回未知的位（全部认识时为 0）。
macro_rules! warn_unknown_flags {
    ($flags:expr, $known:expr) => {{
        static PRINTED: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(false);
        $crate::flags::check_known_flags(
            ($flags) as u64,
            ($known) as u64,
            &PRINTED,
            file!(),
            line!(),
            stringify!($flags),
            stringify!($known),
        )
    }};
}

pub(crate) fn check_known_flags(
    flags: u64,
    known: u64,
    printed: &AtomicBool,
    file: &str,
    line: u32,
    flags_str: &str,
    known_str: &str,
) -> u64 {
    let unknown = flags & !known;
    if unknown != 0 && !printed.swap(true, Ordering::Relaxed) {
        log::warn!(
            "{}:{}: warn_unknown_flags({}, {}) saw unknown flags {:#x}",
            file,
            line,
            flags_str,
            known_str,
            unknown
        );
    }
    unknown
}
