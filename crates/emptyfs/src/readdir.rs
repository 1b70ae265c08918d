//! 根目录枚举
//!
//! 根目录固定只有两项："."（序号 0）和 ".."（序号 1），两者都指向根自身。
//! 对外的游标是 `序号 * CURSOR_STRIDE`，不是步长整数倍的游标一律非法。
//!
//! 游标可以被不受信任的程序随意设置（lseek），因此非法游标返回
//! [`FsError::InvalidArgument`]，不会断言失败。

use uapi::fs::{DT_DIR, Dirent};
use vfs::{FsError, ReadDirFlags, ReadDirResult, Uio};

use crate::attr::ROOT_FILEID;

/// 游标步长
pub const CURSOR_STRIDE: u64 = 7;

const ENTRY_COUNT: u64 = 2;

/// 只在缓冲区能放下整条记录时拷贝
fn uiomove_atomic(record: &[u8], uio: &mut Uio) -> Result<(), FsError> {
    if record.len() > uio.resid() {
        return Err(FsError::NoBuffers);
    }
    uio.uiomove(record);
    Ok(())
}

/// 从 `uio` 的游标开始把根目录的条目写入缓冲区
///
/// 放不下的记录既不拷贝也不前进，这不是错误：此时返回 0 条、游标不变。
/// 只有两条记录都实际写出后（序号越过 1）才报告到达末尾。
pub fn read_root_dir(uio: &mut Uio, flags: ReadDirFlags) -> Result<ReadDirResult, FsError> {
    // 扩展格式和 seek 偏移只有 NFS 导出才需要
    if flags.intersects(ReadDirFlags::EXTENDED | ReadDirFlags::REQSEEKOFF) {
        return Err(FsError::InvalidArgument);
    }

    let cursor = uio.offset();
    if cursor % CURSOR_STRIDE != 0 {
        return Err(FsError::InvalidArgument);
    }
    let mut index = cursor / CURSOR_STRIDE;
    if index > ENTRY_COUNT {
        return Err(FsError::InvalidArgument);
    }

    let mut item = Dirent::new(ROOT_FILEID, DT_DIR, ".").ok_or(FsError::InvalidArgument)?;
    let mut num_entries = 0;
    let mut status = Ok(());

    if index == 0 {
        status = uiomove_atomic(&item.to_bytes(), uio);
        if status.is_ok() {
            num_entries += 1;
            index += 1;
        }
    }
    if status.is_ok() && index == 1 {
        item.set_name("..");
        status = uiomove_atomic(&item.to_bytes(), uio);
        if status.is_ok() {
            num_entries += 1;
            index += 1;
        }
    }

    match status {
        Ok(()) | Err(FsError::NoBuffers) => {}
        Err(err) => return Err(err),
    }

    // uiomove 按字节推进了偏移，这里改回条目游标
    uio.set_offset(index * CURSOR_STRIDE);
    Ok(ReadDirResult {
        eof: index > 1,
        num_entries,
    })
}
