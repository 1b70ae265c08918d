//! 调用者输出缓冲区
//!
//! [`Uio`] 模拟一次读请求：`offset` 是不透明的游标，`resid` 是缓冲区剩余容量，
//! 写入的数据按顺序追加。

use alloc::vec::Vec;

/// 读请求描述
#[derive(Debug, Clone)]
pub struct Uio {
    offset: u64,
    resid: usize,
    data: Vec<u8>,
}

impl Uio {
    /// 创建容量为 `len` 字节、游标为 `offset` 的请求
    pub fn new(offset: u64, len: usize) -> Self {
        Self {
            offset,
            resid: len,
            data: Vec::with_capacity(len),
        }
    }

    /// 当前游标
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// 重设游标
    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// 剩余容量
    pub fn resid(&self) -> usize {
        self.resid
    }

    /// 已写入的数据
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 取出已写入的数据
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// 拷贝至多 `resid` 字节，游标随之前移，返回实际拷贝的字节数
    pub fn uiomove(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.resid);
        self.data.extend_from_slice(&src[..n]);
        self.resid -= n;
        self.offset += n as u64;
        n
    }
}
