//! 目录项记录
//!
//! readdir 向调用者缓冲区写出的是定长记录。布局（小端）：
//!
//! | 偏移 | 长度 | 字段 |
//! |------|------|------|
//! | 0    | 8    | `d_fileno` |
//! | 8    | 2    | `d_reclen` |
//! | 10   | 2    | `d_namlen` |
//! | 12   | 1    | `d_type` |
//! | 13   | 256  | `d_name`（NUL 结尾） |
//! | 269  | 3    | 填充 |

/// 名字字段容量（含结尾 NUL）
pub const DIRENT_NAME_MAX: usize = 256;

/// 单条目录项记录的字节数
pub const DIRENT_RECLEN: usize = 272;

const NAME_OFFSET: usize = 13;

/// 未知类型
pub const DT_UNKNOWN: u8 = 0;
/// 命名管道
pub const DT_FIFO: u8 = 1;
/// 字符设备
pub const DT_CHR: u8 = 2;
/// 目录
pub const DT_DIR: u8 = 4;
/// 块设备
pub const DT_BLK: u8 = 6;
/// 普通文件
pub const DT_REG: u8 = 8;
/// 符号链接
pub const DT_LNK: u8 = 10;
/// 套接字
pub const DT_SOCK: u8 = 12;

/// 定长目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirent {
    /// 对象编号
    pub d_fileno: u64,
    /// 记录长度，恒为 [`DIRENT_RECLEN`]
    pub d_reclen: u16,
    /// 条目类型（`DT_*`）
    pub d_type: u8,
    d_namlen: u16,
    d_name: [u8; DIRENT_NAME_MAX],
}

impl Dirent {
    /// 构造目录项，名字过长（留不下结尾 NUL）时返回 `None`
    pub fn new(d_fileno: u64, d_type: u8, name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() >= DIRENT_NAME_MAX {
            return None;
        }
        let mut d_name = [0u8; DIRENT_NAME_MAX];
        d_name[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            d_fileno,
            d_reclen: DIRENT_RECLEN as u16,
            d_type,
            d_namlen: bytes.len() as u16,
            d_name,
        })
    }

    /// 替换名字，语义同 [`Dirent::new`]
    pub fn set_name(&mut self, name: &str) -> bool {
        let bytes = name.as_bytes();
        if bytes.len() >= DIRENT_NAME_MAX {
            return false;
        }
        self.d_name = [0u8; DIRENT_NAME_MAX];
        self.d_name[..bytes.len()].copy_from_slice(bytes);
        self.d_namlen = bytes.len() as u16;
        true
    }

    /// 名字长度
    pub fn namlen(&self) -> u16 {
        self.d_namlen
    }

    /// 名字字节（不含 NUL）
    pub fn name_bytes(&self) -> &[u8] {
        &self.d_name[..self.d_namlen as usize]
    }

    /// 名字字符串
    pub fn name(&self) -> Option<&str> {
        core::str::from_utf8(self.name_bytes()).ok()
    }

    /// 序列化为定长记录
    pub fn to_bytes(&self) -> [u8; DIRENT_RECLEN] {
        let mut out = [0u8; DIRENT_RECLEN];
        out[0..8].copy_from_slice(&self.d_fileno.to_le_bytes());
        out[8..10].copy_from_slice(&self.d_reclen.to_le_bytes());
        out[10..12].copy_from_slice(&self.d_namlen.to_le_bytes());
        out[12] = self.d_type;
        out[NAME_OFFSET..NAME_OFFSET + DIRENT_NAME_MAX].copy_from_slice(&self.d_name);
        out
    }

    /// 从缓冲区头部解析一条记录
    ///
    /// 长度不足、`d_reclen` 不符或名字长度越界时返回 `None`。
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < DIRENT_RECLEN {
            return None;
        }
        let d_fileno = u64::from_le_bytes(buf[0..8].try_into().ok()?);
        let d_reclen = u16::from_le_bytes(buf[8..10].try_into().ok()?);
        let d_namlen = u16::from_le_bytes(buf[10..12].try_into().ok()?);
        if d_reclen as usize != DIRENT_RECLEN || d_namlen as usize >= DIRENT_NAME_MAX {
            return None;
        }
        let mut d_name = [0u8; DIRENT_NAME_MAX];
        d_name.copy_from_slice(&buf[NAME_OFFSET..NAME_OFFSET + DIRENT_NAME_MAX]);
        Some(Self {
            d_fileno,
            d_reclen,
            d_type: buf[12],
            d_namlen,
            d_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirent_layout() {
        let d = Dirent::new(2, DT_DIR, "..").unwrap();
        let raw = d.to_bytes();
        assert_eq!(raw.len(), DIRENT_RECLEN);
        assert_eq!(&raw[0..8], &2u64.to_le_bytes());
        assert_eq!(u16::from_le_bytes([raw[8], raw[9]]) as usize, DIRENT_RECLEN);
        assert_eq!(u16::from_le_bytes([raw[10], raw[11]]), 2);
        assert_eq!(raw[12], DT_DIR);
        assert_eq!(&raw[13..16], b"..\0");
    }

    #[test]
    fn test_dirent_parse() {
        let d = Dirent::new(7, DT_REG, "hello").unwrap();
        let parsed = Dirent::parse(&d.to_bytes()).unwrap();
        assert_eq!(parsed.name(), Some("hello"));
        assert_eq!(parsed.d_fileno, 7);
        assert!(Dirent::parse(&[0u8; 16]).is_none());
    }

    #[test]
    fn test_dirent_name_too_long() {
        let long = [b'a'; DIRENT_NAME_MAX];
        let name = core::str::from_utf8(&long).unwrap();
        assert!(Dirent::new(1, DT_REG, name).is_none());

        let mut d = Dirent::new(1, DT_REG, "a").unwrap();
        assert!(!d.set_name(name));
        assert!(d.set_name("b"));
        assert_eq!(d.name(), Some("b"));
    }
}
