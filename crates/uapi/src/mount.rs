//! EmptyFS 挂载参数块
//!
//! 挂载工具把参数编码成定长块交给内核，驱动在挂载时解码并校验。布局（小端）：
//!
//! | 偏移 | 长度 | 字段 |
//! |------|------|------|
//! | 0    | 4    | `magic` |
//! | 4    | 4    | `version` |
//! | 8    | 4    | `debug_level` |
//! | 12   | 4    | `force_failure`（0 或 1） |
//! | 16   | 256  | `device_path`（NUL 填充） |

/// 参数块魔数（"EmFs"）
pub const EMPTYFS_MOUNT_ARGS_MAGIC: u32 = u32::from_be_bytes(*b"EmFs");

/// 当前参数块版本
pub const EMPTYFS_MOUNT_ARGS_VERSION: u32 = 1;

/// 设备路径字段容量（含结尾 NUL）
pub const EMPTYFS_DEVICE_PATH_MAX: usize = 256;

/// 参数块总字节数
pub const EMPTYFS_MOUNT_ARGS_LEN: usize = 16 + EMPTYFS_DEVICE_PATH_MAX;

/// 参数块解码错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountArgsError {
    /// 长度不足
    Truncated,
    /// 魔数不符
    BadMagic(u32),
    /// 版本不支持
    BadVersion(u32),
    /// 设备路径没有 NUL 结尾或不是 UTF-8
    BadDevicePath,
}

/// 解码后的挂载参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyFsMountArgs {
    /// 调试级别，0 表示关闭逐操作跟踪
    pub debug_level: u32,
    /// 挂载在完成所有准备后仍然失败（测试挂载失败路径用）
    pub force_failure: bool,
    device_path: [u8; EMPTYFS_DEVICE_PATH_MAX],
    device_path_len: usize,
}

impl EmptyFsMountArgs {
    /// 构造参数，设备路径放不下时返回 `None`
    pub fn new(device_path: &str, debug_level: u32, force_failure: bool) -> Option<Self> {
        let bytes = device_path.as_bytes();
        if bytes.len() >= EMPTYFS_DEVICE_PATH_MAX || bytes.contains(&0) {
            return None;
        }
        let mut path = [0u8; EMPTYFS_DEVICE_PATH_MAX];
        path[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            debug_level,
            force_failure,
            device_path: path,
            device_path_len: bytes.len(),
        })
    }

    /// 设备路径
    pub fn device_path(&self) -> &str {
        // new/from_bytes 都保证了 UTF-8
        core::str::from_utf8(&self.device_path[..self.device_path_len]).unwrap_or("")
    }

    /// 按当前版本编码
    pub fn to_bytes(&self) -> [u8; EMPTYFS_MOUNT_ARGS_LEN] {
        let mut out = [0u8; EMPTYFS_MOUNT_ARGS_LEN];
        out[0..4].copy_from_slice(&EMPTYFS_MOUNT_ARGS_MAGIC.to_le_bytes());
        out[4..8].copy_from_slice(&EMPTYFS_MOUNT_ARGS_VERSION.to_le_bytes());
        out[8..12].copy_from_slice(&self.debug_level.to_le_bytes());
        out[12..16].copy_from_slice(&(self.force_failure as u32).to_le_bytes());
        out[16..].copy_from_slice(&self.device_path);
        out
    }

    /// 解码并校验参数块
    ///
    /// 多余的尾部字节被忽略。
    pub fn from_bytes(raw: &[u8]) -> Result<Self, MountArgsError> {
        if raw.len() < EMPTYFS_MOUNT_ARGS_LEN {
            return Err(MountArgsError::Truncated);
        }
        let word = |at: usize| u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);

        let magic = word(0);
        if magic != EMPTYFS_MOUNT_ARGS_MAGIC {
            return Err(MountArgsError::BadMagic(magic));
        }
        let version = word(4);
        if version != EMPTYFS_MOUNT_ARGS_VERSION {
            return Err(MountArgsError::BadVersion(version));
        }

        let path_field = &raw[16..EMPTYFS_MOUNT_ARGS_LEN];
        let len = path_field
            .iter()
            .position(|&b| b == 0)
            .ok_or(MountArgsError::BadDevicePath)?;
        core::str::from_utf8(&path_field[..len]).map_err(|_| MountArgsError::BadDevicePath)?;

        let mut device_path = [0u8; EMPTYFS_DEVICE_PATH_MAX];
        device_path[..len].copy_from_slice(&path_field[..len]);
        Ok(Self {
            debug_level: word(8),
            force_failure: word(12) != 0,
            device_path,
            device_path_len: len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_args_encode_decode() {
        let args = EmptyFsMountArgs::new("/dev/disk3", 2, true).unwrap();
        let raw = args.to_bytes();
        assert_eq!(&raw[0..4], &EMPTYFS_MOUNT_ARGS_MAGIC.to_le_bytes());

        let decoded = EmptyFsMountArgs::from_bytes(&raw).unwrap();
        assert_eq!(decoded.device_path(), "/dev/disk3");
        assert_eq!(decoded.debug_level, 2);
        assert!(decoded.force_failure);
    }

    #[test]
    fn test_mount_args_truncated() {
        let raw = EmptyFsMountArgs::new("/dev/x", 0, false).unwrap().to_bytes();
        assert_eq!(
            EmptyFsMountArgs::from_bytes(&raw[..EMPTYFS_MOUNT_ARGS_LEN - 1]),
            Err(MountArgsError::Truncated)
        );
    }

    #[test]
    fn test_mount_args_bad_magic_and_version() {
        let mut raw = EmptyFsMountArgs::new("/dev/x", 0, false).unwrap().to_bytes();
        raw[4] = 9;
        assert_eq!(
            EmptyFsMountArgs::from_bytes(&raw),
            Err(MountArgsError::BadVersion(9))
        );

        raw[0] ^= 0xff;
        assert!(matches!(
            EmptyFsMountArgs::from_bytes(&raw),
            Err(MountArgsError::BadMagic(_))
        ));
    }

    #[test]
    fn test_mount_args_unterminated_path() {
        let mut raw = EmptyFsMountArgs::new("", 0, false).unwrap().to_bytes();
        for b in raw[16..].iter_mut() {
            *b = b'a';
        }
        assert_eq!(
            EmptyFsMountArgs::from_bytes(&raw),
            Err(MountArgsError::BadDevicePath)
        );
    }

    #[test]
    fn test_mount_args_rejects_long_path() {
        let long = [b'p'; EMPTYFS_DEVICE_PATH_MAX];
        assert!(EmptyFsMountArgs::new(core::str::from_utf8(&long).unwrap(), 0, false).is_none());
    }
}
