//! 测试支持 crate
//!
//! 提供宿主机上运行测试所需的 Mock 实现：架构操作、时钟和活跃对象缓存。
//! 只作为 dev-dependency 使用。

pub mod mock;
