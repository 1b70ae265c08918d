//! 与用户空间共用定义和声明
//!
//! 包含挂载参数块、目录项记录和时间结构，确保驱动和挂载工具对布局的理解一致。

#![no_std]
#![allow(dead_code)]

pub mod fs;
pub mod mount;
pub mod time;
