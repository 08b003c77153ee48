//! 工具模块
//!
//! 提供 Git、JSON、文件系统和文本格式化等常用工具函数

pub mod format;
pub mod fs;
pub mod git;
pub mod json;

// 重导出
pub use format::*;
pub use fs::*;
pub use git::*;
pub use json::*;
