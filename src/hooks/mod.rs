//! Hook 模块
//!
//! pre-commit 审查入口和 hook 安装

pub mod installer;
pub mod pre_commit;

// 重导出
pub use installer::*;
pub use pre_commit::*;
