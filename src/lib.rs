// Review Gate - Library Root
//
// 提交前 LLM 代码审查：收集暂存变更、调用审查服务、按判定放行或阻塞

pub mod config;
pub mod hooks;
pub mod review;
pub mod templates;
pub mod utils;

// 重新导出常用类型
pub use config::GateConfig;
pub use review::{CommitGate, GateOutcome, ReviewOutcome, ReviewService};
