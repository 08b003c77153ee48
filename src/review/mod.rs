//! 提交审查模块
//!
//! CommitGate、审查服务客户端、指令模板与结果解析

pub mod gate;
pub mod outcome;
pub mod prompt;
pub mod report;
pub mod service;
pub mod verdict_parser;

// 重导出
pub use gate::CommitGate;
pub use outcome::*;
pub use prompt::ReviewRequest;
pub use report::{format_outcome, print_outcome, ReportLine};
pub use service::{HttpReviewService, ReviewService};
pub use verdict_parser::{extract_first_json_object, parse_verdict};
