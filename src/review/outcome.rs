//! 审查结果类型

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FEEDBACK_NOTHING_TO_REVIEW: &str = "nothing to review";
pub const FEEDBACK_NO_CREDENTIAL: &str = "review skipped, no credential";
pub const FEEDBACK_REVIEW_ERROR: &str = "review error, proceeding";

/// 审查服务给出的判定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub approved: bool,
    #[serde(default)]
    pub feedback: String,
}

impl ReviewOutcome {
    pub fn approve(feedback: impl Into<String>) -> Self {
        Self {
            approved: true,
            feedback: feedback.into(),
        }
    }

    pub fn reject(feedback: impl Into<String>) -> Self {
        Self {
            approved: false,
            feedback: feedback.into(),
        }
    }
}

/// 跳过审查的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 没有可审查的文件，或 diff 为空
    NothingToReview,
    /// 未配置凭据
    NoCredential,
}

impl SkipReason {
    pub fn feedback(self) -> &'static str {
        match self {
            SkipReason::NothingToReview => FEEDBACK_NOTHING_TO_REVIEW,
            SkipReason::NoCredential => FEEDBACK_NO_CREDENTIAL,
        }
    }
}

/// 审查服务的基础设施错误
///
/// 任何一种都会让 gate 放行提交。
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("review request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("review service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to build review request: {0}")]
    Request(String),

    #[error("review service returned no text")]
    EmptyResponse,

    #[error("no JSON object found in review response")]
    NoJsonObject,

    #[error("malformed review verdict: {0}")]
    MalformedVerdict(#[from] serde_json::Error),
}

/// 一次 gate 评估的完整结果
#[derive(Debug)]
pub enum GateOutcome {
    /// 未调用审查服务
    Skipped(SkipReason),
    /// 审查服务给出了判定
    Reviewed(ReviewOutcome),
    /// 审查服务不可用，放行
    FailedOpen(ReviewError),
}

impl GateOutcome {
    pub fn is_approved(&self) -> bool {
        match self {
            GateOutcome::Reviewed(outcome) => outcome.approved,
            GateOutcome::Skipped(_) | GateOutcome::FailedOpen(_) => true,
        }
    }

    /// 折叠为 approved/feedback
    pub fn outcome(&self) -> ReviewOutcome {
        match self {
            GateOutcome::Skipped(reason) => ReviewOutcome::approve(reason.feedback()),
            GateOutcome::Reviewed(outcome) => outcome.clone(),
            GateOutcome::FailedOpen(_) => ReviewOutcome::approve(FEEDBACK_REVIEW_ERROR),
        }
    }

    /// 进程退出码：0 放行，1 阻塞
    pub fn exit_code(&self) -> i32 {
        if self.is_approved() {
            0
        } else {
            1
        }
    }
}
