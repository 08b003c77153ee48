//! Commit Gate
//!
//! 决定暂存的变更能否提交。只有审查服务明确返回 `approved: false` 才会阻塞；
//! 跳过审查和任何基础设施错误都放行。

use crate::config::DEFAULT_MAX_DIFF_CHARS;
use crate::review::outcome::{GateOutcome, ReviewError, ReviewOutcome, SkipReason};
use crate::review::prompt::ReviewRequest;
use crate::review::service::ReviewService;
use crate::review::verdict_parser::parse_verdict;

pub struct CommitGate<S> {
    service: S,
    max_diff_chars: usize,
}

impl<S: ReviewService> CommitGate<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            max_diff_chars: DEFAULT_MAX_DIFF_CHARS,
        }
    }

    #[cfg(test)]
    fn service(&self) -> &S {
        &self.service
    }

    pub fn with_max_diff_chars(mut self, max_diff_chars: usize) -> Self {
        self.max_diff_chars = max_diff_chars;
        self
    }

    /// 评估暂存变更，返回 approved/feedback
    pub async fn evaluate(
        &self,
        diff_text: &str,
        changed_files: &[String],
        credential: Option<&str>,
    ) -> ReviewOutcome {
        self.assess(diff_text, changed_files, credential)
            .await
            .outcome()
    }

    /// 评估暂存变更，保留跳过/判定/基础设施错误的区分
    pub async fn assess(
        &self,
        diff_text: &str,
        changed_files: &[String],
        credential: Option<&str>,
    ) -> GateOutcome {
        if changed_files.is_empty() || diff_text.trim().is_empty() {
            return GateOutcome::Skipped(SkipReason::NothingToReview);
        }

        let Some(credential) = credential.filter(|c| !c.trim().is_empty()) else {
            return GateOutcome::Skipped(SkipReason::NoCredential);
        };

        match self.request_verdict(diff_text, changed_files, credential).await {
            Ok(outcome) => GateOutcome::Reviewed(outcome),
            Err(e) => {
                log::debug!("review failed open: {:?}", e);
                GateOutcome::FailedOpen(e)
            }
        }
    }

    async fn request_verdict(
        &self,
        diff_text: &str,
        changed_files: &[String],
        credential: &str,
    ) -> Result<ReviewOutcome, ReviewError> {
        let request = ReviewRequest::build(changed_files, diff_text, self.max_diff_chars)
            .map_err(|e| ReviewError::Request(format!("{:#}", e)))?;

        if request.diff_truncated {
            log::info!(
                "diff exceeds {} bytes, sending truncated copy",
                self.max_diff_chars
            );
        }

        let response = self.service.review(credential, &request.instruction).await?;
        parse_verdict(&response)
    }
}
