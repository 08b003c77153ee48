//! Pre-commit Hook
//!
//! 收集暂存变更并交给 CommitGate 审查

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::config::GateConfig;
use crate::review::{CommitGate, GateOutcome, HttpReviewService, ReviewService};
use crate::utils::{get_staged_diff, get_staged_files};

/// 暂存区快照
#[derive(Debug, Clone, Default)]
pub struct StagedChanges {
    pub diff: String,
    pub files: Vec<String>,
}

/// 收集暂存 diff 和可审查的文件列表
///
/// git 命令失败属于致命错误，调用方应以退出码 1 结束。
pub fn collect_staged_changes(repo_root: &Path, extensions: &[String]) -> Result<StagedChanges> {
    let diff = get_staged_diff(Some(repo_root))?;
    let files = get_staged_files(Some(repo_root), extensions)?;

    log::debug!(
        "collected {} reviewable file(s), {} byte diff",
        files.len(),
        diff.len()
    );

    Ok(StagedChanges { diff, files })
}

/// 使用给定的审查服务评估暂存变更
pub async fn review_staged_changes<S: ReviewService>(
    changes: &StagedChanges,
    config: &GateConfig,
    service: S,
) -> GateOutcome {
    let gate = CommitGate::new(service).with_max_diff_chars(config.max_diff_chars);

    if will_call_service(changes, config) {
        println!(
            "   📝 Reviewing {} file(s) with {} ({})",
            changes.files.len(),
            config.provider.to_string().cyan(),
            config.model()
        );
    }

    gate.assess(&changes.diff, &changes.files, config.credential.as_deref())
        .await
}

fn will_call_service(changes: &StagedChanges, config: &GateConfig) -> bool {
    let has_credential = config
        .credential
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty());

    has_credential && !changes.files.is_empty() && !changes.diff.trim().is_empty()
}

/// 运行 pre-commit hook
pub async fn run_pre_commit_hook(repo_root: &Path, config: &GateConfig) -> Result<GateOutcome> {
    println!("{}", "🔍 Review Gate: Analyzing staged changes...".cyan());

    let changes = collect_staged_changes(repo_root, &config.extensions)?;

    let service = match HttpReviewService::from_config(config) {
        Ok(service) => service,
        Err(e) => return Ok(GateOutcome::FailedOpen(e)),
    };

    Ok(review_staged_changes(&changes, config, service).await)
}
