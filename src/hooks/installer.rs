//! Hook 安装
//!
//! 将内嵌的 pre-commit 脚本写入仓库的 hooks 目录

use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE;
use crate::templates::TemplateAssets;
use crate::utils::{file_exists, get_hooks_dir, is_executable, make_executable, write_file};

const HOOK_NAME: &str = "pre-commit";
const HOOK_MARKER: &str = "Installed by review-gate";

/// pre-commit hook 的安装状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Missing,
    /// review-gate 安装的 hook
    Installed { executable: bool },
    /// 其他工具的 hook
    Foreign,
}

/// pre-commit hook 路径
pub fn hook_path(repo_root: &Path) -> Result<PathBuf> {
    Ok(get_hooks_dir(repo_root)?.join(HOOK_NAME))
}

/// 检查 pre-commit hook 状态
pub fn hook_status(repo_root: &Path) -> Result<HookStatus> {
    let path = hook_path(repo_root)?;
    if !file_exists(&path) {
        return Ok(HookStatus::Missing);
    }

    let content = fs::read_to_string(&path).unwrap_or_default();
    if content.contains(HOOK_MARKER) {
        Ok(HookStatus::Installed {
            executable: is_executable(&path),
        })
    } else {
        Ok(HookStatus::Foreign)
    }
}

/// 安装 pre-commit hook
///
/// 已存在的 hook 只有在 `force` 时才会被覆盖。返回写入的路径。
pub fn install_hook(repo_root: &Path, force: bool) -> Result<PathBuf> {
    let path = hook_path(repo_root)?;

    if file_exists(&path) && !force {
        bail!(
            "{} already exists; re-run with --force to overwrite it",
            path.display()
        );
    }

    let script = TemplateAssets::get_pre_commit_hook()?;
    write_file(&path, &script)?;
    make_executable(&path)?;

    log::info!("installed pre-commit hook at {}", path.display());
    Ok(path)
}

/// 写入示例配置；已存在时不覆盖，返回是否写入
pub fn write_sample_config(repo_root: &Path) -> Result<bool> {
    let path = repo_root.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }

    write_file(&path, &TemplateAssets::get_sample_config()?)?;
    Ok(true)
}
