//! Git 操作工具

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// 执行 git 命令并返回输出
pub fn git_command(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    log::debug!("running git {}", args.join(" "));

    let output = cmd.output().context("Failed to execute git command")?;

    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// 获取 git 仓库根目录
pub fn get_git_root(cwd: Option<&Path>) -> Result<PathBuf> {
    git_command(&["rev-parse", "--show-toplevel"], cwd).map(PathBuf::from)
}

/// 获取 hooks 目录（尊重 core.hooksPath 和 worktree）
pub fn get_hooks_dir(cwd: &Path) -> Result<PathBuf> {
    let raw = git_command(&["rev-parse", "--git-path", "hooks"], Some(cwd))?;
    let path = PathBuf::from(raw);

    // --git-path 返回相对于 cwd 的路径
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(cwd.join(path))
    }
}

/// 获取暂存区完整 diff
pub fn get_staged_diff(cwd: Option<&Path>) -> Result<String> {
    git_command(&["diff", "--cached"], cwd).context("Failed to collect staged diff")
}

/// 获取暂存文件列表，按扩展名白名单过滤
///
/// 关闭重命名检测，重命名记为删除旧路径 + 新增新路径；`-z` 输出不做 C 风格转义，
/// 非 ASCII 路径原样返回。
pub fn get_staged_files(cwd: Option<&Path>, extensions: &[String]) -> Result<Vec<String>> {
    let output = git_command(
        &["diff", "--cached", "--name-only", "--no-renames", "-z"],
        cwd,
    )
    .context("Failed to collect staged file list")?;

    Ok(filter_reviewable(output.split('\0'), extensions))
}

/// 保留扩展名在白名单中的路径，顺序不变
pub fn filter_reviewable<'a, I>(paths: I, extensions: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter(|p| has_allowed_extension(p, extensions))
        .map(|p| p.to_string())
        .collect()
}

fn has_allowed_extension(path: &str, extensions: &[String]) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) else {
        return false;
    };

    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.') == ext)
}

/// 检查当前目录是否在 git 仓库中
pub fn is_git_repo(cwd: Option<&Path>) -> bool {
    git_command(&["rev-parse", "--git-dir"], cwd).is_ok()
}
