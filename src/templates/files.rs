//! 模板文件嵌入
//!
//! 嵌入审查指令、pre-commit hook 脚本和示例配置

use anyhow::{anyhow, Result};
use rust_embed::RustEmbed;

/// 模板文件资源（编译时嵌入）
#[derive(RustEmbed)]
#[folder = "embedded/templates/"]
pub struct TemplateAssets;

impl TemplateAssets {
    /// 获取审查指令模板
    pub fn get_review_prompt() -> Result<String> {
        Self::get_file("review_prompt.md")
    }

    /// 获取 pre-commit hook 脚本
    pub fn get_pre_commit_hook() -> Result<String> {
        Self::get_file("pre-commit.sh")
    }

    /// 获取示例配置 .review-gate.json
    pub fn get_sample_config() -> Result<String> {
        Self::get_file("review-gate.json")
    }

    /// 获取指定模板文件
    fn get_file(filename: &str) -> Result<String> {
        let file =
            Self::get(filename).ok_or_else(|| anyhow!("Template '{}' not found", filename))?;

        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| anyhow!("Failed to decode template '{}': {}", filename, e))?;

        Ok(content.to_string())
    }

    /// 列出所有可用的模板文件
    #[cfg(test)]
    fn list_templates() -> Vec<String> {
        Self::iter().map(|path| path.as_ref().to_string()).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════
// 测试
// ═══════════════════════════════════════════════════════════════════
