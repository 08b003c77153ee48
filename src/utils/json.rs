//! JSON 工具

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 读取 JSON 文件
pub fn read_json<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file: {}", path.display()))
}

/// 读取可选的 JSON 文件
///
/// 文件不存在时返回 `Ok(None)`；存在但无法解析时返回错误。
pub fn read_optional_json<T>(path: &Path) -> Result<Option<T>>
where
    T: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}
