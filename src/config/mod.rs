//! 配置模块
//!
//! 解析顺序：默认值 ← `.review-gate.json` ← 环境变量。
//! 凭据只来自环境变量，不会写入或读取自配置文件。

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::read_optional_json;

pub const CONFIG_FILE: &str = ".review-gate.json";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_DIFF_CHARS: usize = 60_000;

/// 默认审查的文件扩展名
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".py", ".go", ".java", ".cs", ".php", ".rb", ".rs", ".html",
    ".css", ".scss", ".md",
];

/// 审查服务提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewProvider {
    #[default]
    OpenAi,
    Anthropic,
}

impl ReviewProvider {
    /// 凭据所在的环境变量
    pub fn credential_var(self) -> &'static str {
        match self {
            ReviewProvider::OpenAi => "OPENAI_API_KEY",
            ReviewProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            ReviewProvider::OpenAi => "https://api.openai.com/v1/chat/completions",
            ReviewProvider::Anthropic => "https://api.anthropic.com/v1/messages",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ReviewProvider::OpenAi => "gpt-4o-mini",
            ReviewProvider::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

impl fmt::Display for ReviewProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewProvider::OpenAi => write!(f, "openai"),
            ReviewProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for ReviewProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ReviewProvider::OpenAi),
            "anthropic" | "claude" => Ok(ReviewProvider::Anthropic),
            other => bail!("Unknown review provider: {}", other),
        }
    }
}

/// Review gate 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub provider: ReviewProvider,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub max_diff_chars: usize,
    pub extensions: Vec<String>,

    #[serde(skip)]
    pub credential: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            provider: ReviewProvider::default(),
            model: None,
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_diff_chars: DEFAULT_MAX_DIFF_CHARS,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            credential: None,
        }
    }
}

impl GateConfig {
    /// 从仓库根目录加载配置并应用环境变量
    pub fn load(repo_root: &Path) -> Self {
        let mut config = Self::from_file(repo_root);
        config.apply_env_with(|key| env::var(key).ok());
        config
    }

    /// 只读取配置文件；文件无效时记录警告并使用默认值
    pub fn from_file(repo_root: &Path) -> Self {
        let path = repo_root.join(CONFIG_FILE);
        match read_optional_json::<GateConfig>(&path) {
            Ok(Some(config)) => {
                log::debug!("loaded config from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("ignoring {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    /// 使用给定的查找函数应用环境变量覆盖
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("REVIEW_GATE_PROVIDER") {
            match provider.parse() {
                Ok(p) => self.provider = p,
                Err(e) => log::warn!("{:#}; keeping {}", e, self.provider),
            }
        }

        if let Some(model) = get("REVIEW_GATE_MODEL") {
            self.model = Some(model);
        }

        if let Some(endpoint) = get("REVIEW_GATE_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }

        if let Some(raw) = get("REVIEW_GATE_TIMEOUT_SECS") {
            match raw.trim().parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => log::warn!("invalid REVIEW_GATE_TIMEOUT_SECS: {}", raw),
            }
        }

        if let Some(raw) = get("REVIEW_GATE_MAX_DIFF_CHARS") {
            match raw.trim().parse() {
                Ok(chars) => self.max_diff_chars = chars,
                Err(_) => log::warn!("invalid REVIEW_GATE_MAX_DIFF_CHARS: {}", raw),
            }
        }

        self.credential = get(self.provider.credential_var());
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.provider, ReviewProvider::OpenAi);
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.extensions.len(), 15);
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_missing_credential_stays_none() {
        let mut config = GateConfig::default();
        config.apply_env_with(lookup_from(&[("ANTHROPIC_API_KEY", "sk-ant")]));
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_blank_credential_is_absent() {
        let mut config = GateConfig::default();
        config.apply_env_with(lookup_from(&[("OPENAI_API_KEY", "   ")]));
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_provider_selects_credential_var() {
        let mut config = GateConfig::default();
        config.apply_env_with(lookup_from(&[
            ("REVIEW_GATE_PROVIDER", "anthropic"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
        ]));
        assert_eq!(config.provider, ReviewProvider::Anthropic);
        assert_eq!(config.credential.as_deref(), Some("sk-ant"));
        assert_eq!(config.model(), "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = GateConfig::default();
        config.apply_env_with(lookup_from(&[
            ("REVIEW_GATE_PROVIDER", "mystery"),
            ("REVIEW_GATE_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.provider, ReviewProvider::OpenAi);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{"model": "from-file", "timeout_secs": 5, "extensions": [".rs"]}"#,
        )
        .unwrap();

        let mut config = GateConfig::from_file(temp.path());
        assert_eq!(config.model(), "from-file");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.extensions, vec![".rs".to_string()]);
        assert_eq!(config.max_diff_chars, DEFAULT_MAX_DIFF_CHARS);

        config.apply_env_with(lookup_from(&[
            ("REVIEW_GATE_MODEL", "from-env"),
            ("REVIEW_GATE_ENDPOINT", "http://localhost:9999/v1/chat/completions"),
        ]));
        assert_eq!(config.model(), "from-env");
        assert_eq!(config.endpoint(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "{ nope").unwrap();

        assert_eq!(GateConfig::from_file(temp.path()), GateConfig::default());
    }

    #[test]
    fn test_credential_never_serialized() {
        let config = GateConfig {
            credential: Some("sk-secret".to_string()),
            ..GateConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = crate::templates::TemplateAssets::get_sample_config().unwrap();
        let config: GateConfig = serde_json::from_str(&sample).unwrap();
        assert_eq!(config.provider, ReviewProvider::OpenAi);
    }
}
