//! 审查指令组装器

use anyhow::Result;

use crate::templates::TemplateAssets;
use crate::utils::truncate_middle;

/// 审查请求
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub instruction: String,
    pub diff_truncated: bool,
}

impl ReviewRequest {
    /// 将文件列表和 diff 嵌入固定指令模板
    pub fn build(changed_files: &[String], diff_text: &str, max_diff_chars: usize) -> Result<Self> {
        let template = TemplateAssets::get_review_prompt()?;

        let diff_truncated = diff_text.len() > max_diff_chars;
        let diff = truncate_middle(diff_text, max_diff_chars);

        let files = changed_files
            .iter()
            .map(|f| format!("- {}", f))
            .collect::<Vec<_>>()
            .join("\n");

        // diff 最后替换，避免 diff 内容中的占位符被再次展开
        let instruction = template
            .replace("{{files}}", &files)
            .replace("{{diff}}", &diff);

        Ok(Self {
            instruction,
            diff_truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_embeds_files_and_diff() {
        let diff = "diff --git a/a.rs b/a.rs\n+fn added() {}";
        let request = ReviewRequest::build(&files(&["a.rs", "b.py"]), diff, 10_000).unwrap();

        assert!(request.instruction.contains("- a.rs\n- b.py"));
        assert!(request.instruction.contains("+fn added() {}"));
        assert!(request.instruction.contains("\"approved\""));
        assert!(!request.instruction.contains("{{files}}"));
        assert!(!request.instruction.contains("{{diff}}"));
        assert!(!request.diff_truncated);
    }

    #[test]
    fn test_build_truncates_large_diff() {
        let diff = format!("HEAD{}TAIL", "x".repeat(5_000));
        let request = ReviewRequest::build(&files(&["a.rs"]), &diff, 500).unwrap();

        assert!(request.diff_truncated);
        assert!(request.instruction.contains("[TRUNCATED]"));
        assert!(request.instruction.contains("HEAD"));
        assert!(request.instruction.contains("TAIL"));
        assert!(request.instruction.len() < diff.len());
    }

    #[test]
    fn test_placeholder_in_diff_is_not_expanded() {
        let diff = "+let s = \"{{files}}\";";
        let request = ReviewRequest::build(&files(&["a.rs"]), diff, 10_000).unwrap();
        assert!(request.instruction.contains("+let s = \"{{files}}\";"));
    }
}
