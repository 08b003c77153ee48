//! 审查结果解析器
//!
//! 从审查服务的自由文本回复中提取 `{"approved": bool, "feedback": string}`

use crate::review::outcome::{ReviewError, ReviewOutcome};

/// 返回文本中第一个括号配平的 JSON 对象
///
/// 字符串字面量中的括号（包括转义引号之后的）不参与计数。
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + idx + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// 解析审查服务回复
pub fn parse_verdict(text: &str) -> Result<ReviewOutcome, ReviewError> {
    let object = extract_first_json_object(text).ok_or(ReviewError::NoJsonObject)?;
    let outcome: ReviewOutcome = serde_json::from_str(object)?;
    Ok(outcome)
}
