// Text Formatting Utilities

const TRUNCATION_MARKER: &str = "\n\n... [TRUNCATED] ...\n\n";

/// 保留头尾,截断中间
///
/// `max_len` 按字节计算，切分点总是落在 UTF-8 字符边界上。
pub fn truncate_middle(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let half = max_len.saturating_sub(TRUNCATION_MARKER.len()) / 2;
    let head_end = floor_char_boundary(text, half);
    let tail_start = ceil_char_boundary(text, text.len() - half);

    format!(
        "{}{}{}",
        &text[..head_end],
        TRUNCATION_MARKER,
        &text[tail_start..]
    )
}

/// 截断文本 (只保留前面部分)
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        format!("{}...", &text[..floor_char_boundary(text, max_len)])
    }
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
