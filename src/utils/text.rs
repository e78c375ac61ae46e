//! 文本清洗工具
//!
//! 评论文本的标准化能力：去除首尾空白、压缩内部空白、
//! 缺失值统一映射为空串。全部是纯函数，永不失败。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CellValue;

/// 任意连续空白（含换行、制表符）
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("固定模式必定合法"));

/// 清洗并标准化一段文本
///
/// 去除首尾空白，内部任意连续空白压缩为单个空格。
/// 幂等：`clean_text(clean_text(x)) == clean_text(x)`
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// 把单元格标准化为字符串
///
/// 空单元格与 NaN 一律映射为空串，文本走 `clean_text`，
/// 数字保持原有数值的文本形式。
pub fn normalize_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => clean_text(s),
        other => other.to_text(),
    }
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  hello   world  "), "hello world");
        assert_eq!(clean_text("line1\nline2\t tab"), "line1 line2 tab");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n\t  "), "");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let inputs = ["  a  b ", "x", "", "多行\n文本  压缩", " \t "];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "输入: {:?}", input);
        }
    }

    #[test]
    fn test_normalize_cell_maps_missing_to_empty() {
        assert_eq!(normalize_cell(&CellValue::Empty), "");
        assert_eq!(normalize_cell(&CellValue::Number(f64::NAN)), "");
        assert_eq!(normalize_cell(&CellValue::Text("  a  b ".into())), "a b");
        assert_eq!(normalize_cell(&CellValue::Number(42.0)), "42");
        assert_eq!(normalize_cell(&CellValue::Number(1.5)), "1.5");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 5), "abcde...");
    }
}
