//! 情感分析结果模型

use std::fmt;

/// 情感标签
///
/// 前三个是外部服务给出的"有效评分"；`Error` 表示重试耗尽后的
/// 哨兵结果；`Empty` 对应原始评论为空、根本没有调用服务的情况。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Error,
    Empty,
}

impl Sentiment {
    /// 写入表格的单元格文本（`Empty` 写为空串）
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Error => "Error",
            Sentiment::Empty => "",
        }
    }

    /// 从单元格文本解析"有效评分"的标签
    ///
    /// 只接受三个有效标签的精确形式；`Error`、空串等一律返回 None，
    /// 聚合统计用它过滤行。
    pub fn from_scored_label(label: &str) -> Option<Sentiment> {
        match label {
            "Positive" => Some(Sentiment::Positive),
            "Negative" => Some(Sentiment::Negative),
            "Neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 是否需要人工跟进
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionNeeded {
    Yes,
    No,
}

impl ActionNeeded {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionNeeded::Yes => "Yes",
            ActionNeeded::No => "No",
        }
    }
}

impl fmt::Display for ActionNeeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单条评论的分析结果（情感 + 一句话摘要）
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAnalysis {
    pub sentiment: Sentiment,
    pub summary: String,
}

/// 批量分析的单条结果（在 `ReviewAnalysis` 之上补充跟进标记）
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedReview {
    pub sentiment: Sentiment,
    pub summary: String,
    pub action_needed: ActionNeeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scored_label_accepts_only_exact_labels() {
        assert_eq!(
            Sentiment::from_scored_label("Positive"),
            Some(Sentiment::Positive)
        );
        assert_eq!(
            Sentiment::from_scored_label("Negative"),
            Some(Sentiment::Negative)
        );
        assert_eq!(
            Sentiment::from_scored_label("Neutral"),
            Some(Sentiment::Neutral)
        );
        // 哨兵值与空串不参与统计
        assert_eq!(Sentiment::from_scored_label("Error"), None);
        assert_eq!(Sentiment::from_scored_label(""), None);
        assert_eq!(Sentiment::from_scored_label("positive"), None);
    }

    #[test]
    fn test_empty_sentiment_renders_as_empty_cell() {
        assert_eq!(Sentiment::Empty.as_str(), "");
        assert_eq!(Sentiment::Error.as_str(), "Error");
    }
}
