//! 情感分析服务 - 业务能力层
//!
//! 只负责"单条评论的情感判断与一句话摘要"能力，不关心批量与流程
//!
//! ## 职责
//! - 构造固定模板的提示词
//! - 通过重试策略调用补全后端
//! - 逐行解析响应文本
//! - 只处理单条评论，不出现 Vec
//! - 不关心流程顺序

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{ReviewAnalysis, Sentiment};
use crate::services::completion::{CompletionBackend, OpenAiBackend};
use crate::services::retry::RetryPolicy;
use crate::utils::truncate_text;

/// 重试耗尽后写入摘要列的占位文本
const FAILED_SUMMARY: &str = "Failed to analyze";

const SENTIMENT_PREFIX: &str = "Sentiment:";
const SUMMARY_PREFIX: &str = "Summary:";

/// 情感分析服务
pub struct SentimentService {
    backend: Box<dyn CompletionBackend>,
    retry: RetryPolicy,
}

impl SentimentService {
    /// 创建生产环境使用的服务
    pub fn new(config: &Config) -> AppResult<Self> {
        let backend = OpenAiBackend::new(config)?;
        let retry = RetryPolicy::new(
            config.llm_max_retries,
            Duration::from_secs(config.llm_retry_delay_secs),
        );

        Ok(Self::with_backend(Box::new(backend), retry))
    }

    /// 使用自定义后端创建（测试用）
    pub fn with_backend(backend: Box<dyn CompletionBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// 分析单条评论，返回情感标签与一句话摘要
    ///
    /// - 空评论直接返回空结果，不调用后端
    /// - 调用失败按策略重试；重试耗尽返回 `Error` 哨兵结果，
    ///   绝不把错误抛给调用方
    pub async fn analyze(&self, review_text: &str) -> ReviewAnalysis {
        if review_text.trim().is_empty() {
            return ReviewAnalysis {
                sentiment: Sentiment::Empty,
                summary: String::new(),
            };
        }

        let prompt = build_prompt(review_text);

        match self.retry.run(|_attempt| self.backend.complete(&prompt)).await {
            Ok(raw) => {
                let (sentiment, summary) = parse_llm_response(&raw, review_text);
                debug!(
                    "评论分析完成: {} | {}",
                    sentiment,
                    truncate_text(&summary, 60)
                );
                ReviewAnalysis { sentiment, summary }
            }
            Err(e) => {
                warn!("  评论分析失败，已放弃重试: {}", e);
                ReviewAnalysis {
                    sentiment: Sentiment::Error,
                    summary: FAILED_SUMMARY.to_string(),
                }
            }
        }
    }
}

/// 构造分析提示词
///
/// 要求服务端按两个带标签的行回复；评论过短时回显原文作为摘要
fn build_prompt(review_text: &str) -> String {
    format!(
        r#"Analyze the following customer review and provide:
1. Sentiment: Classify as exactly one of: Positive, Negative, or Neutral
2. Summary: Provide a one-sentence summary of the review

Review: "{review_text}"

Respond in the following format:
Sentiment: [Positive/Negative/Neutral]
Summary: [One sentence summary]

If the review is too short to summarize meaningfully, just repeat the original text as the summary."#
    )
}

/// 逐行解析 LLM 响应
///
/// 规则（与线上行为一致，刻意不做"修复"）：
/// - 第一个以 `Sentiment:` 开头的行决定情感：先做区分大小写的
///   精确匹配，失败再做不区分大小写的子串匹配，否则归为 Neutral
/// - 第一个以 `Summary:` 开头的行决定摘要；剩余部分为空回退到原文
/// - 两个行都缺失时：Neutral + 原文
fn parse_llm_response(response: &str, original_review: &str) -> (Sentiment, String) {
    let mut sentiment = Sentiment::Neutral;
    let mut summary = original_review.to_string();
    let mut sentiment_seen = false;
    let mut summary_seen = false;

    for line in response.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix(SENTIMENT_PREFIX) {
            if sentiment_seen {
                continue;
            }
            sentiment_seen = true;

            let value = rest.trim();
            sentiment = match value {
                "Positive" => Sentiment::Positive,
                "Negative" => Sentiment::Negative,
                "Neutral" => Sentiment::Neutral,
                other => {
                    let lower = other.to_lowercase();
                    if lower.contains("positive") {
                        Sentiment::Positive
                    } else if lower.contains("negative") {
                        Sentiment::Negative
                    } else {
                        Sentiment::Neutral
                    }
                }
            };
        } else if let Some(rest) = line.strip_prefix(SUMMARY_PREFIX) {
            if summary_seen {
                continue;
            }
            summary_seen = true;

            let value = rest.trim();
            if !value.is_empty() {
                summary = value.to_string();
            }
        }
    }

    (sentiment, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// 返回固定响应的假后端
    struct FixedBackend {
        response: String,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    /// 永远失败的假后端
    struct FailingBackend {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl CompletionBackend for FailingBackend {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("服务暂时不可用")
        }
    }

    fn service_with(backend: Box<dyn CompletionBackend>) -> SentimentService {
        SentimentService::with_backend(backend, RetryPolicy::new(3, Duration::from_millis(5)))
    }

    // ========== 响应解析 ==========

    #[test]
    fn test_parse_valid_response() {
        let (sentiment, summary) =
            parse_llm_response("Sentiment: Negative\nSummary: Poor fit.", "原文");
        assert_eq!(sentiment, Sentiment::Negative);
        assert_eq!(summary, "Poor fit.");
    }

    #[test]
    fn test_parse_invalid_sentiment_defaults_to_neutral() {
        // 无效标签且没有摘要行：Neutral + 原文
        let (sentiment, summary) =
            parse_llm_response("Sentiment: Amazing", "The dress is amazing");
        assert_eq!(sentiment, Sentiment::Neutral);
        assert_eq!(summary, "The dress is amazing");
    }

    #[test]
    fn test_parse_substring_match_is_case_insensitive() {
        let (sentiment, _) = parse_llm_response("Sentiment: very POSITIVE overall", "x");
        assert_eq!(sentiment, Sentiment::Positive);

        let (sentiment, _) = parse_llm_response("Sentiment: somewhat negative", "x");
        assert_eq!(sentiment, Sentiment::Negative);

        // 精确匹配优先于子串匹配，小写的完整标签走子串分支
        let (sentiment, _) = parse_llm_response("Sentiment: positive", "x");
        assert_eq!(sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_parse_empty_summary_falls_back_to_original() {
        let (sentiment, summary) =
            parse_llm_response("Sentiment: Positive\nSummary:", "Love this dress");
        assert_eq!(sentiment, Sentiment::Positive);
        assert_eq!(summary, "Love this dress");
    }

    #[test]
    fn test_parse_missing_both_lines() {
        let (sentiment, summary) = parse_llm_response("无法解析的回复", "原始评论");
        assert_eq!(sentiment, Sentiment::Neutral);
        assert_eq!(summary, "原始评论");
    }

    #[test]
    fn test_parse_first_line_wins() {
        let response = "Sentiment: Positive\nSentiment: Negative\nSummary: First.\nSummary: Second.";
        let (sentiment, summary) = parse_llm_response(response, "x");
        assert_eq!(sentiment, Sentiment::Positive);
        assert_eq!(summary, "First.");
    }

    #[test]
    fn test_parse_ignores_unrelated_lines() {
        let response = "以下是分析结果：\nSentiment: Negative\n---\nSummary: Too small.";
        let (sentiment, summary) = parse_llm_response(response, "x");
        assert_eq!(sentiment, Sentiment::Negative);
        assert_eq!(summary, "Too small.");
    }

    // ========== 分析流程 ==========

    #[tokio::test]
    async fn test_empty_review_skips_backend() {
        let calls = Arc::new(AtomicU32::new(0));
        let service = service_with(Box::new(FailingBackend {
            calls: calls.clone(),
        }));

        for review in ["", "   ", "\n\t"] {
            let result = service.analyze(review).await;
            assert_eq!(result.sentiment, Sentiment::Empty);
            assert_eq!(result.summary, "");
        }

        // 空评论不触发任何服务调用
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_parses_backend_response() {
        let calls = Arc::new(AtomicU32::new(0));
        let service = service_with(Box::new(FixedBackend {
            response: "Sentiment: Positive\nSummary: Customer loves it.".to_string(),
            calls: calls.clone(),
        }));

        let result = service.analyze("I love this dress!").await;

        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.summary, "Customer loves it.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_error_sentinel() {
        let calls = Arc::new(AtomicU32::new(0));
        let service = service_with(Box::new(FailingBackend {
            calls: calls.clone(),
        }));

        let result = service.analyze("some review").await;

        // 恰好 3 次调用后放弃，返回哨兵结果而不是错误
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.sentiment, Sentiment::Error);
        assert_eq!(result.summary, "Failed to analyze");
    }
}
