//! 批量评论分析器 - 流程层
//!
//! 定义"一批评论"的完整处理流程：逐条调用情感分析服务、
//! 推导跟进标记、按固定节奏限速。
//!
//! ## 设计约束
//! - 结果与输入等长同序，一条对应一条
//! - 单条失败（`Error` 哨兵）不中断整批，整批调用永不失败
//! - 限速是固定节奏的粗粒度保护，不做自适应退避

use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{ActionNeeded, AnalyzedReview, Sentiment};
use crate::services::SentimentService;

/// 每处理多少条打印一次进度
const PROGRESS_INTERVAL: usize = 10;

/// 根据情感推导是否需要人工跟进
///
/// 只有 `Negative` 需要跟进，其余（包括空值与 `Error`）都不需要
pub fn determine_action_needed(sentiment: Sentiment) -> ActionNeeded {
    if sentiment == Sentiment::Negative {
        ActionNeeded::Yes
    } else {
        ActionNeeded::No
    }
}

/// 批量评论分析器
pub struct BatchAnalyzer {
    service: SentimentService,
    pacing_interval: usize,
    pacing_delay: Duration,
}

impl BatchAnalyzer {
    /// 创建生产环境使用的分析器
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self::with_service(
            SentimentService::new(config)?,
            config.pacing_interval,
            Duration::from_millis(config.pacing_delay_ms),
        ))
    }

    /// 使用自定义服务创建（测试用）
    pub fn with_service(
        service: SentimentService,
        pacing_interval: usize,
        pacing_delay: Duration,
    ) -> Self {
        Self {
            service,
            pacing_interval,
            pacing_delay,
        }
    }

    /// 逐条分析所有评论
    ///
    /// 返回值与输入等长同序；整批调用本身永不失败
    pub async fn analyze_all(&self, reviews: &[String]) -> Vec<AnalyzedReview> {
        let total = reviews.len();
        let mut results = Vec::with_capacity(total);

        for (index, review) in reviews.iter().enumerate() {
            let seq = index + 1;

            if seq % PROGRESS_INTERVAL == 0 {
                info!("  正在分析第 {}/{} 条评论...", seq, total);
            }

            let analysis = self.service.analyze(review).await;
            let action_needed = determine_action_needed(analysis.sentiment);

            results.push(AnalyzedReview {
                sentiment: analysis.sentiment,
                summary: analysis.summary,
                action_needed,
            });

            // 固定每 N 条暂停一次，给外部服务的限流窗口留出恢复时间
            if self.pacing_interval > 0 && seq % self.pacing_interval == 0 {
                sleep(self.pacing_delay).await;
            }
        }

        info!("✓ 完成 {} 条评论的分析", total);
        results
    }
}
