//! 报表聚合
//!
//! 消费处理完成的表格，产出按类别的情感分布、总体分布与
//! 各情感占比最高的类别。纯计算，无 I/O。
//!
//! 统计口径：
//! - 只统计情感列为 Positive/Negative/Neutral 的行
//!   （`Error` 与空串不参与）
//! - 百分比 = 数量 / 该类别总数 × 100，保留 2 位小数
//! - 分组顺序按首次出现顺序，占比并列时取先出现的类别

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Sentiment, Table};

/// 某个情感没有命中任何类别时的占位名称
const NO_CLASS: &str = "None";

/// (类别, 情感) 维度的统计
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentStat {
    pub class_name: String,
    pub sentiment: Sentiment,
    /// 该类别下此情感的行数
    pub count: usize,
    /// 该类别的总行数
    pub total: usize,
    /// count / total × 100，保留 2 位小数
    pub percentage: f64,
}

/// 总体情感分布
#[derive(Debug, Clone, PartialEq)]
pub struct OverallSentiment {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    /// 参与统计的行数
    pub total_reviews: usize,
}

/// 某个情感占比最高的类别
#[derive(Debug, Clone, PartialEq)]
pub struct TopClass {
    pub class_name: String,
    pub percentage: f64,
}

/// 聚合分析结果
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub overall: OverallSentiment,
    pub by_class: Vec<SentimentStat>,
    pub top_positive: TopClass,
    pub top_negative: TopClass,
    pub top_neutral: TopClass,
}

/// 从处理完成的表格构建聚合报表
///
/// 类别列或情感列缺失时立刻报错，绝不在缺列的情况下硬算
pub fn build_report(
    table: &Table,
    class_column: &str,
    sentiment_column: &str,
) -> AppResult<AnalysisReport> {
    let class_idx = table
        .column_index(class_column)
        .ok_or_else(|| AppError::missing_column(class_column, table.headers()))?;
    let sentiment_idx = table
        .column_index(sentiment_column)
        .ok_or_else(|| AppError::missing_column(sentiment_column, table.headers()))?;

    // 过滤出有有效评分的行
    let scored: Vec<(String, Sentiment)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let sentiment = Sentiment::from_scored_label(&row[sentiment_idx].to_text())?;
            Some((row[class_idx].to_text(), sentiment))
        })
        .collect();

    let by_class = calculate_sentiment_by_class(&scored);
    let overall = calculate_overall(&scored);

    let top_positive = top_class_for(&by_class, Sentiment::Positive);
    let top_negative = top_class_for(&by_class, Sentiment::Negative);
    let top_neutral = top_class_for(&by_class, Sentiment::Neutral);

    Ok(AnalysisReport {
        overall,
        by_class,
        top_positive,
        top_negative,
        top_neutral,
    })
}

/// 按 (类别, 情感) 分组计数并计算占比
///
/// 分组顺序即首次出现顺序，下游的并列裁决依赖这一点
fn calculate_sentiment_by_class(scored: &[(String, Sentiment)]) -> Vec<SentimentStat> {
    let mut stats: Vec<SentimentStat> = Vec::new();
    let mut class_totals: Vec<(String, usize)> = Vec::new();

    for (class_name, sentiment) in scored {
        match stats
            .iter_mut()
            .find(|s| &s.class_name == class_name && s.sentiment == *sentiment)
        {
            Some(stat) => stat.count += 1,
            None => stats.push(SentimentStat {
                class_name: class_name.clone(),
                sentiment: *sentiment,
                count: 1,
                total: 0,
                percentage: 0.0,
            }),
        }

        match class_totals.iter_mut().find(|(name, _)| name == class_name) {
            Some((_, total)) => *total += 1,
            None => class_totals.push((class_name.clone(), 1)),
        }
    }

    for stat in &mut stats {
        let total = class_totals
            .iter()
            .find(|(name, _)| name == &stat.class_name)
            .map(|(_, total)| *total)
            .unwrap_or(0);
        stat.total = total;
        stat.percentage = if total == 0 {
            0.0
        } else {
            round2(stat.count as f64 / total as f64 * 100.0)
        };
    }

    stats
}

/// 总体情感分布；没有任何评分时全部为 0
fn calculate_overall(scored: &[(String, Sentiment)]) -> OverallSentiment {
    let total = scored.len();
    let count_of = |target: Sentiment| scored.iter().filter(|(_, s)| *s == target).count();

    let pct_of = |count: usize| {
        if total == 0 {
            0.0
        } else {
            round2(count as f64 / total as f64 * 100.0)
        }
    };

    OverallSentiment {
        positive: pct_of(count_of(Sentiment::Positive)),
        negative: pct_of(count_of(Sentiment::Negative)),
        neutral: pct_of(count_of(Sentiment::Neutral)),
        total_reviews: total,
    }
}

/// 找出某个情感占比最高的类别
///
/// 并列时保留先出现的类别；该情感没有任何行时返回占位结果
fn top_class_for(stats: &[SentimentStat], sentiment: Sentiment) -> TopClass {
    let mut best: Option<&SentimentStat> = None;

    for stat in stats.iter().filter(|s| s.sentiment == sentiment) {
        if best.map_or(true, |b| stat.percentage > b.percentage) {
            best = Some(stat);
        }
    }

    match best {
        Some(stat) => TopClass {
            class_name: stat.class_name.clone(),
            percentage: stat.percentage,
        },
        None => TopClass {
            class_name: NO_CLASS.to_string(),
            percentage: 0.0,
        },
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 把报表打印到日志（人类可读，非契约内容）
pub fn log_report(report: &AnalysisReport) {
    info!("\n{}", "=".repeat(60));
    info!("情感分析报告");
    info!("{}", "=".repeat(60));

    info!("\n📊 总体情感分布:");
    info!("  Positive: {:.2}%", report.overall.positive);
    info!("  Negative: {:.2}%", report.overall.negative);
    info!("  Neutral:  {:.2}%", report.overall.neutral);
    info!("  参与统计的评论总数: {}", report.overall.total_reviews);

    info!("\n🏆 各情感占比最高的类别:");
    info!(
        "  Positive 最高: {} ({:.2}%)",
        report.top_positive.class_name, report.top_positive.percentage
    );
    info!(
        "  Negative 最高: {} ({:.2}%)",
        report.top_negative.class_name, report.top_negative.percentage
    );
    info!(
        "  Neutral  最高: {} ({:.2}%)",
        report.top_neutral.class_name, report.top_neutral.percentage
    );

    info!("\n📋 按类别明细:");
    for stat in &report.by_class {
        info!(
            "  {} | {} | {}/{} | {:.2}%",
            stat.class_name, stat.sentiment, stat.count, stat.total, stat.percentage
        );
    }
}
