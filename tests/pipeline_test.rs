//! 流水线集成测试
//!
//! 用内存存储 + 脚本化的假后端跑完整条流水线，
//! 验证处理表内容、降级路径与幂等性

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use review_analysis::analysis::build_report;
use review_analysis::config::Config;
use review_analysis::models::{CellValue, Table};
use review_analysis::orchestrator::run_etl_pipeline;
use review_analysis::services::{CompletionBackend, RetryPolicy, SentimentService};
use review_analysis::store::InMemorySheetStore;
use review_analysis::workflow::BatchAnalyzer;

/// 按评论内容返回固定响应的假后端（确定性，可重复）
struct ScriptedBackend {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if prompt.contains("love") {
            Ok("Sentiment: Positive\nSummary: Customer loves it.".to_string())
        } else if prompt.contains("terrible") {
            Ok("Sentiment: Negative\nSummary: Poor fit.".to_string())
        } else {
            Ok("Sentiment: Neutral\nSummary: Average experience.".to_string())
        }
    }
}

fn analyzer_with_calls() -> (BatchAnalyzer, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let service = SentimentService::with_backend(
        Box::new(ScriptedBackend {
            calls: calls.clone(),
        }),
        RetryPolicy::new(3, Duration::from_millis(0)),
    );
    (
        BatchAnalyzer::with_service(service, 20, Duration::from_millis(0)),
        calls,
    )
}

/// 原始表：包含脏文本、完全为空的行
fn raw_table() -> Table {
    Table::from_value_rows(&[
        vec![json!("Class Name"), json!("Title"), json!("Review Text")],
        vec![json!("Dress"), json!("  Great   buy "), json!("I love\nthis dress")],
        vec![json!(""), json!("   "), json!("")],
        vec![json!("Pants"), json!("Bad"), json!("terrible fit")],
        vec![json!("Pants"), json!("Meh"), json!("")],
    ])
}

fn store_with_raw(config: &Config) -> InMemorySheetStore {
    let store = InMemorySheetStore::new();
    store.insert(&config.raw_worksheet, raw_table());
    store.mark_protected(&config.raw_worksheet);
    store
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let config = Config::default();
    let store = store_with_raw(&config);
    let (analyzer, calls) = analyzer_with_calls();

    let processed = run_etl_pipeline(&store, &analyzer, &config, true)
        .await
        .expect("流水线应该成功");

    // 完全为空的行被丢弃，其余保留
    assert_eq!(processed.row_count(), 3);
    assert_eq!(
        processed.headers(),
        &[
            "Class Name",
            "Title",
            "Review Text",
            "AI Sentiment",
            "AI Summary",
            "Action Needed?",
        ]
    );

    // 文本已标准化
    assert_eq!(
        processed.rows()[0][1],
        CellValue::Text("Great buy".into())
    );
    assert_eq!(
        processed.rows()[0][2],
        CellValue::Text("I love this dress".into())
    );

    // LLM 结果按行序写入
    assert_eq!(
        processed.column_text("AI Sentiment").unwrap(),
        vec!["Positive", "Negative", ""]
    );
    assert_eq!(
        processed.column_text("AI Summary").unwrap(),
        vec!["Customer loves it.", "Poor fit.", ""]
    );
    assert_eq!(
        processed.column_text("Action Needed?").unwrap(),
        vec!["No", "Yes", "No"]
    );

    // 空评论不触发服务调用：4 行里只有 2 条非空评论
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // 暂存表与处理表都已写入存储
    let staging = store.snapshot(&config.staging_worksheet).expect("暂存表已写入");
    assert_eq!(staging.row_count(), 3);
    assert_eq!(staging.column_count(), 3);

    let stored = store.snapshot(&config.processed_worksheet).expect("处理表已写入");
    assert_eq!(&stored, &processed);
}

#[tokio::test]
async fn test_pipeline_is_idempotent() {
    let config = Config::default();
    let store = store_with_raw(&config);

    let (analyzer, _) = analyzer_with_calls();
    let first = run_etl_pipeline(&store, &analyzer, &config, true)
        .await
        .expect("第一次运行成功");

    let (analyzer, _) = analyzer_with_calls();
    let second = run_etl_pipeline(&store, &analyzer, &config, true)
        .await
        .expect("第二次运行成功");

    // 原始数据与服务响应不变，两次运行产出完全相同
    assert_eq!(first, second);
    assert_eq!(
        store.snapshot(&config.processed_worksheet).unwrap(),
        second
    );
}

#[tokio::test]
async fn test_pipeline_skips_enrichment_without_review_column() {
    let config = Config::default();
    let store = InMemorySheetStore::new();
    store.insert(
        &config.raw_worksheet,
        Table::from_value_rows(&[
            vec![json!("Class Name"), json!("Title")],
            vec![json!("Dress"), json!("No review here")],
        ]),
    );

    let (analyzer, calls) = analyzer_with_calls();
    let processed = run_etl_pipeline(&store, &analyzer, &config, true)
        .await
        .expect("降级路径不是失败");

    // 结果列存在但保持为空，后端一次都没被调用
    assert_eq!(
        processed.column_text("AI Sentiment").unwrap(),
        vec![String::new()]
    );
    assert_eq!(
        processed.column_text("Action Needed?").unwrap(),
        vec![String::new()]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pipeline_without_llm_flag_leaves_columns_empty() {
    let config = Config::default();
    let store = store_with_raw(&config);

    let (analyzer, calls) = analyzer_with_calls();
    let processed = run_etl_pipeline(&store, &analyzer, &config, false)
        .await
        .expect("关闭富集也能运行");

    assert!(processed.has_column("AI Sentiment"));
    assert_eq!(
        processed.column_text("AI Summary").unwrap(),
        vec![String::new(), String::new(), String::new()]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_report_built_from_pipeline_output() {
    let config = Config::default();
    let store = store_with_raw(&config);
    let (analyzer, _) = analyzer_with_calls();

    let processed = run_etl_pipeline(&store, &analyzer, &config, true)
        .await
        .expect("流水线应该成功");

    let report = build_report(&processed, &config.class_column, &config.sentiment_column)
        .expect("聚合应该成功");

    // 空情感的行不参与统计：Dress-Positive 1 条 + Pants-Negative 1 条
    assert_eq!(report.overall.total_reviews, 2);
    assert_eq!(report.overall.positive, 50.0);
    assert_eq!(report.overall.negative, 50.0);
    assert_eq!(report.top_positive.class_name, "Dress");
    assert_eq!(report.top_negative.class_name, "Pants");
    assert_eq!(report.top_neutral.class_name, "None");
}

#[tokio::test]
async fn test_missing_raw_worksheet_is_fatal() {
    let config = Config::default();
    let store = InMemorySheetStore::new();
    let (analyzer, _) = analyzer_with_calls();

    let err = run_etl_pipeline(&store, &analyzer, &config, true)
        .await
        .expect_err("原始表缺失应该失败");

    assert!(format!("{:#}", err).contains("raw_data"));
}
