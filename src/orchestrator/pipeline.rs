//! ETL 流水线 - 编排层
//!
//! ## 职责
//!
//! 线性阶段，无回边：
//! 提取(raw) → 清洗 → 写入(staging) → 构造处理表结构
//! → [可选：LLM 情感富集] → 写入(processed)
//!
//! ## 幂等性
//!
//! 每次写入都是整表覆盖，结果只取决于当前 raw 表内容与外部
//! 服务的返回。原始数据与服务响应不变时，重复运行产出完全
//! 相同的 processed 表。

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{self, CellValue, Sentiment, Table};
use crate::store::SheetStore;
use crate::utils::normalize_cell;
use crate::workflow::BatchAnalyzer;

/// 写入暂存/处理表时预留的行余量
const ROW_HEADROOM: usize = 100;
/// 暂存表的列余量
const STAGING_COL_HEADROOM: usize = 10;
/// 处理表的列余量
const PROCESSED_COL_HEADROOM: usize = 5;

/// 从原始数据工作表提取数据
///
/// 原始表未开启写保护只告警，不阻塞流程
pub async fn extract_raw_data(store: &dyn SheetStore, config: &Config) -> Result<Table> {
    info!("📥 正在从 '{}' 工作表提取数据...", config.raw_worksheet);

    match store.is_protected(&config.raw_worksheet).await {
        Ok(true) => {}
        Ok(false) => warn!("⚠️ 工作表 '{}' 未开启写保护!", config.raw_worksheet),
        Err(e) => warn!(
            "⚠️ 无法检查工作表 '{}' 的保护状态: {}",
            config.raw_worksheet, e
        ),
    }

    let table = store
        .read_all(&config.raw_worksheet)
        .await
        .with_context(|| format!("无法读取原始数据工作表 '{}'", config.raw_worksheet))?;

    info!("✓ 从原始数据中提取了 {} 行", table.row_count());
    Ok(table)
}

/// 清洗数据：标准化所有文本单元格，丢弃完全为空的行
///
/// 行数只减不增；只要还有一个非空单元格，该行就保留
pub fn transform_staging_data(table: &Table) -> Table {
    info!("🧹 正在清洗数据...");

    let initial_rows = table.row_count();
    let mut transformed = Table::new(table.headers().to_vec());

    for row in table.rows() {
        let cleaned: Vec<CellValue> = row.iter().map(normalize_to_cell).collect();

        // 所有列都为空的行直接丢弃
        if cleaned.iter().all(CellValue::is_empty) {
            continue;
        }
        transformed.push_row(cleaned);
    }

    let removed = initial_rows - transformed.row_count();
    if removed > 0 {
        info!("  丢弃了 {} 个完全为空的行", removed);
    }
    info!("✓ 清洗完成，{} 行进入暂存", transformed.row_count());

    transformed
}

/// 单元格级清洗：文本标准化，数字保持原样（NaN 视为空）
fn normalize_to_cell(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Text(_) | CellValue::Empty => {
            let cleaned = normalize_cell(cell);
            if cleaned.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(cleaned)
            }
        }
        CellValue::Number(n) if n.is_nan() => CellValue::Empty,
        CellValue::Number(n) => CellValue::Number(*n),
    }
}

/// 把清洗后的数据写入暂存工作表（整表覆盖）
pub async fn load_staging_data(
    store: &dyn SheetStore,
    table: &Table,
    config: &Config,
) -> Result<()> {
    info!("📤 正在写入 '{}' 工作表...", config.staging_worksheet);

    store
        .overwrite(
            &config.staging_worksheet,
            table,
            table.row_count() + ROW_HEADROOM,
            table.column_count() + STAGING_COL_HEADROOM,
        )
        .await
        .with_context(|| format!("无法写入暂存工作表 '{}'", config.staging_worksheet))?;

    info!("✓ 已写入 {} 行到暂存表", table.row_count());
    Ok(())
}

/// 构造处理结果表：在暂存表之上追加三个空的结果列
///
/// 列顺序即下游消费顺序，不要调整
pub fn prepare_processed_table(staging: &Table) -> Table {
    info!("🧱 正在构造处理结果表结构...");

    let mut processed = staging.clone();
    processed.add_column(models::SENTIMENT_COLUMN, CellValue::Empty);
    processed.add_column(models::SUMMARY_COLUMN, CellValue::Empty);
    processed.add_column(models::ACTION_COLUMN, CellValue::Empty);

    info!("✓ 处理结果表共 {} 列", processed.column_count());
    processed
}

/// LLM 富集：把批量分析结果按行序写入三个结果列
///
/// 评论列不存在时告警并跳过（容忍的降级路径，不是失败）
pub async fn enrich_with_sentiment(
    table: &mut Table,
    analyzer: &BatchAnalyzer,
    review_column: &str,
) -> Result<()> {
    info!("\n{}", "=".repeat(60));
    info!("开始 LLM 情感分析");
    info!("{}", "=".repeat(60));

    let Some(reviews) = table.column_text(review_column) else {
        warn!("⚠️ 找不到评论列 '{}'", review_column);
        warn!("  现有列: {:?}", table.headers());
        warn!("  跳过 LLM 分析...");
        return Ok(());
    };

    info!("待分析评论 {} 条...", reviews.len());
    let results = analyzer.analyze_all(&reviews).await;

    let sentiments = results
        .iter()
        .map(|r| text_or_empty(r.sentiment.as_str()))
        .collect();
    let summaries = results
        .iter()
        .map(|r| text_or_empty(&r.summary))
        .collect();
    let actions = results
        .iter()
        .map(|r| text_or_empty(r.action_needed.as_str()))
        .collect();

    for (column, values) in [
        (models::SENTIMENT_COLUMN, sentiments),
        (models::SUMMARY_COLUMN, summaries),
        (models::ACTION_COLUMN, actions),
    ] {
        if !table.set_column(column, values) {
            anyhow::bail!("结果列 '{}' 写回失败", column);
        }
    }

    let count_of =
        |target: Sentiment| results.iter().filter(|r| r.sentiment == target).count();
    info!("✓ LLM 分析完成");
    info!("  - Positive: {}", count_of(Sentiment::Positive));
    info!("  - Negative: {}", count_of(Sentiment::Negative));
    info!("  - Neutral: {}", count_of(Sentiment::Neutral));

    Ok(())
}

fn text_or_empty(value: &str) -> CellValue {
    if value.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(value.to_string())
    }
}

/// 把最终结果写入处理工作表（整表覆盖）
pub async fn load_processed_data(
    store: &dyn SheetStore,
    table: &Table,
    config: &Config,
) -> Result<()> {
    info!("📤 正在写入 '{}' 工作表...", config.processed_worksheet);

    store
        .overwrite(
            &config.processed_worksheet,
            table,
            table.row_count() + ROW_HEADROOM,
            table.column_count() + PROCESSED_COL_HEADROOM,
        )
        .await
        .with_context(|| format!("无法写入处理工作表 '{}'", config.processed_worksheet))?;

    info!("✓ 已写入 {} 行到处理表", table.row_count());
    Ok(())
}

/// 运行完整的 ETL 流水线，返回最终的处理结果表
pub async fn run_etl_pipeline(
    store: &dyn SheetStore,
    analyzer: &BatchAnalyzer,
    config: &Config,
    run_llm_analysis: bool,
) -> Result<Table> {
    info!("{}", "=".repeat(60));
    info!("启动 ETL 流水线");
    info!("{}", "=".repeat(60));

    // ========== 提取 ==========
    let raw = extract_raw_data(store, config).await?;

    // ========== 清洗 ==========
    let staging = transform_staging_data(&raw);

    // ========== 写入暂存 ==========
    load_staging_data(store, &staging, config).await?;

    // ========== 构造处理表 ==========
    let mut processed = prepare_processed_table(&staging);

    // ========== LLM 富集（可选） ==========
    if run_llm_analysis {
        enrich_with_sentiment(&mut processed, analyzer, &config.review_column).await?;
    }

    // ========== 写入处理表 ==========
    load_processed_data(store, &processed, config).await?;

    info!("\n{}", "=".repeat(60));
    info!("✅ ETL 流水线执行完成");
    info!("{}", "=".repeat(60));

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messy_table() -> Table {
        let mut table = Table::new(vec![
            "Class Name".into(),
            "Title".into(),
            "Review Text".into(),
        ]);
        table.push_row(vec![
            CellValue::Text("Dress".into()),
            CellValue::Text("  Great   buy ".into()),
            CellValue::Text("Love\nit".into()),
        ]);
        // 完全为空的行
        table.push_row(vec![
            CellValue::Empty,
            CellValue::Text("   ".into()),
            CellValue::Empty,
        ]);
        // 只有一列非空的行要保留
        table.push_row(vec![
            CellValue::Text("Pants".into()),
            CellValue::Empty,
            CellValue::Empty,
        ]);
        table
    }

    #[test]
    fn test_transform_drops_only_fully_empty_rows() {
        let raw = messy_table();
        let staging = transform_staging_data(&raw);

        // 行数只减不增
        assert!(staging.row_count() <= raw.row_count());
        assert_eq!(staging.row_count(), 2);

        // 文本已标准化
        assert_eq!(
            staging.rows()[0][1],
            CellValue::Text("Great buy".into())
        );
        assert_eq!(staging.rows()[0][2], CellValue::Text("Love it".into()));

        // 部分为空的行保留
        assert_eq!(staging.rows()[1][0], CellValue::Text("Pants".into()));
    }

    #[test]
    fn test_transform_keeps_numbers_untouched() {
        let mut raw = Table::new(vec!["Rating".into(), "Review Text".into()]);
        raw.push_row(vec![
            CellValue::Number(4.5),
            CellValue::Text(" ok ".into()),
        ]);
        raw.push_row(vec![CellValue::Number(f64::NAN), CellValue::Empty]);

        let staging = transform_staging_data(&raw);

        assert_eq!(staging.rows()[0][0], CellValue::Number(4.5));
        // NaN 行的两列都为空，整行被丢弃
        assert_eq!(staging.row_count(), 1);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let once = transform_staging_data(&messy_table());
        let twice = transform_staging_data(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prepare_processed_appends_three_empty_columns() {
        let staging = transform_staging_data(&messy_table());
        let processed = prepare_processed_table(&staging);

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
        for row in processed.rows() {
            assert_eq!(row[3], CellValue::Empty);
            assert_eq!(row[4], CellValue::Empty);
            assert_eq!(row[5], CellValue::Empty);
        }
    }
}
