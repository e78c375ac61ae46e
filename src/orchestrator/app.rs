//! 应用主结构 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整的流水线运行：
//!
//! 1. **应用初始化**：装配表格存储客户端、LLM 分析器、报表输出器
//! 2. **流水线执行**：委托 `pipeline` 完成 ETL 与 LLM 富集
//! 3. **报表产出**：聚合统计 → 控制台摘要 → 图表 → CSV
//! 4. **全局统计**：输出最终的运行结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有存储客户端与分析器的模块
//! - **向下委托**：不处理单条评论的细节
//! - **快速失败**：关键配置缺失在初始化阶段立刻报错

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::analysis::{build_report, log_report};
use crate::config::Config;
use crate::orchestrator::pipeline::run_etl_pipeline;
use crate::services::{ChartRenderer, CsvExporter};
use crate::store::GoogleSheetsClient;
use crate::workflow::BatchAnalyzer;

/// 应用主结构
pub struct App {
    config: Config,
    store: GoogleSheetsClient,
    analyzer: BatchAnalyzer,
    chart_renderer: ChartRenderer,
    csv_exporter: CsvExporter,
}

impl App {
    /// 初始化应用
    ///
    /// 表格 ID、访问令牌、LLM 密钥任一缺失都会在这里失败，
    /// 不会等到流水线跑到一半
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let store = GoogleSheetsClient::new(&config)?;
        let analyzer = BatchAnalyzer::new(&config)?;
        let chart_renderer = ChartRenderer::new(&config.chart_output_dir);
        let csv_exporter = CsvExporter::new(&config.csv_output_file);

        Ok(Self {
            config,
            store,
            analyzer,
            chart_renderer,
            csv_exporter,
        })
    }

    /// 运行应用主逻辑：ETL → 报表 → 图表 → CSV
    pub async fn run(&self) -> Result<()> {
        // 完整流水线（始终开启 LLM 富集）
        let processed =
            run_etl_pipeline(&self.store, &self.analyzer, &self.config, true).await?;

        // 聚合报表
        let report = build_report(
            &processed,
            &self.config.class_column,
            &self.config.sentiment_column,
        )?;
        log_report(&report);

        // 输出产物
        let chart_files = self.chart_renderer.render_all(&report)?;
        let csv_file = self.csv_exporter.export(&report)?;

        print_final_stats(&self.config, processed.row_count(), &chart_files, &csv_file);
        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 启动自动化评论分析流水线");
    info!("📄 工作表: {} → {} → {}",
        config.raw_worksheet, config.staging_worksheet, config.processed_worksheet
    );
    info!("🤖 模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

fn print_final_stats(
    config: &Config,
    processed_rows: usize,
    chart_files: &[PathBuf],
    csv_file: &Path,
) {
    info!("\n{}", "=".repeat(60));
    info!("🎉 流水线执行成功!");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 共处理 {} 条评论", processed_rows);
    info!("📈 生成图表 {} 张", chart_files.len());
    info!("\n生成的文件:");
    for file in chart_files {
        info!("  - {}", file.display());
    }
    info!("  - {}", csv_file.display());
    info!(
        "\n💡 请在 Google 表格中查看更新后的 '{}' 工作表",
        config.processed_worksheet
    );
}
