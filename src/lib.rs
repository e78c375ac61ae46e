//! # Review Analysis
//!
//! 自动化评论分析流水线：从表格存储提取客户评论、清洗、
//! 调用 LLM 做情感分类与一句话摘要、写回结果，并产出
//! 聚合报表（控制台摘要、图表、CSV）
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Store）
//! - `store/` - 表格存储的读写能力，只暴露 SheetStore trait
//! - `GoogleSheetsClient` - 生产实现，`InMemorySheetStore` - 测试实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单项能力
//! - `SentimentService` - 单条评论的情感判断与摘要
//! - `RetryPolicy` - 固定间隔重试策略
//! - `ChartRenderer` / `CsvExporter` - 报表产物输出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一批评论"的完整处理流程
//! - `BatchAnalyzer` - 逐条分析 + 限速 + 跟进标记
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - ETL 阶段编排与幂等覆盖写入
//! - `orchestrator/app` - 应用生命周期与报表产出
//!
//! 统计聚合在 `analysis/`，与流水线解耦，纯计算。
//!
//! ## 模块结构

pub mod analysis;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use analysis::{build_report, AnalysisReport};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CellValue, Sentiment, Table};
pub use orchestrator::{run_etl_pipeline, App};
pub use services::SentimentService;
pub use store::{GoogleSheetsClient, InMemorySheetStore, SheetStore};
pub use workflow::BatchAnalyzer;
