//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责阶段编排和应用生命周期，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主结构
//! - 管理应用生命周期（初始化、运行）
//! - 持有存储客户端与分析器资源
//! - 产出报表、图表、CSV
//! - 输出全局统计信息
//!
//! ### `pipeline` - ETL 流水线
//! - 提取 / 清洗 / 写入的阶段函数
//! - LLM 富集的降级路径（评论列缺失时跳过）
//! - 整表覆盖带来的幂等性
//!
//! ## 层次关系
//!
//! ```text
//! app (一次完整运行)
//!     ↓
//! pipeline (ETL 阶段编排)
//!     ↓
//! workflow::BatchAnalyzer (处理 Vec<评论>)
//!     ↓
//! services (能力层：sentiment / retry / chart / csv)
//!     ↓
//! store (基础设施：SheetStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：app 管生命周期，pipeline 管阶段
//! 2. **资源隔离**：只有编排层持有存储客户端
//! 3. **向下依赖**：编排层 → workflow → services → store
//! 4. **无业务逻辑**：只做调度和统计，不做具体判断

pub mod app;
pub mod pipeline;

// 重新导出主要类型
pub use app::App;
pub use pipeline::{
    extract_raw_data, load_processed_data, load_staging_data, prepare_processed_table,
    run_etl_pipeline, transform_staging_data,
};
