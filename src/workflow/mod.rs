//! 流程层（Workflow Layer）
//!
//! 定义"一批评论"的完整处理流程，只依赖业务能力（services），
//! 不持有任何存储资源

pub mod batch_analyzer;

pub use batch_analyzer::{determine_action_needed, BatchAnalyzer};
