pub mod sentiment;
pub mod table;

pub use sentiment::{ActionNeeded, AnalyzedReview, ReviewAnalysis, Sentiment};
pub use table::{CellValue, Table};

/// 流水线追加的三个结果列，顺序即写入顺序（下游按此顺序消费）
pub const SENTIMENT_COLUMN: &str = "AI Sentiment";
pub const SUMMARY_COLUMN: &str = "AI Summary";
pub const ACTION_COLUMN: &str = "Action Needed?";
