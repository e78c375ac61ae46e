//! 统计分析层
//!
//! 与流水线解耦的纯计算：把处理完成的表格聚合成报表

pub mod report;

pub use report::{
    build_report, log_report, AnalysisReport, OverallSentiment, SentimentStat, TopClass,
};
