//! CSV 导出服务 - 业务能力层
//!
//! 把按类别的明细统计写成一个 CSV 文件

use std::path::PathBuf;

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::analysis::AnalysisReport;

/// CSV 中的一行明细
#[derive(Debug, Serialize)]
struct BreakdownRow<'a> {
    #[serde(rename = "Class Name")]
    class_name: &'a str,
    #[serde(rename = "AI Sentiment")]
    sentiment: &'a str,
    count: usize,
    total: usize,
    percentage: f64,
}

/// CSV 导出服务
pub struct CsvExporter {
    output_file: PathBuf,
}

impl CsvExporter {
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }

    /// 导出按类别的明细统计，返回输出文件路径
    pub fn export(&self, report: &AnalysisReport) -> Result<PathBuf> {
        let mut writer = Writer::from_path(&self.output_file)
            .with_context(|| format!("无法创建 CSV 文件: {}", self.output_file.display()))?;

        for stat in &report.by_class {
            writer.serialize(BreakdownRow {
                class_name: &stat.class_name,
                sentiment: stat.sentiment.as_str(),
                count: stat.count,
                total: stat.total,
                percentage: stat.percentage,
            })?;
        }

        writer.flush()?;
        info!("✓ 明细统计已导出到 '{}'", self.output_file.display());

        Ok(self.output_file.clone())
    }
}
