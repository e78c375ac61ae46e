use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models;

/// 默认配置文件路径（存在则优先加载，环境变量仍可逐项覆盖）
pub const DEFAULT_CONFIG_FILE: &str = "review_analysis.toml";

/// 程序配置文件
///
/// 配置对象的生命周期就是一次流水线运行：在 main 中构造一次，
/// 按引用传给各组件的构造函数，不存在进程级的可变单例。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 表格存储配置 ---
    /// Google Sheets 表格 ID
    pub spreadsheet_id: String,
    /// Sheets API 基础地址
    pub sheets_api_base_url: String,
    /// Sheets API 访问令牌
    pub sheets_access_token: String,
    /// 原始数据工作表名
    pub raw_worksheet: String,
    /// 暂存工作表名
    pub staging_worksheet: String,
    /// 处理结果工作表名
    pub processed_worksheet: String,
    // --- 列名约定 ---
    /// 评论文本所在列
    pub review_column: String,
    /// 商品类别所在列
    pub class_column: String,
    /// 情感标签所在列（聚合统计读取）
    pub sentiment_column: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单条评论的最大尝试次数（含首次）
    pub llm_max_retries: u32,
    /// 两次尝试之间的固定等待秒数
    pub llm_retry_delay_secs: u64,
    /// 每处理多少条评论暂停一次（粗粒度限速）
    pub pacing_interval: usize,
    /// 限速暂停时长（毫秒）
    pub pacing_delay_ms: u64,
    // --- 输出 ---
    /// 图表输出目录
    pub chart_output_dir: String,
    /// 明细统计 CSV 输出路径
    pub csv_output_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheets_api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            sheets_access_token: String::new(),
            raw_worksheet: "raw_data".to_string(),
            staging_worksheet: "staging".to_string(),
            processed_worksheet: "processed".to_string(),
            review_column: "Review Text".to_string(),
            class_column: "Class Name".to_string(),
            sentiment_column: models::SENTIMENT_COLUMN.to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama-3.3-70b-versatile".to_string(),
            llm_max_retries: 3,
            llm_retry_delay_secs: 1,
            pacing_interval: 20,
            pacing_delay_ms: 500,
            chart_output_dir: "visualizations".to_string(),
            csv_output_file: "sentiment_analysis_report.csv".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 基准值来自配置文件（存在时）或内置默认值，逐项被环境变量覆盖
    pub fn from_env() -> Self {
        let default = Self::load_file_or_default();
        Self {
            spreadsheet_id: std::env::var("GOOGLE_SHEET_ID").unwrap_or(default.spreadsheet_id),
            sheets_api_base_url: std::env::var("SHEETS_API_BASE_URL").unwrap_or(default.sheets_api_base_url),
            sheets_access_token: std::env::var("SHEETS_ACCESS_TOKEN").unwrap_or(default.sheets_access_token),
            raw_worksheet: std::env::var("RAW_WORKSHEET").unwrap_or(default.raw_worksheet),
            staging_worksheet: std::env::var("STAGING_WORKSHEET").unwrap_or(default.staging_worksheet),
            processed_worksheet: std::env::var("PROCESSED_WORKSHEET").unwrap_or(default.processed_worksheet),
            review_column: std::env::var("REVIEW_COLUMN").unwrap_or(default.review_column),
            class_column: std::env::var("CLASS_COLUMN").unwrap_or(default.class_column),
            sentiment_column: default.sentiment_column,
            llm_api_key: std::env::var("LLM_API_KEY").or_else(|_| std::env::var("GROQ_API_KEY")).unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_retries: std::env::var("LLM_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_retries),
            llm_retry_delay_secs: default.llm_retry_delay_secs,
            pacing_interval: default.pacing_interval,
            pacing_delay_ms: default.pacing_delay_ms,
            chart_output_dir: std::env::var("CHART_OUTPUT_DIR").unwrap_or(default.chart_output_dir),
            csv_output_file: std::env::var("CSV_OUTPUT_FILE").unwrap_or(default.csv_output_file),
        }
    }

    /// 从 TOML 配置文件加载
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(ConfigError::FileReadFailed {
                path: path.to_string(),
                source: Box::new(e),
            })
        })?;

        toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::FileParseFailed {
                path: path.to_string(),
                source: Box::new(e),
            })
        })
    }

    /// 配置文件存在则加载，否则使用内置默认值
    fn load_file_or_default() -> Self {
        if !std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::default();
        }

        match Self::from_file(DEFAULT_CONFIG_FILE) {
            Ok(config) => {
                tracing::debug!("已加载配置文件: {}", DEFAULT_CONFIG_FILE);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件加载失败，使用默认配置: {}", e);
                Self::default()
            }
        }
    }
}
