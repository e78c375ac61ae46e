use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 表格存储相关错误
    Sheet(SheetError),
    /// 统计分析错误
    Analysis(AnalysisError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Sheet(e) => write!(f, "表格存储错误: {}", e),
            AppError::Analysis(e) => write!(f, "统计分析错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Sheet(e) => Some(e),
            AppError::Analysis(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 表格存储相关错误
#[derive(Debug)]
pub enum SheetError {
    /// 工作表不存在
    WorksheetNotFound {
        name: String,
    },
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 接口返回错误响应
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::WorksheetNotFound { name } => {
                write!(f, "工作表不存在: {}", name)
            }
            SheetError::RequestFailed { endpoint, source } => {
                write!(f, "请求失败 ({}): {}", endpoint, source)
            }
            SheetError::BadResponse {
                endpoint,
                status,
                body,
            } => {
                write!(
                    f,
                    "接口返回错误响应 ({}): 状态码 {}, 内容: {}",
                    endpoint, status, body
                )
            }
        }
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 统计分析错误
#[derive(Debug)]
pub enum AnalysisError {
    /// 缺少必需的列
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MissingColumn { column, available } => {
                write!(
                    f,
                    "缺少必需的列 '{}'，现有列: {:?}",
                    column, available
                )
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 必需的配置值未设置
    MissingValue {
        var_name: String,
    },
    /// 配置文件读取失败
    FileReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingValue { var_name } => {
                write!(f, "必需的配置 {} 未设置", var_name)
            }
            ConfigError::FileReadFailed { path, source } => {
                write!(f, "配置文件读取失败 ({}): {}", path, source)
            }
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileReadFailed { source, .. }
            | ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// anyhow 已经为所有实现了 std::error::Error 的类型提供了自动转换

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_default();
        AppError::Sheet(SheetError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON解析失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建工作表不存在错误
    pub fn worksheet_not_found(name: impl Into<String>) -> Self {
        AppError::Sheet(SheetError::WorksheetNotFound { name: name.into() })
    }

    /// 创建接口错误响应错误
    pub fn bad_response(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        AppError::Sheet(SheetError::BadResponse {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        })
    }

    /// 创建缺少列错误
    pub fn missing_column(column: impl Into<String>, available: &[String]) -> Self {
        AppError::Analysis(AnalysisError::MissingColumn {
            column: column.into(),
            available: available.to_vec(),
        })
    }

    /// 创建缺少配置错误
    pub fn missing_value(var_name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::MissingValue {
            var_name: var_name.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
