//! Google Sheets API 客户端
//!
//! 封装 Sheets v4 REST 接口中用到的几个操作：整表读取、
//! 清空、写入、按需建表、保护状态查询。
//! 鉴权使用配置中的访问令牌；令牌如何获取不在本模块职责内。

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::Table;
use crate::store::SheetStore;

/// Sheets API 客户端
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    spreadsheet_id: String,
}

// ========== 接口响应结构 ==========

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetEntry {
    properties: SheetProperties,
    #[serde(default)]
    protected_ranges: Vec<ProtectedRange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    title: String,
}

/// 只关心保护范围是否存在，不关心其内容
#[derive(Debug, Deserialize)]
struct ProtectedRange {}

impl GoogleSheetsClient {
    /// 创建新的客户端
    ///
    /// 表格 ID 或访问令牌缺失时立刻失败，而不是等到第一次请求
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.spreadsheet_id.is_empty() {
            return Err(AppError::missing_value("GOOGLE_SHEET_ID"));
        }
        if config.sheets_access_token.is_empty() {
            return Err(AppError::missing_value("SHEETS_ACCESS_TOKEN"));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.sheets_api_base_url.trim_end_matches('/').to_string(),
            token: config.sheets_access_token.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
        })
    }

    fn spreadsheet_url(&self, suffix: &str) -> String {
        format!(
            "{}/spreadsheets/{}{}",
            self.base_url, self.spreadsheet_id, suffix
        )
    }

    /// 统一的响应检查：非 2xx 状态一律转成带响应体的错误
    async fn check_response(
        response: reqwest::Response,
        endpoint: &str,
    ) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::bad_response(endpoint, status.as_u16(), body))
    }

    /// 拉取所有工作表的元信息（标题、保护范围）
    async fn fetch_sheet_entries(&self) -> Result<Vec<SheetEntry>> {
        let url = self
            .spreadsheet_url("?fields=sheets(properties(title),protectedRanges(protectedRangeId))");
        debug!("拉取表格元信息: {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(AppError::from)?;

        let meta: SpreadsheetMeta = Self::check_response(response, &url)
            .await?
            .json()
            .await
            .map_err(AppError::from)?;

        Ok(meta.sheets)
    }

    /// 查找工作表；不存在时返回 None
    async fn find_sheet(&self, worksheet: &str) -> Result<Option<SheetEntry>> {
        let entries = self.fetch_sheet_entries().await?;
        Ok(entries.into_iter().find(|e| e.properties.title == worksheet))
    }

    /// 读取工作表的全部行
    async fn read_rows(&self, worksheet: &str) -> Result<Vec<Vec<JsonValue>>> {
        let url = self.spreadsheet_url(&format!("/values/{}", worksheet));

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(AppError::from)?;

        let range: ValueRange = Self::check_response(response, &url)
            .await?
            .json()
            .await
            .map_err(AppError::from)?;

        Ok(range.values)
    }

    /// 清空工作表内容
    async fn clear(&self, worksheet: &str) -> Result<()> {
        let url = self.spreadsheet_url(&format!("/values/{}:clear", worksheet));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({}))
            .send()
            .await
            .map_err(AppError::from)?;

        Self::check_response(response, &url).await?;
        Ok(())
    }

    /// 从左上角起写入行数据
    async fn write_rows(&self, worksheet: &str, values: Vec<Vec<JsonValue>>) -> Result<()> {
        let url = self.spreadsheet_url(&format!(
            "/values/{}!A1?valueInputOption=RAW",
            worksheet
        ));

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": values }))
            .send()
            .await
            .map_err(AppError::from)?;

        Self::check_response(response, &url).await?;
        Ok(())
    }

    /// 新建工作表
    async fn create_sheet(&self, title: &str, rows: usize, cols: usize) -> Result<()> {
        let url = self.spreadsheet_url(":batchUpdate");
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": rows.max(1),
                            "columnCount": cols.max(1),
                        }
                    }
                }
            }]
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(AppError::from)?;

        Self::check_response(response, &url).await?;
        info!("✓ 已创建工作表 '{}'", title);
        Ok(())
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn read_all(&self, worksheet: &str) -> Result<Table> {
        if self.find_sheet(worksheet).await?.is_none() {
            return Err(AppError::worksheet_not_found(worksheet).into());
        }

        let rows = self
            .read_rows(worksheet)
            .await
            .with_context(|| format!("无法读取工作表 '{}'", worksheet))?;

        Ok(Table::from_value_rows(&rows))
    }

    async fn overwrite(
        &self,
        worksheet: &str,
        table: &Table,
        row_capacity: usize,
        col_capacity: usize,
    ) -> Result<()> {
        if self.find_sheet(worksheet).await?.is_none() {
            self.create_sheet(worksheet, row_capacity, col_capacity)
                .await
                .with_context(|| format!("无法创建工作表 '{}'", worksheet))?;
        } else {
            debug!("工作表 '{}' 已存在", worksheet);
        }

        self.clear(worksheet)
            .await
            .with_context(|| format!("无法清空工作表 '{}'", worksheet))?;

        self.write_rows(worksheet, table.to_value_rows())
            .await
            .with_context(|| format!("无法写入工作表 '{}'", worksheet))?;

        debug!("✓ 已写入 {} 行到工作表 '{}'", table.row_count(), worksheet);
        Ok(())
    }

    async fn is_protected(&self, worksheet: &str) -> Result<bool> {
        let entry = self
            .find_sheet(worksheet)
            .await?
            .ok_or_else(|| AppError::worksheet_not_found(worksheet))?;

        Ok(!entry.protected_ranges.is_empty())
    }
}
