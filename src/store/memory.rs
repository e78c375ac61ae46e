//! 内存版表格存储
//!
//! 测试与本地演练用的 [`SheetStore`] 实现：工作表保存在进程内，
//! 覆盖写入语义与生产实现一致（容量参数被忽略）。

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::AppError;
use crate::models::Table;
use crate::store::SheetStore;

/// 进程内的表格存储
#[derive(Default)]
pub struct InMemorySheetStore {
    sheets: Mutex<HashMap<String, Table>>,
    protected: Mutex<HashSet<String>>,
}

impl InMemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一张工作表
    pub fn insert(&self, worksheet: &str, table: Table) {
        self.sheets
            .lock()
            .expect("锁未被污染")
            .insert(worksheet.to_string(), table);
    }

    /// 标记工作表为受保护
    pub fn mark_protected(&self, worksheet: &str) {
        self.protected
            .lock()
            .expect("锁未被污染")
            .insert(worksheet.to_string());
    }

    /// 取出工作表当前内容的快照
    pub fn snapshot(&self, worksheet: &str) -> Option<Table> {
        self.sheets
            .lock()
            .expect("锁未被污染")
            .get(worksheet)
            .cloned()
    }
}

#[async_trait]
impl SheetStore for InMemorySheetStore {
    async fn read_all(&self, worksheet: &str) -> Result<Table> {
        self.snapshot(worksheet)
            .ok_or_else(|| AppError::worksheet_not_found(worksheet).into())
    }

    async fn overwrite(
        &self,
        worksheet: &str,
        table: &Table,
        _row_capacity: usize,
        _col_capacity: usize,
    ) -> Result<()> {
        self.insert(worksheet, table.clone());
        Ok(())
    }

    async fn is_protected(&self, worksheet: &str) -> Result<bool> {
        Ok(self
            .protected
            .lock()
            .expect("锁未被污染")
            .contains(worksheet))
    }
}
