//! 表格存储层（基础设施层）
//!
//! ## 职责
//!
//! 持有对外部表格存储的读写能力，只暴露流水线需要的三个操作：
//! 整表读取、整表覆盖写入、写保护检查。
//!
//! 流水线只依赖 [`SheetStore`] trait，不感知具体实现：
//! - `GoogleSheetsClient` - 生产实现，走 Sheets v4 REST 接口
//! - `InMemorySheetStore` - 内存实现，测试与本地演练用

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Table;

pub mod memory;
pub mod sheets_client;

pub use memory::InMemorySheetStore;
pub use sheets_client::GoogleSheetsClient;

/// 表格存储的抽象
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// 读取整个工作表（首行视为表头）
    async fn read_all(&self, worksheet: &str) -> Result<Table>;

    /// 整表覆盖写入
    ///
    /// 工作表不存在时按给定容量创建；存在时先清空再写入
    /// 表头与数据行（从左上角起）。
    async fn overwrite(
        &self,
        worksheet: &str,
        table: &Table,
        row_capacity: usize,
        col_capacity: usize,
    ) -> Result<()>;

    /// 工作表是否受写保护
    async fn is_protected(&self, worksheet: &str) -> Result<bool>;
}
