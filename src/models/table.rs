//! 表格数据模型
//!
//! 把工作表的内容表示为"有序表头 + 按行排列的单元格"。
//! 列顺序在整条流水线中保持不变，行在读入时按表头宽度补齐/截断。

use serde_json::Value as JsonValue;

/// 单元格的标量值
///
/// 与表格存储交换的 JSON 标量一一对应：空值、文本、数字。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 空单元格
    Empty,
    /// 文本
    Text(String),
    /// 数字
    Number(f64),
}

impl CellValue {
    /// 从 JSON 标量构造单元格
    pub fn from_json(value: &JsonValue) -> CellValue {
        match value {
            JsonValue::Null => CellValue::Empty,
            JsonValue::String(s) if s.is_empty() => CellValue::Empty,
            JsonValue::String(s) => CellValue::Text(s.clone()),
            JsonValue::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Empty),
            JsonValue::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// 转成写回存储用的 JSON 标量（空值写为空串）
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Empty => JsonValue::String(String::new()),
            CellValue::Text(s) => JsonValue::String(s.clone()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(String::new())),
        }
    }

    /// 单元格的文本形式（空值、NaN 一律为空串）
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.is_nan() => String::new(),
            CellValue::Number(n) => format_number(*n),
        }
    }

    /// 是否为空（空值、空文本、NaN）
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => n.is_nan(),
        }
    }
}

/// 数字的文本形式：整数不带小数点
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 内存中的一张表：有序表头 + 数据行
///
/// 行内单元格与表头一一对应；`push_row` 会把过短的行补齐、
/// 过长的行截断，保证这一不变量。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 按表头创建空表
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// 从"首行表头 + 数据行"的 JSON 行列表构造
    pub fn from_value_rows(values: &[Vec<JsonValue>]) -> Table {
        let Some((header_row, data_rows)) = values.split_first() else {
            return Table::default();
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|v| CellValue::from_json(v).to_text())
            .collect();

        let mut table = Table::new(headers);
        for row in data_rows {
            table.push_row(row.iter().map(CellValue::from_json).collect());
        }
        table
    }

    /// 转成"首行表头 + 数据行"的 JSON 行列表（写回存储用）
    pub fn to_value_rows(&self) -> Vec<Vec<JsonValue>> {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        rows.push(
            self.headers
                .iter()
                .map(|h| JsonValue::String(h.clone()))
                .collect(),
        );
        for row in &self.rows {
            rows.push(row.iter().map(CellValue::to_json).collect());
        }
        rows
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// 列名对应的下标
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// 追加一行，按表头宽度补齐/截断
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(cells);
    }

    /// 在表尾追加一列，所有已有行填入默认值
    pub fn add_column(&mut self, name: &str, default: CellValue) {
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(default.clone());
        }
    }

    /// 读取整列的文本形式；列不存在时返回 None
    pub fn column_text(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].to_text()).collect())
    }

    /// 整列覆盖写入；列不存在或长度不符时返回 false
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        if values.len() != self.rows.len() {
            return false;
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        true
    }
}
