// ==========================================
// 物料目录导入 - 导入管道 Trait
// ==========================================
// 职责: 定义管道各阶段与外部协作方的接口（不包含实现）
// 外部协作方: 表格来源 / 人工解决通道 / 进度回调
// ==========================================

use crate::domain::import::{ImportRow, OperatorDecision};
use crate::importer::error::ImportResult;
use crate::importer::resolution::{ConfirmationRequest, ResolutionRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// RawRow - 文件解析产物
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,                // 原始文件行号（表头为第 1 行）
    pub cells: HashMap<String, String>,   // 表头 → 单元格文本
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 行记录列表（已跳过全空白行）
    /// - Err: 文件读取错误、格式错误
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 实现者: FieldMapper（表头别名表）
pub trait FieldMapper: Send + Sync {
    /// 将原始行映射为 ImportRow
    ///
    /// # 说明
    /// - 数值无法解析时置为 None，由执行器按行校验
    /// - 未识别的表头被忽略
    fn map_to_import_row(&self, row: &RawRow) -> ImportRow;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 清洗文本（TRIM + 折叠连续空白），空值返回 None
    fn clean_text(&self, value: &str) -> Option<String>;

    /// 解析数值（容忍货币符号、千分位、逗号小数）
    fn parse_number(&self, value: &str) -> Option<f64>;

    /// 解析布尔标记（yes/no/true/false/1/0/sí/x）
    fn parse_flag(&self, value: &str) -> Option<bool>;
}

// ==========================================
// OperatorResolver Trait
// ==========================================
// 用途: 人工解决通道（仅交互模式及直接模式确认时调用）
#[async_trait]
pub trait OperatorResolver: Send + Sync {
    /// 直接模式下的一次是/否确认
    async fn confirm_import(&self, request: &ConfirmationRequest) -> ImportResult<bool>;

    /// 展示冲突与新值，返回覆写表或取消
    async fn resolve_conflicts(&self, request: &ResolutionRequest)
        -> ImportResult<OperatorDecision>;
}

/// 无人值守时的解决通道：确认即通过，冲突一律取消
pub struct NoOperatorResolver;

#[async_trait]
impl OperatorResolver for NoOperatorResolver {
    async fn confirm_import(&self, _request: &ConfirmationRequest) -> ImportResult<bool> {
        Ok(true)
    }

    async fn resolve_conflicts(
        &self,
        _request: &ResolutionRequest,
    ) -> ImportResult<OperatorDecision> {
        Ok(OperatorDecision::Cancelled)
    }
}

// ==========================================
// ProgressSink Trait
// ==========================================
// 用途: 每处理一行回调一次 0-100 的整数进度
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// 不关心进度时使用
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn report(&self, _percent: u8) {}
}
