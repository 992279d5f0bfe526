// ==========================================
// 物料目录导入 - 导入API
// ==========================================
// 职责: 封装目录导入（导入 / 预览 / 导入偏好设置）
// 外部协作方: 调用方提供人工解决通道与进度回调
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigManager};
use crate::db::{default_db_path, init_schema, open_sqlite_connection};
use crate::domain::import::{
    ConflictItem, ImportOutcome, ImportReport, NewValues, RowReport, SkipBreakdown,
};
use crate::domain::taxonomy::TaxonomyEntry;
use crate::domain::types::ResolutionStrategy;
use crate::importer::{
    CatalogImporter, CsvParser, ImportPlan, OperatorResolver, ProgressSink,
};
use crate::repository::SqliteCatalogStore;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};

type SqliteImporter = CatalogImporter<SqliteCatalogStore, ConfigManager>;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 运行ID
    pub run_id: String,
    /// 实际采用的解决策略
    pub strategy: ResolutionStrategy,
    /// 新增物料数量
    pub inserted: usize,
    /// 更新物料数量
    pub updated: usize,
    /// 跳过数量（无变更 + 失败）
    pub skipped: usize,
    /// 跳过明细（无变更 / 校验失败 / 写入失败）
    pub skip_breakdown: SkipBreakdown,
    /// 检测到的冲突数量
    pub conflicts: usize,
    /// 执行前新建的分类
    pub created_categories: Vec<TaxonomyEntry>,
    /// 执行前新建的供应商
    pub created_suppliers: Vec<TaxonomyEntry>,
    /// 逐行结果
    pub rows: Vec<RowReport>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: u64,
}

impl From<ImportReport> for ImportApiResponse {
    fn from(report: ImportReport) -> Self {
        let skip_breakdown = report.skip_breakdown();
        Self {
            run_id: report.run_id,
            strategy: report.strategy,
            inserted: report.stats.inserted,
            updated: report.stats.updated,
            skipped: report.stats.skipped,
            skip_breakdown,
            conflicts: report.conflicts,
            created_categories: report.created.categories,
            created_suppliers: report.created.suppliers,
            rows: report.rows,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

/// 导入预览响应（不写入）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreviewResponse {
    pub total_rows: usize,
    pub discarded_rows: usize,
    pub matched_rows: usize,
    pub new_rows: usize,
    pub strategy: ResolutionStrategy,
    pub conflicts: Vec<ConflictItem>,
    pub new_values: NewValues,
}

impl From<ImportPlan> for ImportPreviewResponse {
    fn from(plan: ImportPlan) -> Self {
        Self {
            total_rows: plan.rows.len(),
            discarded_rows: plan.discarded_rows,
            matched_rows: plan.matched_rows,
            new_rows: plan.new_rows(),
            strategy: plan.strategy,
            conflicts: plan.conflicts.conflicts,
            new_values: plan.conflicts.new_values,
        }
    }
}

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 使用默认数据库路径（MATERIALS_CATALOG_DB 或系统数据目录）
    pub fn with_default_path() -> Self {
        Self::new(default_db_path())
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 打开连接并确保 schema 已初始化
    fn open_connection(&self) -> ApiResult<Arc<Mutex<Connection>>> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)
            .map_err(|e| ApiError::DatabaseError(format!("初始化数据库失败: {}", e)))?;
        Ok(Arc::new(Mutex::new(conn)))
    }

    /// 创建导入器（存储与配置共享同一连接）
    fn create_importer(&self) -> ApiResult<SqliteImporter> {
        let conn = self.open_connection()?;
        let store = SqliteCatalogStore::from_connection(conn.clone());
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;

        Ok(CatalogImporter::new(store, config))
    }

    fn check_file(file_path: &str) -> ApiResult<()> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }
        Ok(())
    }

    fn into_response(outcome: ImportOutcome) -> ApiResult<ImportApiResponse> {
        match outcome {
            ImportOutcome::Completed(report) => Ok(ImportApiResponse::from(report)),
            ImportOutcome::Cancelled { strategy } => {
                tracing::info!(strategy = %strategy, "导入已被操作员取消");
                Err(ApiError::Cancelled)
            }
        }
    }

    /// 导入物料目录
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv / .xlsx / .xls）
    /// - resolver: 人工解决通道
    /// - progress: 进度回调（0-100）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入结果
    /// - Err(ApiError::Cancelled): 操作员取消
    /// - Err(ApiError): 终止性错误
    pub async fn import_catalog(
        &self,
        file_path: &str,
        resolver: &dyn OperatorResolver,
        progress: &dyn ProgressSink,
    ) -> ApiResult<ImportApiResponse> {
        Self::check_file(file_path)?;
        let importer = self.create_importer()?;
        let outcome = importer
            .run(Path::new(file_path), resolver, progress)
            .await?;
        Self::into_response(outcome)
    }

    /// 导入 CSV 文本（上传内容）
    pub async fn import_csv_content(
        &self,
        content: &str,
        resolver: &dyn OperatorResolver,
        progress: &dyn ProgressSink,
    ) -> ApiResult<ImportApiResponse> {
        let raw_rows = CsvParser.parse_str(content)?;
        let importer = self.create_importer()?;
        let outcome = importer.run_rows(raw_rows, resolver, progress).await?;
        Self::into_response(outcome)
    }

    /// 预览导入（解析 + 冲突检测，不写入）
    pub async fn preview_import(&self, file_path: &str) -> ApiResult<ImportPreviewResponse> {
        Self::check_file(file_path)?;
        let importer = self.create_importer()?;
        let plan = importer.prepare(Path::new(file_path)).await?;
        Ok(ImportPreviewResponse::from(plan))
    }

    /// 设置导入偏好（global scope）
    pub fn set_import_preference(&self, key: &str, value: &str) -> ApiResult<()> {
        const KNOWN_KEYS: [&str; 5] = [
            config_keys::EXCLUSIVE_DEFAULT,
            config_keys::INTERACTIVE_CONFIRMATION,
            config_keys::CONFIRM_DIRECT_IMPORT,
            config_keys::NUMERIC_EPSILON,
            config_keys::MONETARY_DECIMALS,
        ];
        if !KNOWN_KEYS.contains(&key) {
            return Err(ApiError::InvalidInput(format!("未知的导入配置项: {}", key)));
        }

        let manager = ConfigManager::from_connection(self.open_connection()?)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        manager
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        tracing::info!(key, value, "导入配置已更新");
        Ok(())
    }
}
