// ==========================================
// 物料目录导入 - 目录存储 Trait
// ==========================================
// 职责: 定义导入引擎对存储的最小依赖（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::material::{MaterialPatch, MaterialRecord, NewMaterial};
use crate::domain::taxonomy::TaxonomyEntry;
use crate::domain::types::TaxonomyKind;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogStore Trait
// ==========================================
// 实现者: SqliteCatalogStore（使用 rusqlite）
// 约定: 每个操作要么成功，要么返回错误
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 读取全部目录记录（含软删除记录，由调用方过滤）
    async fn list_all(&self) -> RepositoryResult<Vec<MaterialRecord>>;

    /// 插入新记录
    ///
    /// # 返回
    /// - Ok(String): 新记录 id
    async fn insert(&self, material: NewMaterial) -> RepositoryResult<String>;

    /// 按补丁更新记录
    ///
    /// # 返回
    /// - Err(MaterialNotFound): id 不存在或已软删除
    async fn update(&self, id: &str, patch: MaterialPatch) -> RepositoryResult<()>;

    /// 读取某一维度的全部条目
    async fn list_taxonomy(&self, kind: TaxonomyKind) -> RepositoryResult<Vec<TaxonomyEntry>>;

    /// 批量新建条目
    ///
    /// # 说明
    /// - 已存在（忽略大小写）的名称不重复创建
    /// - 返回每个请求名称对应的条目
    async fn create_taxonomy(
        &self,
        kind: TaxonomyKind,
        names: Vec<String>,
    ) -> RepositoryResult<Vec<TaxonomyEntry>>;
}
