// ==========================================
// 餐饮后台 - 物料目录导入对账引擎 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 供应商价目表导入 + 目录归属冲突解决（人工最终控制权）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析、匹配、冲突检测、写入
pub mod importer;

// 配置层 - 导入偏好
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CanonicalUnit, ResolutionStrategy, TaxonomyKind};

// 领域实体
pub use domain::{
    ConflictItem, IdentityKey, ImportOutcome, ImportReport, ImportRow, ImportStats,
    MaterialPatch, MaterialRecord, NewMaterial, OperatorDecision, ResolutionOverride,
    TaxonomyChoice, TaxonomyEntry,
};

// 导入器
pub use importer::{
    select_current, CatalogImporter, ImportError, ImportResult, OperatorResolver, ProgressSink,
};

// 存储
pub use repository::{CatalogStore, SqliteCatalogStore};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物料目录导入对账引擎";
