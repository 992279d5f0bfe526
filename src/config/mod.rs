// ==========================================
// 物料目录导入 - 配置层
// ==========================================
// 职责: 操作员偏好读取（config_kv 表）+ 每次运行的配置快照
// ==========================================

pub mod config_manager;
pub mod import_config;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::ImportConfig;
pub use import_config_trait::{ConfigResult, ImportConfigReader};
