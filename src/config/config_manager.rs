// ==========================================
// 物料目录导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_bool_or_default(&self, key: &str, default: bool) -> ConfigResult<bool> {
        let value = self.get_config_or_default(key, if default { "true" } else { "false" })?;
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Ok(true),
            "0" | "false" | "no" | "n" | "off" => Ok(false),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "布尔配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_exclusive_default(&self) -> ConfigResult<bool> {
        self.get_bool_or_default(config_keys::EXCLUSIVE_DEFAULT, true)
    }

    async fn get_interactive_confirmation(&self) -> ConfigResult<bool> {
        self.get_bool_or_default(config_keys::INTERACTIVE_CONFIRMATION, true)
    }

    async fn get_confirm_direct_import(&self) -> ConfigResult<bool> {
        self.get_bool_or_default(config_keys::CONFIRM_DIRECT_IMPORT, false)
    }

    async fn get_numeric_epsilon(&self) -> ConfigResult<f64> {
        let value = self.get_config_or_default(config_keys::NUMERIC_EPSILON, "0.000001")?;
        Ok(value
            .parse::<f64>()
            .ok()
            .filter(|v| *v >= 0.0)
            .unwrap_or(1e-6))
    }

    async fn get_monetary_decimals(&self) -> ConfigResult<u32> {
        let value = self.get_config_or_default(config_keys::MONETARY_DECIMALS, "0")?;
        Ok(value.parse::<u32>().ok().filter(|v| *v <= 6).unwrap_or(0))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const EXCLUSIVE_DEFAULT: &str = "import.exclusive_default";
    pub const INTERACTIVE_CONFIRMATION: &str = "import.interactive_confirmation";
    pub const CONFIRM_DIRECT_IMPORT: &str = "import.confirm_direct_import";
    pub const NUMERIC_EPSILON: &str = "import.numeric_epsilon";
    pub const MONETARY_DECIMALS: &str = "import.monetary_decimals";
}
