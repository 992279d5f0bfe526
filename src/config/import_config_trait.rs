// ==========================================
// 物料目录导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 是否启用“同名唯一默认”策略
    ///
    /// # 默认值
    /// - true
    async fn get_exclusive_default(&self) -> ConfigResult<bool>;

    /// 出现冲突/新值时是否交由人工确认
    ///
    /// # 默认值
    /// - true（false 时走自动策略）
    async fn get_interactive_confirmation(&self) -> ConfigResult<bool>;

    /// 无冲突时是否仍做一次是/否确认
    ///
    /// # 默认值
    /// - false
    async fn get_confirm_direct_import(&self) -> ConfigResult<bool>;

    /// 数值比较容差（吸收成本计算的浮点噪声）
    ///
    /// # 默认值
    /// - 1e-6
    async fn get_numeric_epsilon(&self) -> ConfigResult<f64>;

    /// 金额字段保留小数位
    ///
    /// # 默认值
    /// - 0（取整到元）
    async fn get_monetary_decimals(&self) -> ConfigResult<u32>;
}
