// ==========================================
// 物料目录导入 - 导入配置快照
// ==========================================
// 每次运行开始时读取一次，显式传给执行器
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub exclusive_default: bool,
    pub interactive_confirmation: bool,
    pub confirm_direct_import: bool,
    pub numeric_epsilon: f64,
    pub monetary_decimals: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            exclusive_default: true,
            interactive_confirmation: true,
            confirm_direct_import: false,
            numeric_epsilon: 1e-6,
            monetary_decimals: 0,
        }
    }
}

impl ImportConfig {
    /// 从配置读取器加载快照
    pub async fn load<C>(reader: &C) -> ImportResult<Self>
    where
        C: ImportConfigReader + ?Sized,
    {
        fn read_err(key: &str, e: impl std::fmt::Display) -> ImportError {
            ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }
        }

        let exclusive_default = reader
            .get_exclusive_default()
            .await
            .map_err(|e| read_err("exclusive_default", e))?;
        let interactive_confirmation = reader
            .get_interactive_confirmation()
            .await
            .map_err(|e| read_err("interactive_confirmation", e))?;
        let confirm_direct_import = reader
            .get_confirm_direct_import()
            .await
            .map_err(|e| read_err("confirm_direct_import", e))?;
        let numeric_epsilon = reader
            .get_numeric_epsilon()
            .await
            .map_err(|e| read_err("numeric_epsilon", e))?;
        let monetary_decimals = reader
            .get_monetary_decimals()
            .await
            .map_err(|e| read_err("monetary_decimals", e))?;

        Ok(Self {
            exclusive_default,
            interactive_confirmation,
            confirm_direct_import,
            numeric_epsilon,
            monetary_decimals,
        })
    }

    /// 金额取整（按配置小数位）
    pub fn round_money(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.monetary_decimals as i32);
        (value * factor).round() / factor
    }

    /// 容差比较
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.numeric_epsilon
    }
}
