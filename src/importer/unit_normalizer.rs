// ==========================================
// 物料目录导入 - 单位归一化
// ==========================================
// 职责: 自由文本单位 → (规范单位, 换算系数)
// 规则: 纯函数且总能返回；无法识别的单位按 (count, 1) 处理
// ==========================================

use crate::domain::types::CanonicalUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub unit: CanonicalUnit,
    pub factor: f64,
}

impl UnitConversion {
    const fn new(unit: CanonicalUnit, factor: f64) -> Self {
        Self { unit, factor }
    }

    /// 原始数量换算为规范单位数量
    pub fn apply(&self, raw_qty: f64) -> f64 {
        raw_qty * self.factor
    }
}

const FALLBACK: UnitConversion = UnitConversion::new(CanonicalUnit::Count, 1.0);

/// 单位别名归一（小写，去空白与尾部句点）
fn normalize_token(token: &str) -> String {
    token
        .trim()
        .trim_end_matches('.')
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// 单位归一化
pub fn normalize(token: &str) -> UnitConversion {
    use CanonicalUnit::{Count, Mass, Volume};

    match normalize_token(token).as_str() {
        // ===== 质量（基准: 克）=====
        "g" | "gr" | "grs" | "gram" | "grams" | "gramo" | "gramos" => {
            UnitConversion::new(Mass, 1.0)
        }
        "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" | "kilogramo"
        | "kilogramos" => UnitConversion::new(Mass, 1000.0),
        "mg" | "miligramo" | "miligramos" | "milligram" | "milligrams" => {
            UnitConversion::new(Mass, 0.001)
        }
        "lb" | "lbs" | "libra" | "libras" | "pound" | "pounds" => {
            UnitConversion::new(Mass, 453.592)
        }
        "oz" | "onza" | "onzas" | "ounce" | "ounces" => UnitConversion::new(Mass, 28.3495),

        // ===== 体积（基准: 毫升）=====
        "ml" | "mililitro" | "mililitros" | "milliliter" | "milliliters" | "millilitre"
        | "cc" | "cm3" => UnitConversion::new(Volume, 1.0),
        "l" | "lt" | "lts" | "litro" | "litros" | "liter" | "liters" | "litre" | "litres" => {
            UnitConversion::new(Volume, 1000.0)
        }
        "cl" => UnitConversion::new(Volume, 10.0),
        "dl" => UnitConversion::new(Volume, 100.0),
        "gal" | "galon" | "galón" | "galones" | "gallon" | "gallons" => {
            UnitConversion::new(Volume, 3785.41)
        }

        // ===== 计数 =====
        "unit" | "units" | "un" | "und" | "unds" | "unid" | "unidad" | "unidades" | "u"
        | "pc" | "pcs" | "pieza" | "piezas" | "piece" | "pieces" | "ea" | "each" => {
            UnitConversion::new(Count, 1.0)
        }
        "docena" | "docenas" | "dozen" | "dz" => UnitConversion::new(Count, 12.0),

        _ => FALLBACK,
    }
}
