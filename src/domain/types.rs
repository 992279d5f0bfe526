// ==========================================
// 物料目录导入 - 领域类型定义
// ==========================================
// 职责: 规范单位、分类维度、解决策略等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 规范单位 (Canonical Unit)
// ==========================================
// 所有数量在计算成本前统一换算到这三种单位
// 存储标识: gr / ml / unit（与 material_uom 表一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalUnit {
    Mass,   // 质量（克）
    Volume, // 体积（毫升）
    Count,  // 计数（个）
}

impl CanonicalUnit {
    pub const ALL: [CanonicalUnit; 3] = [
        CanonicalUnit::Mass,
        CanonicalUnit::Volume,
        CanonicalUnit::Count,
    ];

    /// 单位分类表中的标识名
    pub fn marker(&self) -> &'static str {
        match self {
            CanonicalUnit::Mass => "gr",
            CanonicalUnit::Volume => "ml",
            CanonicalUnit::Count => "unit",
        }
    }
}

impl fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

// ==========================================
// 分类维度 (Taxonomy Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxonomyKind {
    Category, // 物料分类
    Supplier, // 供应商
    Uom,      // 计量单位
}

impl TaxonomyKind {
    /// 对应的存储表名
    pub fn table_name(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "material_category",
            TaxonomyKind::Supplier => "material_supplier",
            TaxonomyKind::Uom => "material_uom",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxonomyKind::Category => write!(f, "CATEGORY"),
            TaxonomyKind::Supplier => write!(f, "SUPPLIER"),
            TaxonomyKind::Uom => write!(f, "UOM"),
        }
    }
}

// ==========================================
// 冲突解决策略 (Resolution Strategy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStrategy {
    Direct,      // 无冲突无新值，直接执行
    Automatic,   // 自动创建新值，冲突交给优先级规则
    Interactive, // 人工逐项决定
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStrategy::Direct => write!(f, "DIRECT"),
            ResolutionStrategy::Automatic => write!(f, "AUTOMATIC"),
            ResolutionStrategy::Interactive => write!(f, "INTERACTIVE"),
        }
    }
}
