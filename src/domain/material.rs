// ==========================================
// 物料目录导入 - 物料领域模型
// ==========================================
// 职责: 目录记录、身份键、更新补丁
// 红线: 目录记录只能经由导入执行器或人工编辑修改
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// MaterialRecord - 目录物料记录
// ==========================================
// 对齐: material 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    // ===== 主键 =====
    pub id: String,

    // ===== 身份信息 =====
    pub name: String,
    pub brand: Option<String>,

    // ===== 归属（分类维度 id）=====
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub uom_id: Option<String>,

    // ===== 经济字段 =====
    pub packaging_size: f64,        // 包装量（规范单位）
    pub package_price: f64,         // 包装价格
    pub unit_cost: Option<f64>,     // 单位成本（派生）

    pub notes: Option<String>,
    pub is_default: bool,           // 同名物料中的默认项

    // ===== 审计字段 =====
    pub last_update: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>, // 软删除标记
}

impl MaterialRecord {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(&self.name, self.brand.as_deref())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// 最近一次变更时间（无更新记录时回退到创建时间）
    pub fn recency(&self) -> DateTime<Utc> {
        self.last_update.unwrap_or(self.created_at)
    }

    /// 将补丁应用到内存副本
    pub fn apply_patch(&mut self, patch: &MaterialPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(brand) = &patch.brand {
            self.brand = brand.clone();
        }
        if let Some(category_id) = &patch.category_id {
            self.category_id = category_id.clone();
        }
        if let Some(supplier_id) = &patch.supplier_id {
            self.supplier_id = supplier_id.clone();
        }
        if let Some(uom_id) = &patch.uom_id {
            self.uom_id = uom_id.clone();
        }
        if let Some(size) = patch.packaging_size {
            self.packaging_size = size;
        }
        if let Some(price) = patch.package_price {
            self.package_price = price;
        }
        if let Some(unit_cost) = patch.unit_cost {
            self.unit_cost = unit_cost;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(is_default) = patch.is_default {
            self.is_default = is_default;
        }
        if let Some(ts) = patch.last_update {
            self.last_update = Some(ts);
        }
    }
}

// ==========================================
// NewMaterial - 待插入物料
// ==========================================
// id / created_at 由存储层生成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaterial {
    pub name: String,
    pub brand: Option<String>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub uom_id: Option<String>,
    pub packaging_size: f64,
    pub package_price: f64,
    pub unit_cost: Option<f64>,
    pub notes: Option<String>,
    pub is_default: bool,
}

// ==========================================
// MaterialPatch - 更新补丁
// ==========================================
// 外层 None = 字段不变；可空字段用 Some(None) 表示清空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub brand: Option<Option<String>>,
    pub category_id: Option<Option<String>>,
    pub supplier_id: Option<Option<String>>,
    pub uom_id: Option<Option<String>>,
    pub packaging_size: Option<f64>,
    pub package_price: Option<f64>,
    pub unit_cost: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
    pub is_default: Option<bool>,
    pub last_update: Option<DateTime<Utc>>,
}

impl MaterialPatch {
    /// 只清除默认标记的补丁
    pub fn clear_default(now: DateTime<Utc>) -> Self {
        Self {
            is_default: Some(false),
            last_update: Some(now),
            ..Default::default()
        }
    }

    /// 是否包含实际字段变更（last_update 不计）
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.brand.is_some()
            || self.category_id.is_some()
            || self.supplier_id.is_some()
            || self.uom_id.is_some()
            || self.packaging_size.is_some()
            || self.package_price.is_some()
            || self.unit_cost.is_some()
            || self.notes.is_some()
            || self.is_default.is_some()
    }
}

// ==========================================
// IdentityKey - 身份键
// ==========================================
// 规则: lower(name) + "|" + lower(brand 或 "")
// 不唯一: 同一物料可能来自多个供应商
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(name: &str, brand: Option<&str>) -> Self {
        let name = name.trim().to_lowercase();
        let brand = brand.map(|b| b.trim().to_lowercase()).unwrap_or_default();
        IdentityKey(format!("{}|{}", name, brand))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
