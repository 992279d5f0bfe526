// ==========================================
// 物料目录导入 - 行校验器
// ==========================================
// 职责: 逐行校验必填字段与单位映射，解析归属 id，计算派生字段
// 失败只影响当前行（返回 SkipReason），不终止运行
// ==========================================

use crate::config::ImportConfig;
use crate::domain::import::{FieldOverride, ImportRow, ResolvedOverride, SkipReason};
use crate::domain::material::IdentityKey;
use crate::domain::taxonomy::{TaxonomyIndex, TaxonomySnapshot};
use crate::importer::conflict_detector::lookup_id;
use crate::importer::unit_normalizer::{self, UnitConversion};

/// 归属字段的最终取值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// 导入值为空，沿用当前记录
    KeepCurrent,
    /// 写入该值（None = 清空）
    Write(Option<String>),
}

impl FieldValue {
    /// 结合当前记录得出实际值
    pub fn value_for(&self, current: Option<&str>) -> Option<String> {
        match self {
            FieldValue::KeepCurrent => current.map(str::to_string),
            FieldValue::Write(value) => value.clone(),
        }
    }
}

// ==========================================
// ValidatedRow - 通过校验的导入行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub row_number: usize,
    pub key: IdentityKey,
    pub name: String,
    pub brand: Option<String>,

    // 匹配用 id（仅按名称解析，与冲突检测一致）
    pub lookup_category_id: Option<String>,
    pub lookup_supplier_id: Option<String>,

    // 写入用归属（已应用覆写）
    pub category: FieldValue,
    pub supplier: FieldValue,

    pub uom_id: String,
    pub conversion: UnitConversion,
    pub packaging_size: f64,
    pub package_price: f64,
    pub unit_cost: f64,
    pub notes: Option<String>,
    pub is_default: Option<bool>,
}

pub struct RowValidator<'a> {
    taxonomy: &'a TaxonomySnapshot,
    config: &'a ImportConfig,
}

impl<'a> RowValidator<'a> {
    pub fn new(taxonomy: &'a TaxonomySnapshot, config: &'a ImportConfig) -> Self {
        Self { taxonomy, config }
    }

    /// 校验单行
    ///
    /// # 参数
    /// - has_candidates: 该身份键下是否已有目录记录（决定空归属能否沿用当前值）
    /// - overrides: 该身份键的覆写（如有）
    pub fn validate(
        &self,
        row: &ImportRow,
        has_candidates: bool,
        overrides: Option<&ResolvedOverride>,
    ) -> Result<ValidatedRow, SkipReason> {
        let name = row
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(SkipReason::MissingName)?;

        let raw_qty = row
            .package_qty
            .filter(|q| q.is_finite() && *q > 0.0)
            .ok_or(SkipReason::InvalidQuantity)?;

        let price = row
            .package_price
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or(SkipReason::InvalidPrice)?;

        let conversion = unit_normalizer::normalize(row.uom_token.as_deref().unwrap_or(""));
        let uom_id = self
            .taxonomy
            .uom_id(conversion.unit)
            .ok_or(SkipReason::UnknownUnit)?
            .to_string();

        let lookup_category_id =
            lookup_id(&self.taxonomy.categories, row.category_name.as_deref());
        let lookup_supplier_id =
            lookup_id(&self.taxonomy.suppliers, row.supplier_name.as_deref());

        let category = resolve_field(
            &self.taxonomy.categories,
            row.category_name.as_deref(),
            overrides.and_then(|o| o.category.as_ref()),
            has_candidates,
        )
        .ok_or(SkipReason::UnresolvedCategory)?;
        let supplier = resolve_field(
            &self.taxonomy.suppliers,
            row.supplier_name.as_deref(),
            overrides.and_then(|o| o.supplier.as_ref()),
            has_candidates,
        )
        .ok_or(SkipReason::UnresolvedSupplier)?;

        let packaging_size = conversion.apply(raw_qty);
        let package_price = self.config.round_money(price);
        let unit_cost = match row.unit_cost.filter(|c| c.is_finite() && *c >= 0.0) {
            Some(explicit) => self.config.round_money(explicit),
            None => package_price / packaging_size,
        };

        Ok(ValidatedRow {
            row_number: row.row_number,
            key: row.identity_key(),
            name: name.to_string(),
            brand: row
                .brand
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
            lookup_category_id,
            lookup_supplier_id,
            category,
            supplier,
            uom_id,
            conversion,
            packaging_size,
            package_price,
            unit_cost,
            notes: row.notes.clone(),
            is_default: row.is_default,
        })
    }
}

/// 覆写优先；否则按名称解析；空名称仅在已有记录时沿用当前值
fn resolve_field(
    index: &TaxonomyIndex,
    name: Option<&str>,
    field_override: Option<&FieldOverride>,
    has_candidates: bool,
) -> Option<FieldValue> {
    if let Some(field_override) = field_override {
        return Some(FieldValue::Write(field_override.clone().into_id()));
    }

    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => index
            .id_of(name)
            .map(|id| FieldValue::Write(Some(id.to_string()))),
        None if has_candidates => Some(FieldValue::KeepCurrent),
        None => None,
    }
}
