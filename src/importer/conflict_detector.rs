// ==========================================
// 物料目录导入 - 冲突检测器
// ==========================================
// 职责: 比较导入行与当前记录的分类/供应商归属，枚举冲突项与新值
// 口径: 名称查找仅使用当前分类表（尚未创建的新条目不参与）
// ==========================================

use crate::domain::import::{ConflictItem, ImportRow, NewValues};
use crate::domain::taxonomy::{normalize_name, TaxonomyIndex, TaxonomySnapshot};
use crate::importer::catalog_index::{has_exact_pair, select_current, CatalogIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 冲突检测结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: Vec<ConflictItem>,
    pub new_values: NewValues,
}

impl ConflictReport {
    /// 是否需要进入自动/交互解决
    pub fn needs_resolution(&self) -> bool {
        !self.conflicts.is_empty() || !self.new_values.is_empty()
    }
}

/// 名称 → id（空名或未知名称返回 None）
pub fn lookup_id(index: &TaxonomyIndex, name: Option<&str>) -> Option<String> {
    name.and_then(|n| index.id_of(n)).map(str::to_string)
}

/// 两侧均非空且忽略大小写后不同
fn names_differ(current: Option<&str>, incoming: Option<&str>) -> bool {
    match (current, incoming) {
        (Some(current), Some(incoming)) => {
            let current = normalize_name(current);
            let incoming = normalize_name(incoming);
            !current.is_empty() && !incoming.is_empty() && current != incoming
        }
        _ => false,
    }
}

pub struct ConflictDetector<'a> {
    index: &'a CatalogIndex,
    taxonomy: &'a TaxonomySnapshot,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(index: &'a CatalogIndex, taxonomy: &'a TaxonomySnapshot) -> Self {
        Self { index, taxonomy }
    }

    /// 扫描全部导入行
    pub fn detect(&self, rows: &[ImportRow]) -> ConflictReport {
        let mut report = ConflictReport::default();
        let mut seen_keys = HashSet::new();

        for row in rows {
            self.collect_new_values(row, &mut report.new_values);

            // 覆写按身份键生效，同一键只报告第一次冲突
            if let Some(conflict) = self.detect_row(row) {
                if seen_keys.insert(conflict.key.clone()) {
                    report.conflicts.push(conflict);
                }
            }
        }

        tracing::debug!(
            conflicts = report.conflicts.len(),
            new_categories = report.new_values.categories.len(),
            new_suppliers = report.new_values.suppliers.len(),
            "冲突检测完成"
        );
        report
    }

    /// 单行冲突检测（无候选或归属组合已存在时返回 None）
    pub fn detect_row(&self, row: &ImportRow) -> Option<ConflictItem> {
        let key = row.identity_key();
        let candidates = self.index.candidates(&key);
        if candidates.is_empty() {
            return None;
        }

        let category_id = lookup_id(&self.taxonomy.categories, row.category_name.as_deref());
        let supplier_id = lookup_id(&self.taxonomy.suppliers, row.supplier_name.as_deref());

        if has_exact_pair(candidates, category_id.as_deref(), supplier_id.as_deref()) {
            return None;
        }

        let current = select_current(candidates, supplier_id.as_deref(), category_id.as_deref())?;

        let current_category_name = current
            .category_id
            .as_deref()
            .and_then(|id| self.taxonomy.categories.name_of(id))
            .map(str::to_string);
        let current_supplier_name = current
            .supplier_id
            .as_deref()
            .and_then(|id| self.taxonomy.suppliers.name_of(id))
            .map(str::to_string);

        let category_changed = names_differ(
            current_category_name.as_deref(),
            row.category_name.as_deref(),
        );
        let supplier_changed = names_differ(
            current_supplier_name.as_deref(),
            row.supplier_name.as_deref(),
        );

        if !category_changed && !supplier_changed {
            return None;
        }

        Some(ConflictItem {
            key,
            row_number: row.row_number,
            material_name: current.name.clone(),
            current_record_id: current.id.clone(),
            current_category_id: current.category_id.clone(),
            current_supplier_id: current.supplier_id.clone(),
            current_category_name,
            current_supplier_name,
            csv_category_name: row.category_name.clone(),
            csv_supplier_name: row.supplier_name.clone(),
            category_changed,
            supplier_changed,
        })
    }

    fn collect_new_values(&self, row: &ImportRow, new_values: &mut NewValues) {
        if let Some(name) = row.category_name.as_deref() {
            if !self.taxonomy.categories.contains_name(name) {
                new_values.add_category(name);
            }
        }
        if let Some(name) = row.supplier_name.as_deref() {
            if !self.taxonomy.suppliers.contains_name(name) {
                new_values.add_supplier(name);
            }
        }
    }
}
