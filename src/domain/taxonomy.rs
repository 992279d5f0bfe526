// ==========================================
// 物料目录导入 - 分类维度模型
// ==========================================
// 职责: 分类/供应商/单位条目 + 名称⇄id 双向查找
// ==========================================

use crate::domain::types::{CanonicalUnit, TaxonomyKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// TaxonomyEntry - 分类条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: String,
    pub name: String,
}

/// 名称比较口径: TRIM + 小写
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ==========================================
// TaxonomyIndex - 单一维度的查找表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct TaxonomyIndex {
    entries: Vec<TaxonomyEntry>,
    by_name: HashMap<String, String>,
    by_id: HashMap<String, String>,
}

impl TaxonomyIndex {
    pub fn new(entries: Vec<TaxonomyEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.insert(entry);
        }
        index
    }

    pub fn insert(&mut self, entry: TaxonomyEntry) {
        // 同名（忽略大小写）保留第一个
        self.by_name
            .entry(normalize_name(&entry.name))
            .or_insert_with(|| entry.id.clone());
        self.by_id.insert(entry.id.clone(), entry.name.clone());
        self.entries.push(entry);
    }

    /// 按名称查 id（忽略大小写，空名返回 None）
    pub fn id_of(&self, name: &str) -> Option<&str> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).map(String::as_str)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.id_of(name).is_some()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==========================================
// TaxonomySnapshot - 一次导入运行看到的全部维度
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct TaxonomySnapshot {
    pub categories: TaxonomyIndex,
    pub suppliers: TaxonomyIndex,
    pub uoms: TaxonomyIndex,
}

impl TaxonomySnapshot {
    pub fn index(&self, kind: TaxonomyKind) -> &TaxonomyIndex {
        match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Supplier => &self.suppliers,
            TaxonomyKind::Uom => &self.uoms,
        }
    }

    pub fn index_mut(&mut self, kind: TaxonomyKind) -> &mut TaxonomyIndex {
        match kind {
            TaxonomyKind::Category => &mut self.categories,
            TaxonomyKind::Supplier => &mut self.suppliers,
            TaxonomyKind::Uom => &mut self.uoms,
        }
    }

    /// 规范单位对应的单位 id
    pub fn uom_id(&self, unit: CanonicalUnit) -> Option<&str> {
        self.uoms.id_of(unit.marker())
    }

    /// 是否至少存在一个规范单位标识
    pub fn has_any_canonical_unit(&self) -> bool {
        CanonicalUnit::ALL.iter().any(|u| self.uom_id(*u).is_some())
    }
}
