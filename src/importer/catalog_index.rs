// ==========================================
// 物料目录导入 - 目录索引与当前记录选择
// ==========================================
// 职责: 按身份键分组现有目录；为导入行选出唯一的"当前记录"
// 红线: 冲突检测与执行器必须调用同一个 select_current
// ==========================================

use crate::domain::material::{IdentityKey, MaterialRecord};
use std::collections::HashMap;

// ==========================================
// select_current - 当前记录选择（纯函数）
// ==========================================
// 优先级（先命中者胜出）:
// 1. 供应商 id 与导入行一致
// 2. 分类 id 与导入行一致
// 3. 全部候选
// 同一优先级内取最近变更（last_update，回退 created_at），再取最小 id
pub fn select_current<'a>(
    candidates: &'a [MaterialRecord],
    supplier_id: Option<&str>,
    category_id: Option<&str>,
) -> Option<&'a MaterialRecord> {
    if let Some(supplier_id) = supplier_id {
        let hit = most_recent(
            candidates
                .iter()
                .filter(|c| c.supplier_id.as_deref() == Some(supplier_id)),
        );
        if hit.is_some() {
            return hit;
        }
    }

    if let Some(category_id) = category_id {
        let hit = most_recent(
            candidates
                .iter()
                .filter(|c| c.category_id.as_deref() == Some(category_id)),
        );
        if hit.is_some() {
            return hit;
        }
    }

    most_recent(candidates.iter())
}

fn most_recent<'a>(
    records: impl Iterator<Item = &'a MaterialRecord>,
) -> Option<&'a MaterialRecord> {
    records.max_by(|a, b| {
        a.recency()
            .cmp(&b.recency())
            .then_with(|| b.id.cmp(&a.id))
    })
}

/// 是否已有候选恰好处于该 (分类, 供应商) 组合
pub fn has_exact_pair(
    candidates: &[MaterialRecord],
    category_id: Option<&str>,
    supplier_id: Option<&str>,
) -> bool {
    candidates.iter().any(|c| {
        c.category_id.as_deref() == category_id && c.supplier_id.as_deref() == supplier_id
    })
}

// ==========================================
// CatalogIndex - 身份键 → 候选记录
// ==========================================
// 已软删除的记录不入索引
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    groups: HashMap<IdentityKey, Vec<MaterialRecord>>,
}

impl CatalogIndex {
    pub fn build(records: Vec<MaterialRecord>) -> Self {
        let mut index = Self::default();
        for record in records.into_iter().filter(|r| !r.is_deleted()) {
            index.push(record);
        }
        index
    }

    fn push(&mut self, record: MaterialRecord) {
        self.groups
            .entry(record.identity_key())
            .or_default()
            .push(record);
    }

    /// 同一身份键下的候选记录（无候选时为空切片）
    pub fn candidates(&self, key: &IdentityKey) -> &[MaterialRecord] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 写入或替换一条记录（按 id）
    pub fn upsert(&mut self, record: MaterialRecord) {
        let key = record.identity_key();
        if let Some(group) = self.groups.get_mut(&key) {
            if let Some(slot) = group.iter_mut().find(|r| r.id == record.id) {
                *slot = record;
                return;
            }
        }
        self.remove(&record.id);
        self.push(record);
    }

    fn remove(&mut self, id: &str) {
        for group in self.groups.values_mut() {
            group.retain(|r| r.id != id);
        }
        self.groups.retain(|_, group| !group.is_empty());
    }

    pub fn get(&self, id: &str) -> Option<&MaterialRecord> {
        self.groups
            .values()
            .flat_map(|group| group.iter())
            .find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MaterialRecord> {
        self.groups
            .values_mut()
            .flat_map(|group| group.iter_mut())
            .find(|r| r.id == id)
    }

    /// 名称完全相同（区分大小写，忽略品牌）的记录
    pub fn records_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MaterialRecord> {
        self.groups
            .values()
            .flat_map(|group| group.iter())
            .filter(move |r| r.name == name)
    }

    pub fn key_count(&self) -> usize {
        self.groups.len()
    }

    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
