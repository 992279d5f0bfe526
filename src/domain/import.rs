// ==========================================
// 物料目录导入 - 导入运行期模型
// ==========================================
// 生命周期: 仅在一次导入调用内存在
// 包含: 导入行、冲突项、解决覆写、统计与运行报告
// ==========================================

use crate::domain::material::IdentityKey;
use crate::domain::taxonomy::{normalize_name, TaxonomyEntry};
use crate::domain::types::ResolutionStrategy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// ImportRow - 规范化后的导入行
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub row_number: usize, // 原始文件行号（表头为第 1 行）
    pub name: Option<String>,
    pub brand: Option<String>,
    pub supplier_name: Option<String>,
    pub category_name: Option<String>,
    pub uom_token: Option<String>,
    pub package_qty: Option<f64>,
    pub package_price: Option<f64>,
    pub unit_cost: Option<f64>, // 显式单位成本（可选覆写）
    pub notes: Option<String>,
    pub is_default: Option<bool>,
}

impl ImportRow {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(self.name.as_deref().unwrap_or(""), self.brand.as_deref())
    }
}

// ==========================================
// ConflictItem - 归属冲突
// ==========================================
// 产生条件: 导入名称与当前记录名称不同，且两侧均非空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictItem {
    pub key: IdentityKey,
    pub row_number: usize,
    pub material_name: String,
    pub current_record_id: String,
    pub current_category_id: Option<String>,
    pub current_supplier_id: Option<String>,
    pub current_category_name: Option<String>,
    pub current_supplier_name: Option<String>,
    pub csv_category_name: Option<String>,
    pub csv_supplier_name: Option<String>,
    pub category_changed: bool,
    pub supplier_changed: bool,
}

// ==========================================
// NewValues - 分类表中尚不存在的导入名称
// ==========================================
// 去重口径: 忽略大小写，保留首次出现的写法
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewValues {
    pub categories: Vec<String>,
    pub suppliers: Vec<String>,
}

impl NewValues {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.suppliers.is_empty()
    }

    pub fn add_category(&mut self, name: &str) {
        push_unique(&mut self.categories, name);
    }

    pub fn add_supplier(&mut self, name: &str) {
        push_unique(&mut self.suppliers, name);
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return;
    }
    let key = normalize_name(trimmed);
    if !list.iter().any(|n| normalize_name(n) == key) {
        list.push(trimmed.to_string());
    }
}

// ==========================================
// TaxonomyChoice - 人工选择的归属值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxonomyChoice {
    Clear,             // 清空字段
    Existing(String),  // 已有条目 id
    CreateNew(String), // 执行前新建的名称
}

// ==========================================
// ResolutionOverride - 按身份键的覆写
// ==========================================
// None = 保持名称解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOverride {
    pub category: Option<TaxonomyChoice>,
    pub supplier: Option<TaxonomyChoice>,
}

pub type OverrideMap = HashMap<IdentityKey, ResolutionOverride>;

/// 新建条目落地后的覆写值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOverride {
    Clear,
    Set(String),
}

impl FieldOverride {
    pub fn into_id(self) -> Option<String> {
        match self {
            FieldOverride::Clear => None,
            FieldOverride::Set(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOverride {
    pub category: Option<FieldOverride>,
    pub supplier: Option<FieldOverride>,
}

pub type ResolvedOverrides = HashMap<IdentityKey, ResolvedOverride>;

// ==========================================
// OperatorDecision - 人工解决结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperatorDecision {
    Confirmed {
        overrides: OverrideMap,
        /// 同意新建的分类/供应商
        approved_new_values: NewValues,
    },
    Cancelled,
}

// ==========================================
// ImportStats - 导入计数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl ImportStats {
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Inserted { .. } => self.inserted += 1,
            RowOutcome::Updated { .. } => self.updated += 1,
            RowOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.skipped
    }
}

// ==========================================
// SkipReason - 跳过原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    Unchanged,          // 幂等空操作
    MissingName,
    InvalidQuantity,
    InvalidPrice,
    UnknownUnit,        // 规范单位在单位表中不存在
    UnresolvedCategory,
    UnresolvedSupplier,
    WriteFailed,
}

impl SkipReason {
    /// 是否为真正的失败（区别于无变更）
    pub fn is_error(&self) -> bool {
        !matches!(self, SkipReason::Unchanged)
    }

    pub fn is_validation(&self) -> bool {
        !matches!(self, SkipReason::Unchanged | SkipReason::WriteFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowOutcome {
    Inserted { id: String },
    Updated { id: String },
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowReport {
    pub row_number: usize,
    pub key: IdentityKey,
    pub outcome: RowOutcome,
}

/// 跳过明细: 无变更 / 校验失败 / 写入失败
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipBreakdown {
    pub unchanged: usize,
    pub invalid: usize,
    pub failed: usize,
}

// ==========================================
// CreatedTaxonomy - 执行前新建的条目
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTaxonomy {
    pub categories: Vec<TaxonomyEntry>,
    pub suppliers: Vec<TaxonomyEntry>,
}

// ==========================================
// ImportReport - 一次运行的完整结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub strategy: ResolutionStrategy,
    pub stats: ImportStats,
    pub rows: Vec<RowReport>,
    pub conflicts: usize,
    pub created: CreatedTaxonomy,
    pub elapsed_ms: u64,
}

impl ImportReport {
    pub fn skip_breakdown(&self) -> SkipBreakdown {
        let mut breakdown = SkipBreakdown::default();
        for row in &self.rows {
            if let RowOutcome::Skipped { reason } = row.outcome {
                if reason == SkipReason::Unchanged {
                    breakdown.unchanged += 1;
                } else if reason == SkipReason::WriteFailed {
                    breakdown.failed += 1;
                } else {
                    breakdown.invalid += 1;
                }
            }
        }
        breakdown
    }

    pub fn skip_reasons(&self) -> HashSet<SkipReason> {
        self.rows
            .iter()
            .filter_map(|r| match r.outcome {
                RowOutcome::Skipped { reason } => Some(reason),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImportOutcome {
    Completed(ImportReport),
    Cancelled { strategy: ResolutionStrategy },
}

impl ImportOutcome {
    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            ImportOutcome::Completed(report) => Some(report),
            ImportOutcome::Cancelled { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_values_dedup_case_insensitive() {
        let mut values = NewValues::default();
        values.add_category("Fruit");
        values.add_category(" fruit ");
        values.add_category("");
        values.add_supplier("Acme");

        assert_eq!(values.categories, vec!["Fruit".to_string()]);
        assert_eq!(values.suppliers, vec!["Acme".to_string()]);
        assert!(!values.is_empty());
    }

    #[test]
    fn test_stats_record() {
        let mut stats = ImportStats::default();
        stats.record(&RowOutcome::Inserted { id: "a".to_string() });
        stats.record(&RowOutcome::Skipped {
            reason: SkipReason::Unchanged,
        });
        stats.record(&RowOutcome::Skipped {
            reason: SkipReason::WriteFailed,
        });

        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_skip_breakdown_separates_noop_from_errors() {
        let key = IdentityKey::new("x", None);
        let report = ImportReport {
            run_id: "r".to_string(),
            strategy: ResolutionStrategy::Direct,
            stats: ImportStats::default(),
            rows: vec![
                RowReport {
                    row_number: 2,
                    key: key.clone(),
                    outcome: RowOutcome::Skipped {
                        reason: SkipReason::Unchanged,
                    },
                },
                RowReport {
                    row_number: 3,
                    key: key.clone(),
                    outcome: RowOutcome::Skipped {
                        reason: SkipReason::UnresolvedSupplier,
                    },
                },
                RowReport {
                    row_number: 4,
                    key,
                    outcome: RowOutcome::Skipped {
                        reason: SkipReason::WriteFailed,
                    },
                },
            ],
            conflicts: 0,
            created: CreatedTaxonomy::default(),
            elapsed_ms: 0,
        };

        let breakdown = report.skip_breakdown();
        assert_eq!(breakdown.unchanged, 1);
        assert_eq!(breakdown.invalid, 1);
        assert_eq!(breakdown.failed, 1);
        assert!(!SkipReason::Unchanged.is_error());
    }
}
