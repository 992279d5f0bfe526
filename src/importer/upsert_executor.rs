// ==========================================
// 物料目录导入 - 合并与写入执行器
// ==========================================
// 职责: 严格按输入顺序逐行 插入/更新/跳过，维护同名默认唯一，上报进度
// 约束: 单行失败只计入 skipped，不终止运行
// 候选池: 冲突检测时的 list_all 快照（本次新增的记录不参与匹配）
// 工作快照: 候选池 + 本次运行的写入，用于比较与默认项维护
// ==========================================

use crate::config::ImportConfig;
use crate::domain::import::{
    ImportRow, ImportStats, ResolvedOverrides, RowOutcome, RowReport, SkipReason,
};
use crate::domain::material::{MaterialPatch, MaterialRecord, NewMaterial};
use crate::domain::taxonomy::TaxonomySnapshot;
use crate::importer::catalog_index::{select_current, CatalogIndex};
use crate::importer::importer_trait::ProgressSink;
use crate::importer::row_validator::{RowValidator, ValidatedRow};
use crate::repository::catalog_repo::CatalogStore;
use chrono::Utc;
use tracing::{debug, error, warn};

/// 进度百分比: round(100 * processed / total)
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (100.0 * processed as f64 / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

/// 执行结果
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    pub stats: ImportStats,
    pub rows: Vec<RowReport>,
}

pub struct UpsertExecutor<'a, S>
where
    S: CatalogStore + ?Sized,
{
    store: &'a S,
    taxonomy: &'a TaxonomySnapshot,
    config: &'a ImportConfig,
    overrides: &'a ResolvedOverrides,
    candidates: CatalogIndex,
    working: CatalogIndex,
}

impl<'a, S> UpsertExecutor<'a, S>
where
    S: CatalogStore + ?Sized,
{
    pub fn new(
        store: &'a S,
        taxonomy: &'a TaxonomySnapshot,
        config: &'a ImportConfig,
        overrides: &'a ResolvedOverrides,
        index: CatalogIndex,
    ) -> Self {
        Self {
            store,
            taxonomy,
            config,
            overrides,
            candidates: index.clone(),
            working: index,
        }
    }

    /// 逐行执行
    pub async fn execute(
        &mut self,
        rows: &[ImportRow],
        progress: &dyn ProgressSink,
    ) -> ExecutionSummary {
        let mut summary = ExecutionSummary::default();
        let total = rows.len();

        for (processed, row) in rows.iter().enumerate() {
            let outcome = self.process_row(row).await;

            summary.stats.record(&outcome);
            summary.rows.push(RowReport {
                row_number: row.row_number,
                key: row.identity_key(),
                outcome,
            });

            progress.report(progress_percent(processed + 1, total));
        }

        summary
    }

    async fn process_row(&mut self, row: &ImportRow) -> RowOutcome {
        let key = row.identity_key();
        let has_candidates = !self.candidates.candidates(&key).is_empty();

        // ===== 步骤 1-3: 校验、归属解析、派生字段 =====
        let validator = RowValidator::new(self.taxonomy, self.config);
        let validated = match validator.validate(row, has_candidates, self.overrides.get(&key)) {
            Ok(validated) => validated,
            Err(reason) => {
                warn!(row_number = row.row_number, key = %key, reason = ?reason, "行校验失败，跳过");
                return RowOutcome::Skipped { reason };
            }
        };

        // ===== 步骤 4: 重新选择当前记录（与冲突检测同一规则）=====
        // 比较以本次运行内的最新状态为准
        let current = select_current(
            self.candidates.candidates(&key),
            validated.lookup_supplier_id.as_deref(),
            validated.lookup_category_id.as_deref(),
        )
        .map(|selected| {
            self.working
                .get(&selected.id)
                .cloned()
                .unwrap_or_else(|| selected.clone())
        });

        match current {
            None => self.insert(validated).await,
            Some(current) => self.update(current, validated).await,
        }
    }

    // ===== 步骤 5: 插入 =====
    async fn insert(&mut self, row: ValidatedRow) -> RowOutcome {
        // 未指定时，仅当没有同名记录才成为默认项
        let is_default = row
            .is_default
            .unwrap_or_else(|| self.working.records_named(&row.name).next().is_none());

        let material = NewMaterial {
            name: row.name.clone(),
            brand: row.brand.clone(),
            category_id: row.category.value_for(None),
            supplier_id: row.supplier.value_for(None),
            uom_id: Some(row.uom_id.clone()),
            packaging_size: row.packaging_size,
            package_price: row.package_price,
            unit_cost: Some(row.unit_cost),
            notes: row.notes.clone(),
            is_default,
        };

        match self.store.insert(material.clone()).await {
            Ok(id) => {
                debug!(row_number = row.row_number, id = %id, "新增物料");
                let now = Utc::now();
                self.working.upsert(MaterialRecord {
                    id: id.clone(),
                    name: material.name,
                    brand: material.brand,
                    category_id: material.category_id,
                    supplier_id: material.supplier_id,
                    uom_id: material.uom_id,
                    packaging_size: material.packaging_size,
                    package_price: material.package_price,
                    unit_cost: material.unit_cost,
                    notes: material.notes,
                    is_default,
                    last_update: Some(now),
                    created_at: now,
                    deleted_at: None,
                });

                if is_default {
                    self.enforce_exclusive_default(&row.name, &id).await;
                }
                RowOutcome::Inserted { id }
            }
            Err(e) => {
                warn!(row_number = row.row_number, error = %e, "新增物料失败，跳过");
                RowOutcome::Skipped {
                    reason: SkipReason::WriteFailed,
                }
            }
        }
    }

    // ===== 步骤 6: 比较并更新 =====
    async fn update(&mut self, current: MaterialRecord, row: ValidatedRow) -> RowOutcome {
        let mut patch = self.diff(&current, &row);

        if !patch.has_changes() {
            debug!(row_number = row.row_number, id = %current.id, "无变更，跳过");
            return RowOutcome::Skipped {
                reason: SkipReason::Unchanged,
            };
        }

        patch.last_update = Some(Utc::now());

        match self.store.update(&current.id, patch.clone()).await {
            Ok(()) => {
                debug!(row_number = row.row_number, id = %current.id, "更新物料");
                let mut updated = current;
                updated.apply_patch(&patch);
                let id = updated.id.clone();
                let is_default = updated.is_default;
                let name = updated.name.clone();
                self.working.upsert(updated);

                if is_default {
                    self.enforce_exclusive_default(&name, &id).await;
                }
                RowOutcome::Updated { id }
            }
            Err(e) => {
                warn!(row_number = row.row_number, id = %current.id, error = %e, "更新物料失败，跳过");
                RowOutcome::Skipped {
                    reason: SkipReason::WriteFailed,
                }
            }
        }
    }

    /// 逐字段比较: 标识/文本精确比较，数值按容差比较
    fn diff(&self, current: &MaterialRecord, row: &ValidatedRow) -> MaterialPatch {
        let mut patch = MaterialPatch::default();

        let category_id = row.category.value_for(current.category_id.as_deref());
        if category_id != current.category_id {
            patch.category_id = Some(category_id);
        }

        let supplier_id = row.supplier.value_for(current.supplier_id.as_deref());
        if supplier_id != current.supplier_id {
            patch.supplier_id = Some(supplier_id);
        }

        if current.uom_id.as_deref() != Some(row.uom_id.as_str()) {
            patch.uom_id = Some(Some(row.uom_id.clone()));
        }

        if !self.config.approx_eq(current.packaging_size, row.packaging_size) {
            patch.packaging_size = Some(row.packaging_size);
        }

        if !self.config.approx_eq(current.package_price, row.package_price) {
            patch.package_price = Some(row.package_price);
        }

        let unit_cost_same = current
            .unit_cost
            .map(|c| self.config.approx_eq(c, row.unit_cost))
            .unwrap_or(false);
        if !unit_cost_same {
            patch.unit_cost = Some(Some(row.unit_cost));
        }

        // 空备注不覆盖现有备注
        if let Some(notes) = &row.notes {
            if current.notes.as_ref() != Some(notes) {
                patch.notes = Some(Some(notes.clone()));
            }
        }

        // 未提供默认标记时保持原值
        if let Some(is_default) = row.is_default {
            if is_default != current.is_default {
                patch.is_default = Some(is_default);
            }
        }

        patch
    }

    // ===== 步骤 7: 同名默认唯一 =====
    async fn enforce_exclusive_default(&mut self, name: &str, keep_id: &str) {
        if !self.config.exclusive_default {
            return;
        }

        let others: Vec<String> = self
            .working
            .records_named(name)
            .filter(|r| r.id != keep_id && r.is_default)
            .map(|r| r.id.clone())
            .collect();

        for id in others {
            let patch = MaterialPatch::clear_default(Utc::now());
            match self.store.update(&id, patch.clone()).await {
                Ok(()) => {
                    if let Some(record) = self.working.get_mut(&id) {
                        record.apply_patch(&patch);
                    }
                    debug!(id = %id, keep_id, "清除同名物料默认标记");
                }
                Err(e) => {
                    error!(id = %id, keep_id, error = %e, "清除同名物料默认标记失败");
                }
            }
        }
    }
}
