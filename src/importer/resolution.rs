// ==========================================
// 物料目录导入 - 解决策略选择与覆写落地
// ==========================================
// 策略:
// - DIRECT: 无冲突且无新值
// - AUTOMATIC: 有冲突或新值，且关闭了交互确认 → 全部新值自动创建
// - INTERACTIVE: 有冲突或新值，且开启了交互确认 → 人工决定
// 新建条目在逐行执行前一次性批量创建（先分类后供应商）
// ==========================================

use crate::domain::import::{
    ConflictItem, CreatedTaxonomy, FieldOverride, NewValues, OverrideMap, ResolvedOverride,
    ResolvedOverrides, TaxonomyChoice,
};
use crate::domain::taxonomy::{TaxonomyEntry, TaxonomyIndex, TaxonomySnapshot};
use crate::domain::types::{ResolutionStrategy, TaxonomyKind};
use crate::importer::conflict_detector::ConflictReport;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::catalog_repo::CatalogStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ==========================================
// 人工解决通道的请求体
// ==========================================

/// 直接模式确认请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub total_rows: usize,
    pub matched_rows: usize, // 命中现有记录的行
    pub new_rows: usize,     // 将新建的行
}

/// 交互模式请求: 全部冲突项 + 新值 + 可选的现有条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub conflicts: Vec<ConflictItem>,
    pub new_values: NewValues,
    pub categories: Vec<TaxonomyEntry>,
    pub suppliers: Vec<TaxonomyEntry>,
}

impl ResolutionRequest {
    pub fn new(report: &ConflictReport, taxonomy: &TaxonomySnapshot) -> Self {
        Self {
            conflicts: report.conflicts.clone(),
            new_values: report.new_values.clone(),
            categories: taxonomy.categories.entries().to_vec(),
            suppliers: taxonomy.suppliers.entries().to_vec(),
        }
    }
}

/// 选择解决策略
pub fn select_strategy(report: &ConflictReport, interactive_confirmation: bool) -> ResolutionStrategy {
    if !report.needs_resolution() {
        ResolutionStrategy::Direct
    } else if interactive_confirmation {
        ResolutionStrategy::Interactive
    } else {
        ResolutionStrategy::Automatic
    }
}

/// 交互决定中需要新建的名称: 人工同意的新值 + 覆写中的 CreateNew
pub fn collect_creations(overrides: &OverrideMap, approved: &NewValues) -> NewValues {
    let mut creations = approved.clone();

    // 身份键排序，保证创建顺序确定
    let mut keys: Vec<_> = overrides.keys().collect();
    keys.sort();

    for key in keys {
        let choice = &overrides[key];
        if let Some(TaxonomyChoice::CreateNew(name)) = &choice.category {
            creations.add_category(name);
        }
        if let Some(TaxonomyChoice::CreateNew(name)) = &choice.supplier {
            creations.add_supplier(name);
        }
    }
    creations
}

/// 批量创建新条目并刷新分类快照
///
/// # 说明
/// - 已在快照中的名称跳过
/// - 任一批次失败即终止本次运行，已创建的条目保留
pub async fn materialize_new_values<S>(
    store: &S,
    taxonomy: &mut TaxonomySnapshot,
    values: &NewValues,
) -> ImportResult<CreatedTaxonomy>
where
    S: CatalogStore + ?Sized,
{
    let mut created = CreatedTaxonomy::default();

    for (kind, names) in [
        (TaxonomyKind::Category, &values.categories),
        (TaxonomyKind::Supplier, &values.suppliers),
    ] {
        let index = taxonomy.index(kind);
        let pending: Vec<String> = names
            .iter()
            .filter(|name| !index.contains_name(name))
            .cloned()
            .collect();
        if pending.is_empty() {
            continue;
        }

        let entries = store
            .create_taxonomy(kind, pending.clone())
            .await
            .map_err(|e| {
                tracing::error!(kind = %kind, names = ?pending, error = %e, "分类条目批量创建失败");
                ImportError::TaxonomyCreation {
                    kind,
                    message: e.to_string(),
                }
            })?;

        info!(kind = %kind, count = entries.len(), "分类条目已创建");

        let index = taxonomy.index_mut(kind);
        for entry in entries {
            if !index.contains_id(&entry.id) {
                index.insert(entry.clone());
            }
            match kind {
                TaxonomyKind::Category => created.categories.push(entry),
                _ => created.suppliers.push(entry),
            }
        }
    }

    Ok(created)
}

/// 将人工选择替换为真实 id
pub fn resolve_overrides(overrides: &OverrideMap, taxonomy: &TaxonomySnapshot) -> ResolvedOverrides {
    overrides
        .iter()
        .map(|(key, choice)| {
            let resolved = ResolvedOverride {
                category: choice.category.as_ref().and_then(|c| {
                    resolve_choice(c, &taxonomy.categories, TaxonomyKind::Category, key.as_str())
                }),
                supplier: choice.supplier.as_ref().and_then(|c| {
                    resolve_choice(c, &taxonomy.suppliers, TaxonomyKind::Supplier, key.as_str())
                }),
            };
            (key.clone(), resolved)
        })
        .collect()
}

fn resolve_choice(
    choice: &TaxonomyChoice,
    index: &TaxonomyIndex,
    kind: TaxonomyKind,
    key: &str,
) -> Option<FieldOverride> {
    match choice {
        TaxonomyChoice::Clear => Some(FieldOverride::Clear),
        TaxonomyChoice::Existing(id) => {
            if index.contains_id(id) {
                Some(FieldOverride::Set(id.clone()))
            } else {
                warn!(kind = %kind, key, id = %id, "覆写指向不存在的条目，忽略");
                None
            }
        }
        TaxonomyChoice::CreateNew(name) => match index.id_of(name) {
            Some(id) => Some(FieldOverride::Set(id.to_string())),
            None => {
                warn!(kind = %kind, key, name = %name, "待新建条目未落地，忽略覆写");
                None
            }
        },
    }
}
