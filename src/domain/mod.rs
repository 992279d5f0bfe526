// ==========================================
// 物料目录导入 - 领域模型层
// ==========================================
// 职责: 定义实体、类型与导入运行期结构
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod import;
pub mod material;
pub mod taxonomy;
pub mod types;

// 重导出核心类型
pub use import::{
    ConflictItem, CreatedTaxonomy, FieldOverride, ImportOutcome, ImportReport, ImportRow,
    ImportStats, NewValues, OperatorDecision, OverrideMap, ResolutionOverride, ResolvedOverride,
    ResolvedOverrides, RowOutcome, RowReport, SkipBreakdown, SkipReason, TaxonomyChoice,
};
pub use material::{IdentityKey, MaterialPatch, MaterialRecord, NewMaterial};
pub use taxonomy::{TaxonomyEntry, TaxonomyIndex, TaxonomySnapshot};
pub use types::{CanonicalUnit, ResolutionStrategy, TaxonomyKind};
