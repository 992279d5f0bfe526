// ==========================================
// 物料目录导入 - 导入流程编排
// ==========================================
// 流程: 解析 → 映射 → 读取配置/分类/目录 → 冲突检测 → 选择策略
//       → [确认 / 自动创建 / 人工解决] → 逐行写入 → 汇总
// 终止性错误: 无有效行 / 规范单位缺失 / 目录读取失败 / 分类创建失败
// ==========================================

use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::import::{
    CreatedTaxonomy, ImportOutcome, ImportReport, ImportRow, OperatorDecision, ResolvedOverrides,
};
use crate::domain::taxonomy::{TaxonomyIndex, TaxonomySnapshot};
use crate::domain::types::{ResolutionStrategy, TaxonomyKind};
use crate::importer::catalog_index::CatalogIndex;
use crate::importer::conflict_detector::{ConflictDetector, ConflictReport};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{lacks_identity, FieldMapper as FieldMapperImpl};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{
    FieldMapper, FileParser, OperatorResolver, ProgressSink, RawRow,
};
use crate::importer::resolution::{
    collect_creations, materialize_new_values, resolve_overrides, select_strategy,
    ConfirmationRequest, ResolutionRequest,
};
use crate::importer::upsert_executor::UpsertExecutor;
use crate::repository::catalog_repo::CatalogStore;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportPlan - 执行前的导入计划（预览即止于此）
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub rows: Vec<ImportRow>,
    pub discarded_rows: usize, // 名称/分类/供应商全空而丢弃的行
    pub matched_rows: usize,   // 身份键命中现有记录的行
    pub conflicts: ConflictReport,
    pub strategy: ResolutionStrategy,
    pub config: ImportConfig,
    taxonomy: TaxonomySnapshot,
    index: CatalogIndex,
}

impl ImportPlan {
    pub fn new_rows(&self) -> usize {
        self.rows.len() - self.matched_rows
    }

    pub fn taxonomy(&self) -> &TaxonomySnapshot {
        &self.taxonomy
    }

    pub fn confirmation_request(&self) -> ConfirmationRequest {
        ConfirmationRequest {
            total_rows: self.rows.len(),
            matched_rows: self.matched_rows,
            new_rows: self.new_rows(),
        }
    }
}

// ==========================================
// CatalogImporter - 目录导入器
// ==========================================
pub struct CatalogImporter<S, C>
where
    S: CatalogStore,
    C: ImportConfigReader,
{
    // 数据访问层
    store: S,

    // 配置读取器
    config_reader: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
}

impl<S, C> CatalogImporter<S, C>
where
    S: CatalogStore,
    C: ImportConfigReader,
{
    /// 使用默认组件创建（通用文件解析器 + 别名表映射器）
    pub fn new(store: S, config_reader: C) -> Self {
        Self::with_components(
            store,
            config_reader,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl::new()),
        )
    }

    /// 创建并指定解析组件
    pub fn with_components(
        store: S,
        config_reader: C,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
    ) -> Self {
        Self {
            store,
            config_reader,
            file_parser,
            field_mapper,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ==========================================
    // 预览（不写入）
    // ==========================================

    /// 解析文件并生成导入计划
    pub async fn prepare(&self, file_path: &Path) -> ImportResult<ImportPlan> {
        debug!(file_path = %file_path.display(), "步骤 1: 解析文件");
        let raw_rows = self.file_parser.parse_to_raw_rows(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        self.prepare_rows(raw_rows).await
    }

    /// 从已解析的原始行生成导入计划
    pub async fn prepare_rows(&self, raw_rows: Vec<RawRow>) -> ImportResult<ImportPlan> {
        let parsed = raw_rows.len();

        // === 步骤 2: 字段映射 + 丢弃无身份信息的行 ===
        let (rows, discarded): (Vec<ImportRow>, Vec<ImportRow>) = raw_rows
            .iter()
            .map(|raw| self.field_mapper.map_to_import_row(raw))
            .partition(|row| !lacks_identity(row));
        info!(parsed, kept = rows.len(), discarded = discarded.len(), "字段映射完成");

        if rows.is_empty() {
            error!(parsed, "未解析到任何有效数据行");
            return Err(ImportError::MalformedInput(format!(
                "未解析到任何有效数据行（原始行 {}）",
                parsed
            )));
        }

        // === 步骤 3: 读取配置快照 ===
        let config = ImportConfig::load(&self.config_reader).await?;
        debug!(?config, "导入配置已加载");

        // === 步骤 4: 读取分类表 ===
        let taxonomy = self.load_taxonomy().await?;
        if !taxonomy.has_any_canonical_unit() {
            error!(uoms = taxonomy.uoms.len(), "单位表缺少规范单位标识");
            return Err(ImportError::CanonicalUnitsMissing);
        }

        // === 步骤 5: 构建目录索引 ===
        let records = self.store.list_all().await.map_err(|e| {
            error!(error = %e, "目录读取失败");
            ImportError::CatalogLoad(e.to_string())
        })?;
        let index = CatalogIndex::build(records);
        info!(
            keys = index.key_count(),
            records = index.record_count(),
            "目录索引构建完成"
        );

        // === 步骤 6: 冲突检测 + 策略选择 ===
        let conflicts = ConflictDetector::new(&index, &taxonomy).detect(&rows);
        let strategy = select_strategy(&conflicts, config.interactive_confirmation);
        let matched_rows = rows
            .iter()
            .filter(|row| !index.candidates(&row.identity_key()).is_empty())
            .count();
        info!(
            conflicts = conflicts.conflicts.len(),
            new_categories = conflicts.new_values.categories.len(),
            new_suppliers = conflicts.new_values.suppliers.len(),
            strategy = %strategy,
            "冲突检测完成"
        );

        Ok(ImportPlan {
            rows,
            discarded_rows: discarded.len(),
            matched_rows,
            conflicts,
            strategy,
            config,
            taxonomy,
            index,
        })
    }

    async fn load_taxonomy(&self) -> ImportResult<TaxonomySnapshot> {
        let mut snapshot = TaxonomySnapshot::default();
        for kind in [
            TaxonomyKind::Category,
            TaxonomyKind::Supplier,
            TaxonomyKind::Uom,
        ] {
            let entries = self.store.list_taxonomy(kind).await.map_err(|e| {
                error!(kind = %kind, error = %e, "分类表读取失败");
                ImportError::CatalogLoad(e.to_string())
            })?;
            *snapshot.index_mut(kind) = TaxonomyIndex::new(entries);
        }
        Ok(snapshot)
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 从文件导入
    #[instrument(skip(self, resolver, progress), fields(run_id))]
    pub async fn run(
        &self,
        file_path: &Path,
        resolver: &dyn OperatorResolver,
        progress: &dyn ProgressSink,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(run_id = %run_id, file_path = %file_path.display(), "开始导入物料目录");

        let plan = self.prepare(file_path).await?;
        self.execute_plan(plan, resolver, progress, run_id, start_time)
            .await
    }

    /// 从已解析的原始行导入
    #[instrument(skip(self, raw_rows, resolver, progress), fields(run_id))]
    pub async fn run_rows(
        &self,
        raw_rows: Vec<RawRow>,
        resolver: &dyn OperatorResolver,
        progress: &dyn ProgressSink,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(run_id = %run_id, rows = raw_rows.len(), "开始导入物料目录");

        let plan = self.prepare_rows(raw_rows).await?;
        self.execute_plan(plan, resolver, progress, run_id, start_time)
            .await
    }

    async fn execute_plan(
        &self,
        plan: ImportPlan,
        resolver: &dyn OperatorResolver,
        progress: &dyn ProgressSink,
        run_id: String,
        start_time: Instant,
    ) -> ImportResult<ImportOutcome> {
        let confirmation = plan.confirmation_request();
        let ImportPlan {
            rows,
            conflicts,
            strategy,
            config,
            mut taxonomy,
            index,
            ..
        } = plan;

        // === 步骤 7: 按策略准备覆写 ===
        let (overrides, created) = match strategy {
            ResolutionStrategy::Direct => {
                if config.confirm_direct_import
                    && !resolver.confirm_import(&confirmation).await?
                {
                    warn!(run_id = %run_id, "操作员取消直接导入");
                    return Ok(ImportOutcome::Cancelled { strategy });
                }
                (ResolvedOverrides::new(), CreatedTaxonomy::default())
            }
            ResolutionStrategy::Automatic => {
                let created =
                    materialize_new_values(&self.store, &mut taxonomy, &conflicts.new_values)
                        .await?;
                (ResolvedOverrides::new(), created)
            }
            ResolutionStrategy::Interactive => {
                let request = ResolutionRequest::new(&conflicts, &taxonomy);
                match resolver.resolve_conflicts(&request).await? {
                    OperatorDecision::Cancelled => {
                        warn!(run_id = %run_id, "操作员取消冲突解决");
                        return Ok(ImportOutcome::Cancelled { strategy });
                    }
                    OperatorDecision::Confirmed {
                        overrides,
                        approved_new_values,
                    } => {
                        let creations = collect_creations(&overrides, &approved_new_values);
                        let created =
                            materialize_new_values(&self.store, &mut taxonomy, &creations)
                                .await?;
                        (resolve_overrides(&overrides, &taxonomy), created)
                    }
                }
            }
        };
        info!(
            strategy = %strategy,
            overrides = overrides.len(),
            created_categories = created.categories.len(),
            created_suppliers = created.suppliers.len(),
            "冲突解决完成，开始逐行写入"
        );

        // === 步骤 8: 逐行写入 ===
        let mut executor = UpsertExecutor::new(&self.store, &taxonomy, &config, &overrides, index);
        let summary = executor.execute(&rows, progress).await;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        let report = ImportReport {
            run_id,
            strategy,
            stats: summary.stats,
            rows: summary.rows,
            conflicts: conflicts.conflicts.len(),
            created,
            elapsed_ms,
        };

        let breakdown = report.skip_breakdown();
        info!(
            run_id = %report.run_id,
            inserted = report.stats.inserted,
            updated = report.stats.updated,
            skipped = report.stats.skipped,
            unchanged = breakdown.unchanged,
            invalid = breakdown.invalid,
            failed = breakdown.failed,
            elapsed_ms,
            "物料目录导入完成"
        );

        Ok(ImportOutcome::Completed(report))
    }
}
