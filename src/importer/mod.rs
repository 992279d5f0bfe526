// ==========================================
// 物料目录导入 - 导入层
// ==========================================
// 职责: 供应商价目表 → 物料目录的对账与合并
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod catalog_importer;
pub mod catalog_index;
pub mod conflict_detector;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod resolution;
pub mod row_validator;
pub mod unit_normalizer;
pub mod upsert_executor;

// 重导出核心类型
pub use catalog_importer::{CatalogImporter, ImportPlan};
pub use catalog_index::{select_current, CatalogIndex};
pub use conflict_detector::{ConflictDetector, ConflictReport};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use resolution::{ConfirmationRequest, ResolutionRequest};
pub use unit_normalizer::{normalize as normalize_unit, UnitConversion};
pub use upsert_executor::{progress_percent, ExecutionSummary, UpsertExecutor};

// 重导出 Trait 接口
pub use importer_trait::{
    DataCleaner, FieldMapper, FileParser, NoOpProgressSink, NoOperatorResolver,
    OperatorResolver, ProgressSink, RawRow,
};
