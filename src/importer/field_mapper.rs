// ==========================================
// 物料目录导入 - 字段映射器实现
// ==========================================
// 职责: 表头别名 → 标准字段 + 类型转换
// 表头比较口径: 小写，去除空白、下划线、连字符
// ==========================================

use crate::domain::import::ImportRow;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::{
    DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait, RawRow,
};

/// 标准字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Name,
    Brand,
    Supplier,
    Category,
    Uom,
    PackageQty,
    PackagePrice,
    UnitCost,
    Notes,
    IsDefault,
}

/// 表头归一化
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 按别名表识别表头，未识别返回 None
pub fn canonical_field(header: &str) -> Option<CanonicalField> {
    let field = match normalize_header(header).as_str() {
        "name" | "ingredient" | "material" | "product" | "item" | "nombre" | "ingrediente"
        | "insumo" | "producto" => CanonicalField::Name,
        "brand" | "marca" => CanonicalField::Brand,
        "supplier" | "vendor" | "provider" | "proveedor" => CanonicalField::Supplier,
        "category" | "categoria" | "categoría" | "family" | "familia" => {
            CanonicalField::Category
        }
        "uom" | "unit" | "units" | "unitofmeasure" | "measure" | "unidad" | "unidadmedida"
        | "unidaddemedida" | "um" => CanonicalField::Uom,
        "packageqty" | "packagequantity" | "packagingsize" | "packagesize" | "qty"
        | "quantity" | "cantidad" | "presentacion" | "presentación" | "contenido" => {
            CanonicalField::PackageQty
        }
        "packageprice" | "packagecost" | "price" | "cost" | "precio" | "costo"
        | "preciopaquete" | "valor" => CanonicalField::PackagePrice,
        "unitcost" | "costunit" | "costperunit" | "costounitario" | "preciounitario" => {
            CanonicalField::UnitCost
        }
        "notes" | "note" | "comments" | "notas" | "observaciones" => CanonicalField::Notes,
        "default" | "isdefault" | "predeterminado" | "principal" => CanonicalField::IsDefault,
        _ => return None,
    };
    Some(field)
}

/// 名称、分类、供应商全部为空的行在进入后续阶段前丢弃
pub fn lacks_identity(row: &ImportRow) -> bool {
    row.name.is_none() && row.category_name.is_none() && row.supplier_name.is_none()
}

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    fn parse_number(&self, row_number: usize, field: &str, value: &str) -> Option<f64> {
        let parsed = self.cleaner.parse_number(value);
        if parsed.is_none() && !value.trim().is_empty() {
            tracing::warn!(row_number, field, raw_value = %value, "数值无法解析，按空值处理");
        }
        parsed
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_to_import_row(&self, raw: &RawRow) -> ImportRow {
        let mut row = ImportRow {
            row_number: raw.row_number,
            ..Default::default()
        };

        // 表头顺序固定，保证同名字段取值确定
        let mut headers: Vec<&String> = raw.cells.keys().collect();
        headers.sort();

        for header in headers {
            let Some(field) = canonical_field(header) else {
                continue;
            };
            let value = &raw.cells[header];
            if value.trim().is_empty() {
                continue;
            }

            // 同一字段出现多列时取第一个非空值
            match field {
                CanonicalField::Name if row.name.is_none() => {
                    row.name = self.cleaner.clean_text(value);
                }
                CanonicalField::Brand if row.brand.is_none() => {
                    row.brand = self.cleaner.clean_text(value);
                }
                CanonicalField::Supplier if row.supplier_name.is_none() => {
                    row.supplier_name = self.cleaner.clean_text(value);
                }
                CanonicalField::Category if row.category_name.is_none() => {
                    row.category_name = self.cleaner.clean_text(value);
                }
                CanonicalField::Uom if row.uom_token.is_none() => {
                    row.uom_token = self.cleaner.clean_text(value);
                }
                CanonicalField::PackageQty if row.package_qty.is_none() => {
                    row.package_qty = self.parse_number(raw.row_number, "package_qty", value);
                }
                CanonicalField::PackagePrice if row.package_price.is_none() => {
                    row.package_price = self.parse_number(raw.row_number, "package_price", value);
                }
                CanonicalField::UnitCost if row.unit_cost.is_none() => {
                    row.unit_cost = self.parse_number(raw.row_number, "unit_cost", value);
                }
                CanonicalField::Notes if row.notes.is_none() => {
                    row.notes = self.cleaner.clean_text(value);
                }
                CanonicalField::IsDefault if row.is_default.is_none() => {
                    row.is_default = self.cleaner.parse_flag(value);
                }
                _ => {}
            }
        }

        row
    }
}
