// ==========================================
// 物料目录导入 - 目录存储 SQLite 实现
// ==========================================
// 职责: 实现 CatalogStore（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::material::{MaterialPatch, MaterialRecord, NewMaterial};
use crate::domain::taxonomy::{normalize_name, TaxonomyEntry};
use crate::domain::types::TaxonomyKind;
use crate::repository::catalog_repo::CatalogStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const MATERIAL_COLUMNS: &str = "id, name, brand, category_id, supplier_id, uom_id, \
     packaging_size, package_price, unit_cost, notes, is_default, last_update, created_at, deleted_at";

fn map_material_row(row: &Row<'_>) -> rusqlite::Result<MaterialRecord> {
    Ok(MaterialRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        brand: row.get(2)?,
        category_id: row.get(3)?,
        supplier_id: row.get(4)?,
        uom_id: row.get(5)?,
        packaging_size: row.get(6)?,
        package_price: row.get(7)?,
        unit_cost: row.get(8)?,
        notes: row.get(9)?,
        is_default: row.get(10)?,
        last_update: row.get(11)?,
        created_at: row.get(12)?,
        deleted_at: row.get(13)?,
    })
}

// ==========================================
// SqliteCatalogStore
// ==========================================
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// 创建新的存储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（需已初始化 schema）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享连接时使用）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 软删除记录
    pub fn soft_delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE material SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![Utc::now(), id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::MaterialNotFound(id.to_string()));
        }
        Ok(())
    }

    /// 按 id 读取单条记录（含软删除）
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<MaterialRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM material WHERE id = ?1", MATERIAL_COLUMNS);
        let record = conn
            .query_row(&sql, params![id], map_material_row)
            .optional()?;
        Ok(record)
    }

    /// 按名称（精确匹配）读取未删除记录
    pub fn list_by_name(&self, name: &str) -> RepositoryResult<Vec<MaterialRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM material WHERE name = ?1 AND deleted_at IS NULL ORDER BY created_at",
            MATERIAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![name], map_material_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn list_all(&self) -> RepositoryResult<Vec<MaterialRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM material ORDER BY created_at, id", MATERIAL_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_material_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    async fn insert(&self, material: NewMaterial) -> RepositoryResult<String> {
        let conn = self.lock()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            r#"
            INSERT INTO material (
                id, name, brand, category_id, supplier_id, uom_id,
                packaging_size, package_price, unit_cost, notes, is_default,
                last_update, created_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, NULL)
            "#,
            params![
                id,
                material.name,
                material.brand,
                material.category_id,
                material.supplier_id,
                material.uom_id,
                material.packaging_size,
                material.package_price,
                material.unit_cost,
                material.notes,
                material.is_default,
                now,
                now,
            ],
        )?;

        Ok(id)
    }

    async fn update(&self, id: &str, patch: MaterialPatch) -> RepositoryResult<()> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql + Send>> = Vec::new();

        if let Some(v) = patch.name {
            sets.push("name");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.brand {
            sets.push("brand");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.category_id {
            sets.push("category_id");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.supplier_id {
            sets.push("supplier_id");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.uom_id {
            sets.push("uom_id");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.packaging_size {
            sets.push("packaging_size");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.package_price {
            sets.push("package_price");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.unit_cost {
            sets.push("unit_cost");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.notes {
            sets.push("notes");
            values.push(Box::new(v));
        }
        if let Some(v) = patch.is_default {
            sets.push("is_default");
            values.push(Box::new(v));
        }
        sets.push("last_update");
        values.push(Box::new(patch.last_update.unwrap_or_else(Utc::now)));

        let assignments: Vec<String> = sets
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ?{}", col, i + 1))
            .collect();
        let sql = format!(
            "UPDATE material SET {} WHERE id = ?{} AND deleted_at IS NULL",
            assignments.join(", "),
            values.len() + 1
        );
        values.push(Box::new(id.to_string()));

        let conn = self.lock()?;
        let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(RepositoryError::MaterialNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_taxonomy(&self, kind: TaxonomyKind) -> RepositoryResult<Vec<TaxonomyEntry>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, name FROM {} ORDER BY created_at, name",
            kind.table_name()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(TaxonomyEntry {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    async fn create_taxonomy(
        &self,
        kind: TaxonomyKind,
        names: Vec<String>,
    ) -> RepositoryResult<Vec<TaxonomyEntry>> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let select_sql = format!(
            "SELECT id, name FROM {} WHERE name = ?1 COLLATE NOCASE",
            kind.table_name()
        );
        let insert_sql = format!("INSERT INTO {} (id, name) VALUES (?1, ?2)", kind.table_name());

        let mut seen = Vec::new();
        let mut entries = Vec::new();
        for raw in names {
            let name = raw.trim().to_string();
            if name.is_empty() {
                continue;
            }
            let key = normalize_name(&name);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            let existing = tx
                .query_row(&select_sql, params![name], |row| {
                    Ok(TaxonomyEntry {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })
                .optional()?;

            match existing {
                Some(entry) => entries.push(entry),
                None => {
                    let id = Uuid::new_v4().to_string();
                    tx.execute(&insert_sql, params![id, name])?;
                    entries.push(TaxonomyEntry { id, name });
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, SqliteCatalogStore) {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&path).unwrap();
        init_schema(&conn).unwrap();
        drop(conn);
        (temp, SqliteCatalogStore::new(&path).unwrap())
    }

    fn new_material(name: &str) -> NewMaterial {
        NewMaterial {
            name: name.to_string(),
            brand: None,
            category_id: None,
            supplier_id: None,
            uom_id: None,
            packaging_size: 1000.0,
            package_price: 4500.0,
            unit_cost: Some(4.5),
            notes: None,
            is_default: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (_temp, store) = setup();
        let id = store.insert(new_material("Flour")).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].unit_cost, Some(4.5));
        assert!(all[0].is_default);
        assert!(all[0].last_update.is_some());
    }

    #[tokio::test]
    async fn test_update_patch_and_clear() {
        let (_temp, store) = setup();
        let cats = store
            .create_taxonomy(TaxonomyKind::Category, vec!["Dry".to_string()])
            .await
            .unwrap();
        let mut material = new_material("Flour");
        material.category_id = Some(cats[0].id.clone());
        let id = store.insert(material).await.unwrap();

        let patch = MaterialPatch {
            category_id: Some(None),
            package_price: Some(4800.0),
            ..Default::default()
        };
        store.update(&id, patch).await.unwrap();

        let record = store.find_by_id(&id).unwrap().unwrap();
        assert_eq!(record.category_id, None);
        assert_eq!(record.package_price, 4800.0);
        assert_eq!(record.name, "Flour");
    }

    #[tokio::test]
    async fn test_update_missing_or_deleted_is_not_found() {
        let (_temp, store) = setup();
        let result = store.update("nope", MaterialPatch::default()).await;
        assert!(matches!(result, Err(RepositoryError::MaterialNotFound(_))));

        let id = store.insert(new_material("Salt")).await.unwrap();
        store.soft_delete(&id).unwrap();
        let result = store
            .update(&id, MaterialPatch::clear_default(Utc::now()))
            .await;
        assert!(matches!(result, Err(RepositoryError::MaterialNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_taxonomy_reuses_existing_names() {
        let (_temp, store) = setup();
        let first = store
            .create_taxonomy(TaxonomyKind::Supplier, vec!["Acme".to_string()])
            .await
            .unwrap();
        let second = store
            .create_taxonomy(
                TaxonomyKind::Supplier,
                vec!["ACME".to_string(), "Fresh Co".to_string(), "fresh co".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(second.len(), 2);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(
            store.list_taxonomy(TaxonomyKind::Supplier).await.unwrap().len(),
            2
        );
    }
}
