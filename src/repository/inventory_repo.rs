// ==========================================
// 瓶装产线排产系统 - 库存数据仓储
// ==========================================
// 对齐: inventory 表 (每种原料一行)
// 红线: 单原料增减为一条条件 UPDATE, 不允许扣成负数
// ==========================================

use crate::domain::inventory::InventoryRow;
use crate::domain::timestamp::{format_ts, now_millis};
use crate::domain::types::Material;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::enum_column;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取全部库存行
    pub fn load(&self) -> RepositoryResult<Vec<InventoryRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT material, quantity FROM inventory ORDER BY material")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(InventoryRow {
                    material: enum_column(row, 0, Material::parse)?,
                    quantity: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn quantity_of(&self, material: Material) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        conn.query_row(
            "SELECT quantity FROM inventory WHERE material = ?1",
            params![material.to_db_str()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| RepositoryError::NotFound {
            entity: "Inventory".to_string(),
            id: material.to_string(),
        })
    }

    /// 单原料原子增减
    ///
    /// # 返回
    /// - Err(InsufficientInventory): 扣减后会小于 0（库存不变）
    /// - Err(NotFound): 原料行不存在
    pub fn adjust_quantity(&self, material: Material, delta: f64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE inventory
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE material = ?1 AND quantity + ?2 >= 0
            "#,
            params![material.to_db_str(), delta, format_ts(&now_millis())],
        )?;
        if rows == 1 {
            return Ok(());
        }

        let available: Option<f64> = conn
            .query_row(
                "SELECT quantity FROM inventory WHERE material = ?1",
                params![material.to_db_str()],
                |row| row.get(0),
            )
            .optional()?;
        match available {
            Some(available) => Err(RepositoryError::InsufficientInventory {
                material: material.to_string(),
                available,
                requested: -delta,
            }),
            None => Err(RepositoryError::NotFound {
                entity: "Inventory".to_string(),
                id: material.to_string(),
            }),
        }
    }
}
