// ==========================================
// 瓶装产线排产系统 - 原料到货数据仓储
// ==========================================
// 对齐: supplies 表
// 红线: 到货入库 (ordered -> received) 与库存增加必须在同一事务内
// ==========================================

use crate::domain::supply::Supply;
use crate::domain::timestamp::format_ts;
use crate::domain::types::{Material, SupplyStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{enum_column, opt_ts_column, ts_column};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SUPPLY_COLUMNS: &str = r#"
    id, material, quantity, supplier_name, tracking_number,
    eta, order_status, created_at, received_at
"#;

/// 插入参数
#[derive(Debug, Clone)]
pub struct SupplyInsert<'a> {
    pub material: Material,
    pub quantity: f64,
    pub supplier_name: &'a str,
    pub tracking_number: Option<&'a str>,
    pub eta: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// SupplyRepository - 原料到货仓储
// ==========================================
pub struct SupplyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplyRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, supply: &SupplyInsert<'_>) -> RepositoryResult<Supply> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO supplies (
                material, quantity, supplier_name, tracking_number, eta, order_status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                supply.material.to_db_str(),
                supply.quantity,
                supply.supplier_name,
                supply.tracking_number,
                format_ts(&supply.eta),
                SupplyStatus::Ordered.to_db_str(),
                format_ts(&supply.created_at),
            ],
        )?;

        Ok(Supply {
            id: conn.last_insert_rowid(),
            material: supply.material,
            quantity: supply.quantity,
            supplier_name: Some(supply.supplier_name.to_string()),
            tracking_number: supply.tracking_number.map(str::to_string),
            eta: supply.eta,
            order_status: SupplyStatus::Ordered,
            created_at: supply.created_at,
            received_at: None,
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Supply>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM supplies WHERE id = ?1", SUPPLY_COLUMNS);
        let supply = conn
            .query_row(&sql, params![id], |row| self.map_row(row))
            .optional()?;
        Ok(supply)
    }

    /// 全部到货记录（最新在前）
    pub fn list_all(&self) -> RepositoryResult<Vec<Supply>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM supplies ORDER BY created_at DESC, id DESC",
            SUPPLY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let supplies = stmt
            .query_map([], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(supplies)
    }

    /// 在途到货（eta 升序）
    pub fn list_inbound(&self) -> RepositoryResult<Vec<Supply>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM supplies WHERE order_status = ?1 ORDER BY eta ASC, id ASC",
            SUPPLY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let supplies = stmt
            .query_map(params![SupplyStatus::Ordered.to_db_str()], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(supplies)
    }

    /// 到货入库: ordered -> received，并按数量增加库存
    ///
    /// # 返回
    /// - Ok(Supply): 入库后的记录
    /// - Err(NotFound): 记录不存在
    /// - Err(InvalidStateTransition): 已入库
    pub fn mark_received_and_credit(
        &self,
        id: i64,
        received_at: DateTime<Utc>,
    ) -> RepositoryResult<Supply> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let sql = format!("SELECT {} FROM supplies WHERE id = ?1", SUPPLY_COLUMNS);
        let supply = tx
            .query_row(&sql, params![id], |row| self.map_row(row))
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Supply".to_string(),
                id: id.to_string(),
            })?;

        if supply.order_status != SupplyStatus::Ordered {
            return Err(RepositoryError::InvalidStateTransition {
                from: supply.order_status.to_db_str().to_string(),
                to: SupplyStatus::Received.to_db_str().to_string(),
            });
        }

        let received_at_str = format_ts(&received_at);
        tx.execute(
            "UPDATE supplies SET order_status = ?1, received_at = ?2 WHERE id = ?3 AND order_status = ?4",
            params![
                SupplyStatus::Received.to_db_str(),
                received_at_str,
                id,
                SupplyStatus::Ordered.to_db_str(),
            ],
        )?;

        let credited = tx.execute(
            "UPDATE inventory SET quantity = quantity + ?1, updated_at = ?2 WHERE material = ?3",
            params![supply.quantity, received_at_str, supply.material.to_db_str()],
        )?;
        if credited == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Inventory".to_string(),
                id: supply.material.to_string(),
            });
        }

        tx.commit()?;

        Ok(Supply {
            order_status: SupplyStatus::Received,
            received_at: Some(received_at),
            ..supply
        })
    }

    fn map_row(&self, row: &Row) -> SqliteResult<Supply> {
        Ok(Supply {
            id: row.get(0)?,
            material: enum_column(row, 1, Material::parse)?,
            quantity: row.get(2)?,
            supplier_name: row.get(3)?,
            tracking_number: row.get(4)?,
            eta: ts_column(row, 5)?,
            order_status: enum_column(row, 6, SupplyStatus::parse)?,
            created_at: ts_column(row, 7)?,
            received_at: opt_ts_column(row, 8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::repository::inventory_repo::InventoryRepository;
    use chrono::{Duration, TimeZone};

    fn setup() -> (SupplyRepository, InventoryRepository) {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (
            SupplyRepository::new(conn.clone()),
            InventoryRepository::new(conn),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap()
    }

    fn insert(repo: &SupplyRepository, material: Material, quantity: f64, eta_hours: i64) -> Supply {
        repo.insert(&SupplyInsert {
            material,
            quantity,
            supplier_name: "华东化纤",
            tracking_number: None,
            eta: t0() + Duration::hours(eta_hours),
            created_at: t0(),
        })
        .unwrap()
    }

    #[test]
    fn test_list_inbound_sorted_by_eta() {
        let (repo, _) = setup();
        let late = insert(&repo, Material::Pet, 100.0, 10);
        let early = insert(&repo, Material::Eg, 50.0, 2);

        let inbound = repo.list_inbound().unwrap();
        assert_eq!(inbound.iter().map(|s| s.id).collect::<Vec<_>>(), vec![early.id, late.id]);
        assert_eq!(inbound[0].eta, t0() + Duration::hours(2));
    }

    #[test]
    fn test_receive_credits_inventory_once() {
        let (repo, inventory) = setup();
        let supply = insert(&repo, Material::Pta, 750.0, 3);

        let received = repo.mark_received_and_credit(supply.id, t0()).unwrap();
        assert_eq!(received.order_status, SupplyStatus::Received);
        assert_eq!(received.received_at, Some(t0()));
        assert_eq!(inventory.quantity_of(Material::Pta).unwrap(), 750.0);
        assert!(repo.list_inbound().unwrap().is_empty());

        assert!(matches!(
            repo.mark_received_and_credit(supply.id, t0()),
            Err(RepositoryError::InvalidStateTransition { .. })
        ));
        assert_eq!(inventory.quantity_of(Material::Pta).unwrap(), 750.0);
    }

    #[test]
    fn test_receive_missing_supply() {
        let (repo, _) = setup();
        assert!(matches!(
            repo.mark_received_and_credit(42, t0()),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
