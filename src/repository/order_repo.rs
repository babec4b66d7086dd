// ==========================================
// 瓶装产线排产系统 - 采购订单数据仓储
// ==========================================
// 对齐: purchase_orders 表
// 红线: Repository 不含业务逻辑; 状态迁移以 WHERE 条件保证只从合法前态出发
// ==========================================

use crate::domain::order::PurchaseOrder;
use crate::domain::timestamp::format_ts;
use crate::domain::types::{ProductType, ProductionStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{enum_column, opt_ts_column, ts_column};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const ORDER_COLUMNS: &str = r#"
    id, product_type, customer_name, quantity, notes,
    production_status, created_at, started_at, completed_at
"#;

// ==========================================
// PurchaseOrderRepository - 采购订单仓储
// ==========================================
pub struct PurchaseOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PurchaseOrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入订单，返回带自增 id 的完整记录
    pub fn insert(
        &self,
        product_type: ProductType,
        customer_name: &str,
        quantity: i64,
        notes: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<PurchaseOrder> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO purchase_orders (
                product_type, customer_name, quantity, notes, production_status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                product_type.to_db_str(),
                customer_name,
                quantity,
                notes,
                ProductionStatus::Pending.to_db_str(),
                format_ts(&created_at),
            ],
        )?;

        Ok(PurchaseOrder {
            id: conn.last_insert_rowid(),
            product_type,
            customer_name: customer_name.to_string(),
            quantity,
            notes: notes.map(str::to_string),
            production_status: ProductionStatus::Pending,
            created_at,
            started_at: None,
            completed_at: None,
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<PurchaseOrder>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM purchase_orders WHERE id = ?1", ORDER_COLUMNS);
        let order = conn
            .query_row(&sql, params![id], |row| self.map_row(row))
            .optional()?;
        Ok(order)
    }

    /// 全部订单（最新在前）
    pub fn list_all(&self) -> RepositoryResult<Vec<PurchaseOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM purchase_orders ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map([], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }

    /// 按生产状态查询（created_at 升序，同刻按 id）
    pub fn list_by_status(&self, status: ProductionStatus) -> RepositoryResult<Vec<PurchaseOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM purchase_orders WHERE production_status = ?1 ORDER BY created_at ASC, id ASC",
            ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params![status.to_db_str()], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }

    /// 某产线最早创建的待生产订单
    pub fn find_oldest_pending(&self, product_type: ProductType) -> RepositoryResult<Option<PurchaseOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM purchase_orders
            WHERE production_status = ?1 AND product_type = ?2
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
            ORDER_COLUMNS
        );
        let order = conn
            .query_row(
                &sql,
                params![ProductionStatus::Pending.to_db_str(), product_type.to_db_str()],
                |row| self.map_row(row),
            )
            .optional()?;
        Ok(order)
    }

    /// in_production -> completed
    pub fn mark_completed(&self, id: i64, completed_at: DateTime<Utc>) -> RepositoryResult<()> {
        self.transition(
            id,
            ProductionStatus::InProduction,
            ProductionStatus::Completed,
            "completed_at",
            completed_at,
        )
    }

    /// pending -> in_production
    pub fn mark_started(&self, id: i64, started_at: DateTime<Utc>) -> RepositoryResult<()> {
        self.transition(
            id,
            ProductionStatus::Pending,
            ProductionStatus::InProduction,
            "started_at",
            started_at,
        )
    }

    fn transition(
        &self,
        id: i64,
        from: ProductionStatus,
        to: ProductionStatus,
        ts_column_name: &str,
        ts: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let sql = format!(
            "UPDATE purchase_orders SET production_status = ?1, {} = ?2 WHERE id = ?3 AND production_status = ?4",
            ts_column_name
        );
        let rows = conn.execute(
            &sql,
            params![to.to_db_str(), format_ts(&ts), id, from.to_db_str()],
        )?;
        if rows == 1 {
            return Ok(());
        }

        // 区分不存在与前态不符
        let current: Option<String> = conn
            .query_row(
                "SELECT production_status FROM purchase_orders WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match current {
            None => Err(RepositoryError::NotFound {
                entity: "PurchaseOrder".to_string(),
                id: id.to_string(),
            }),
            Some(status) => Err(RepositoryError::InvalidStateTransition {
                from: status,
                to: to.to_db_str().to_string(),
            }),
        }
    }

    fn map_row(&self, row: &Row) -> SqliteResult<PurchaseOrder> {
        Ok(PurchaseOrder {
            id: row.get(0)?,
            product_type: enum_column(row, 1, ProductType::parse)?,
            customer_name: row.get(2)?,
            quantity: row.get(3)?,
            notes: row.get(4)?,
            production_status: enum_column(row, 5, ProductionStatus::parse)?,
            created_at: ts_column(row, 6)?,
            started_at: opt_ts_column(row, 7)?,
            completed_at: opt_ts_column(row, 8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use chrono::{Duration, TimeZone};

    fn setup() -> PurchaseOrderRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        PurchaseOrderRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_and_list_order() {
        let repo = setup();
        let a = repo.insert(ProductType::Liter, "甲", 100, None, t0()).unwrap();
        let b = repo
            .insert(ProductType::Gallon, "乙", 50, Some("加急"), t0() + Duration::minutes(1))
            .unwrap();

        let all = repo.list_all().unwrap();
        assert_eq!(all.iter().map(|o| o.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let pending = repo.list_by_status(ProductionStatus::Pending).unwrap();
        assert_eq!(pending.iter().map(|o| o.id).collect::<Vec<_>>(), vec![a.id, b.id]);
        assert_eq!(pending[1].notes.as_deref(), Some("加急"));
        assert_eq!(pending[0].created_at, t0());
    }

    #[test]
    fn test_find_oldest_pending_per_line() {
        let repo = setup();
        repo.insert(ProductType::Gallon, "甲", 10, None, t0()).unwrap();
        let second = repo
            .insert(ProductType::Liter, "乙", 10, None, t0() + Duration::minutes(5))
            .unwrap();
        repo.insert(ProductType::Liter, "丙", 10, None, t0() + Duration::minutes(9))
            .unwrap();

        let oldest = repo.find_oldest_pending(ProductType::Liter).unwrap().unwrap();
        assert_eq!(oldest.id, second.id);
    }

    #[test]
    fn test_transitions_require_previous_status() {
        let repo = setup();
        let order = repo.insert(ProductType::Liter, "甲", 10, None, t0()).unwrap();

        assert!(matches!(
            repo.mark_completed(order.id, t0()),
            Err(RepositoryError::InvalidStateTransition { .. })
        ));

        repo.mark_started(order.id, t0() + Duration::hours(1)).unwrap();
        repo.mark_completed(order.id, t0() + Duration::hours(2)).unwrap();

        let stored = repo.find_by_id(order.id).unwrap().unwrap();
        assert_eq!(stored.production_status, ProductionStatus::Completed);
        assert_eq!(stored.started_at, Some(t0() + Duration::hours(1)));
        assert_eq!(stored.completed_at, Some(t0() + Duration::hours(2)));

        assert!(matches!(
            repo.mark_started(999, t0()),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_quantity_check_constraint() {
        let repo = setup();
        assert!(matches!(
            repo.insert(ProductType::Liter, "甲", 0, None, t0()),
            Err(RepositoryError::CheckConstraintViolation(_))
        ));
    }
}
