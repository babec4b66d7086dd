// ==========================================
// 瓶装产线排产系统 - ProductionStore 的 SQLite 实现
// ==========================================
// 职责: 把引擎层的存取接口落到各仓储上
// 说明: rusqlite 为同步 API, 每次调用持锁时间很短, 直接在 async fn 内执行
// ==========================================

use crate::domain::inventory::InventoryRow;
use crate::domain::order::PurchaseOrder;
use crate::domain::supply::Supply;
use crate::domain::types::{Material, ProductType, ProductionStatus};
use crate::engine::store::ProductionStore;
use crate::repository::error::RepositoryResult;
use crate::repository::inventory_repo::InventoryRepository;
use crate::repository::order_repo::PurchaseOrderRepository;
use crate::repository::supply_repo::SupplyRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct SqliteProductionStore {
    orders: PurchaseOrderRepository,
    supplies: SupplyRepository,
    inventory: InventoryRepository,
}

impl SqliteProductionStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            orders: PurchaseOrderRepository::new(conn.clone()),
            supplies: SupplyRepository::new(conn.clone()),
            inventory: InventoryRepository::new(conn),
        }
    }
}

#[async_trait]
impl ProductionStore for SqliteProductionStore {
    async fn list_orders_by_status(
        &self,
        status: ProductionStatus,
    ) -> RepositoryResult<Vec<PurchaseOrder>> {
        self.orders.list_by_status(status)
    }

    async fn find_oldest_pending_order(
        &self,
        product_type: ProductType,
    ) -> RepositoryResult<Option<PurchaseOrder>> {
        self.orders.find_oldest_pending(product_type)
    }

    async fn list_inbound_supplies(&self) -> RepositoryResult<Vec<Supply>> {
        self.supplies.list_inbound()
    }

    async fn load_inventory(&self) -> RepositoryResult<Vec<InventoryRow>> {
        self.inventory.load()
    }

    async fn mark_order_completed(
        &self,
        order_id: i64,
        completed_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        self.orders.mark_completed(order_id, completed_at)
    }

    async fn mark_order_started(&self, order_id: i64, started_at: DateTime<Utc>) -> RepositoryResult<()> {
        self.orders.mark_started(order_id, started_at)
    }

    async fn adjust_inventory(&self, material: Material, delta: f64) -> RepositoryResult<()> {
        self.inventory.adjust_quantity(material, delta)
    }
}
