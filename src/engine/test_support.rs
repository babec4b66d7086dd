// ==========================================
// 引擎单元测试辅助: 内存版 ProductionStore
// ==========================================
// 支持故障注入: 指定原料的扣减失败 / 标记开工失败
// ==========================================

use crate::domain::inventory::InventoryRow;
use crate::domain::order::PurchaseOrder;
use crate::domain::supply::Supply;
use crate::domain::types::{Material, ProductType, ProductionStatus, SupplyStatus};
use crate::engine::store::ProductionStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryState {
    pub orders: Vec<PurchaseOrder>,
    pub supplies: Vec<Supply>,
    pub inventory: Vec<InventoryRow>,
    /// 该原料的扣减（delta < 0）直接失败
    pub fail_deduct_for: Option<Material>,
    /// 该原料的补回（delta > 0）也失败
    pub fail_credit_for: Option<Material>,
    pub fail_mark_started: bool,
    pub fail_reads: bool,
    /// 全部库存调整调用记录
    pub adjust_calls: Vec<(Material, f64)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new(orders: Vec<PurchaseOrder>, inventory: Vec<InventoryRow>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                orders,
                inventory,
                ..Default::default()
            }),
        }
    }

    pub fn order(&self, id: i64) -> PurchaseOrder {
        let state = self.state.lock().unwrap();
        state.orders.iter().find(|o| o.id == id).cloned().unwrap()
    }

    pub fn stock(&self, material: Material) -> f64 {
        let state = self.state.lock().unwrap();
        state
            .inventory
            .iter()
            .find(|r| r.material == material)
            .map(|r| r.quantity)
            .unwrap_or(0.0)
    }

    fn read_guard(&self) -> RepositoryResult<std::sync::MutexGuard<'_, MemoryState>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(RepositoryError::DatabaseQueryError("注入的读取失败".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl ProductionStore for MemoryStore {
    async fn list_orders_by_status(
        &self,
        status: ProductionStatus,
    ) -> RepositoryResult<Vec<PurchaseOrder>> {
        let state = self.read_guard()?;
        let mut orders: Vec<PurchaseOrder> = state
            .orders
            .iter()
            .filter(|o| o.production_status == status)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn find_oldest_pending_order(
        &self,
        product_type: ProductType,
    ) -> RepositoryResult<Option<PurchaseOrder>> {
        let pending = self.list_orders_by_status(ProductionStatus::Pending).await?;
        Ok(pending.into_iter().find(|o| o.product_type == product_type))
    }

    async fn list_inbound_supplies(&self) -> RepositoryResult<Vec<Supply>> {
        let state = self.read_guard()?;
        let mut supplies: Vec<Supply> = state
            .supplies
            .iter()
            .filter(|s| s.order_status == SupplyStatus::Ordered)
            .cloned()
            .collect();
        supplies.sort_by(|a, b| a.eta.cmp(&b.eta));
        Ok(supplies)
    }

    async fn load_inventory(&self) -> RepositoryResult<Vec<InventoryRow>> {
        Ok(self.read_guard()?.inventory.clone())
    }

    async fn mark_order_completed(
        &self,
        order_id: i64,
        completed_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "PurchaseOrder".to_string(),
                id: order_id.to_string(),
            })?;
        order.production_status = ProductionStatus::Completed;
        order.completed_at = Some(completed_at);
        Ok(())
    }

    async fn mark_order_started(&self, order_id: i64, started_at: DateTime<Utc>) -> RepositoryResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mark_started {
            return Err(RepositoryError::DatabaseQueryError("注入的写入失败".to_string()));
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "PurchaseOrder".to_string(),
                id: order_id.to_string(),
            })?;
        order.production_status = ProductionStatus::InProduction;
        order.started_at = Some(started_at);
        Ok(())
    }

    async fn adjust_inventory(&self, material: Material, delta: f64) -> RepositoryResult<()> {
        let mut state = self.state.lock().unwrap();
        state.adjust_calls.push((material, delta));

        if delta < 0.0 && state.fail_deduct_for == Some(material) {
            return Err(RepositoryError::DatabaseQueryError("注入的扣减失败".to_string()));
        }
        if delta > 0.0 && state.fail_credit_for == Some(material) {
            return Err(RepositoryError::DatabaseQueryError("注入的补回失败".to_string()));
        }

        let row = state
            .inventory
            .iter_mut()
            .find(|r| r.material == material)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Inventory".to_string(),
                id: material.to_string(),
            })?;
        if row.quantity + delta < 0.0 {
            return Err(RepositoryError::InsufficientInventory {
                material: material.to_string(),
                available: row.quantity,
                requested: -delta,
            });
        }
        row.quantity += delta;
        Ok(())
    }
}
