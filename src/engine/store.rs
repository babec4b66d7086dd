// ==========================================
// 瓶装产线排产系统 - 生产数据存取接口
// ==========================================
// 职责: 引擎层定义 trait, 仓储层实现 (依赖倒置)
// 说明: 引擎只通过此接口读取订单/到货/库存, 并写回状态迁移与库存增减
// ==========================================

use crate::domain::inventory::InventoryRow;
use crate::domain::order::PurchaseOrder;
use crate::domain::supply::Supply;
use crate::domain::types::{Material, ProductType, ProductionStatus};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 生产数据存取
///
/// # 实现说明
/// - `SqliteProductionStore` 为 SQLite 实现
/// - `adjust_inventory` 必须是单原料原子操作，且不得把库存扣成负数
#[async_trait]
pub trait ProductionStore: Send + Sync {
    /// 按生产状态查询订单（created_at 升序）
    async fn list_orders_by_status(
        &self,
        status: ProductionStatus,
    ) -> RepositoryResult<Vec<PurchaseOrder>>;

    /// 查询某产线最早创建的待生产订单
    async fn find_oldest_pending_order(
        &self,
        product_type: ProductType,
    ) -> RepositoryResult<Option<PurchaseOrder>>;

    /// 查询在途 (ordered) 到货（eta 升序）
    async fn list_inbound_supplies(&self) -> RepositoryResult<Vec<Supply>>;

    /// 读取库存（每种原料一行）
    async fn load_inventory(&self) -> RepositoryResult<Vec<InventoryRow>>;

    /// in_production -> completed
    async fn mark_order_completed(
        &self,
        order_id: i64,
        completed_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;

    /// pending -> in_production
    async fn mark_order_started(&self, order_id: i64, started_at: DateTime<Utc>) -> RepositoryResult<()>;

    /// 单原料库存原子增减（delta 为负表示扣减）
    async fn adjust_inventory(&self, material: Material, delta: f64) -> RepositoryResult<()>;
}
