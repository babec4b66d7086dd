// ==========================================
// 瓶装产线排产系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod inventory_repo;
pub mod order_repo;
pub mod production_log_repo;
pub mod production_store;
mod row_mapping;
pub mod supply_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
pub use order_repo::PurchaseOrderRepository;
pub use production_log_repo::ProductionLogRepository;
pub use production_store::SqliteProductionStore;
pub use supply_repo::{SupplyInsert, SupplyRepository};
