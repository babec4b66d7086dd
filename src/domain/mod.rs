// ==========================================
// 瓶装产线排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod inventory;
pub mod order;
pub mod production_log;
pub mod schedule;
pub mod supply;
pub mod timestamp;
pub mod types;

// 重导出核心类型
pub use inventory::{inventory_amounts, InventoryRow};
pub use order::{NewPurchaseOrder, PurchaseOrder};
pub use production_log::{ProductionActionType, ProductionLog};
pub use schedule::{CurrentOrder, LineStatus, ProductionStatusReport, ScheduledOrder};
pub use supply::{NewSupply, Supply};
pub use types::{
    Material, MaterialAmounts, ProductType, ProductionStatus, ScheduleStatus, SupplyStatus,
};
