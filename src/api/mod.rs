// ==========================================
// 瓶装产线排产系统 - API层
// ==========================================
// 职责: 对外接口 (CLI 调用), 参数校验 + 编排仓储/引擎 + 操作日志
// ==========================================

pub mod audit;
pub mod error;
pub mod inventory_api;
pub mod order_api;
pub mod production_api;
pub mod supply_api;

// 重导出
pub use error::{ApiError, ApiResult};
pub use inventory_api::InventoryApi;
pub use order_api::OrderApi;
pub use production_api::{HealthStatus, ProductionApi};
pub use supply_api::SupplyApi;
