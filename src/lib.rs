// ==========================================
// 瓶装产线排产系统 - 核心库
// ==========================================
// 两条产线 (1L / 1 加仑), 三种原料 (PET / PTA / EG)
// - 排产预测: 只读, 按 FIFO 推演每个订单的开工/完工时间
// - 生产推进: 完工扫描 + 空闲产线开工 + 真实库存扣减
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 产线配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    Material, MaterialAmounts, ProductType, ProductionStatus, ScheduleStatus, SupplyStatus,
};

// 领域实体
pub use domain::{
    InventoryRow, NewPurchaseOrder, NewSupply, ProductionLog, ProductionStatusReport,
    PurchaseOrder, Supply,
};

// 配置
pub use config::{ConfigManager, ProductionConfig};

// 引擎
pub use engine::{AdvanceEngine, AdvanceReport, ProductionStore, ScheduleWalker};

// API
pub use api::{InventoryApi, OrderApi, ProductionApi, SupplyApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "瓶装产线排产系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
