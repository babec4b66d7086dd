// ==========================================
// 瓶装产线排产系统 - 配置层
// ==========================================
// 职责: 产线配置 (不可变值) + config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod production_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use production_config::{ProductLineConfig, ProductionConfig};
