// ==========================================
// 瓶装产线排产系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("产线配置缺失: product_type={0}")]
    MissingLine(String),

    #[error("产线配置无效 (product_type={product_type}): {reason}")]
    InvalidLine { product_type: String, reason: String },

    #[error("配置格式错误: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置读取失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
