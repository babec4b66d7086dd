// ==========================================
// 瓶装产线排产系统 - 引擎层错误类型
// ==========================================
// 读失败: 本次调用整体失败 (不产出部分排产)
// 写失败: 推进中断, 已完成的写入保留
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("读取生产数据失败: {0}")]
    StoreRead(#[source] RepositoryError),

    #[error("写入生产数据失败 (order_id={order_id}): {source}")]
    StoreWrite {
        order_id: i64,
        #[source]
        source: RepositoryError,
    },

    #[error("生产数据不一致: {0}")]
    InconsistentState(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
