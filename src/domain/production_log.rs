// ==========================================
// 瓶装产线排产系统 - 生产操作日志
// ==========================================
// 红线: 所有写入必须记录 (录入 / 到货 / 推进)
// 对齐: production_log 表
// ==========================================

use crate::domain::timestamp::serde_millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ProductionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLog {
    pub action_id: String,               // 日志ID (UUID)
    pub action_type: String,             // 操作类型 (存储为字符串)
    #[serde(with = "serde_millis")]
    pub action_ts: DateTime<Utc>,        // 操作时间
    pub actor: String,                   // 操作人
    pub payload_json: Option<JsonValue>, // 操作负载
    pub detail: Option<String>,          // 详细描述
}

impl ProductionLog {
    /// 构造新日志（自动生成 action_id）
    pub fn new(
        action_type: ProductionActionType,
        action_ts: DateTime<Utc>,
        actor: &str,
        payload_json: Option<JsonValue>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            action_ts,
            actor: actor.to_string(),
            payload_json,
            detail,
        }
    }
}

// ==========================================
// ProductionActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionActionType {
    CreateOrder,      // 录入订单
    CreateSupply,     // 录入采购
    ReceiveSupply,    // 到货入库
    AdvanceProduction, // 生产推进（完工 + 开工）
}

impl fmt::Display for ProductionActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionActionType::CreateOrder => write!(f, "CREATE_ORDER"),
            ProductionActionType::CreateSupply => write!(f, "CREATE_SUPPLY"),
            ProductionActionType::ReceiveSupply => write!(f, "RECEIVE_SUPPLY"),
            ProductionActionType::AdvanceProduction => write!(f, "ADVANCE_PRODUCTION"),
        }
    }
}
