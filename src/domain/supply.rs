// ==========================================
// 瓶装产线排产系统 - 原料到货领域模型
// ==========================================
// 对齐: supplies 表
// 状态流转: ordered -> received (仅一次，入库时同步增加库存)
// ==========================================

use crate::domain::timestamp::{serde_millis, serde_millis_opt};
use crate::domain::types::{Material, SupplyStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Supply - 原料采购/到货记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    pub id: i64,
    pub material: Material,
    pub quantity: f64,                        // 数量 (正数)
    pub supplier_name: Option<String>,        // 供应商
    pub tracking_number: Option<String>,      // 物流单号
    #[serde(with = "serde_millis")]
    pub eta: DateTime<Utc>,                   // 预计到货时间
    pub order_status: SupplyStatus,           // 到货状态
    #[serde(with = "serde_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_millis_opt")]
    pub received_at: Option<DateTime<Utc>>,
}

// ==========================================
// NewSupply - 到货录入请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupply {
    pub material: String,
    pub quantity: f64,
    pub supplier_name: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub eta: DateTime<Utc>,
}
