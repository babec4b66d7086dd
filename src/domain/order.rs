// ==========================================
// 瓶装产线排产系统 - 采购订单领域模型
// ==========================================
// 对齐: purchase_orders 表
// 红线: 订单状态只由推进引擎修改; completed 后不可再变
// ==========================================

use crate::domain::timestamp::{serde_millis, serde_millis_opt};
use crate::domain::types::{ProductType, ProductionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// PurchaseOrder - 采购订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,                                // 订单ID (自增)
    pub product_type: ProductType,              // 产品类型 (决定产线)
    pub customer_name: String,                  // 客户名称
    pub quantity: i64,                          // 数量 (正整数)
    pub notes: Option<String>,                  // 备注
    pub production_status: ProductionStatus,    // 生产状态
    #[serde(with = "serde_millis")]
    pub created_at: DateTime<Utc>,              // 创建时间 (FIFO 依据)
    #[serde(with = "serde_millis_opt")]
    pub started_at: Option<DateTime<Utc>>,      // 开工时间
    #[serde(with = "serde_millis_opt")]
    pub completed_at: Option<DateTime<Utc>>,    // 完工时间
}

impl PurchaseOrder {
    pub fn is_in_production(&self) -> bool {
        self.production_status == ProductionStatus::InProduction
    }
}

// ==========================================
// NewPurchaseOrder - 订单录入请求
// ==========================================
// quantity 保留 f64：录入端需要区分“非整数”与“非正数”两种校验失败
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub product_type: String,
    pub customer_name: String,
    pub quantity: f64,
    #[serde(default)]
    pub notes: Option<String>,
}
