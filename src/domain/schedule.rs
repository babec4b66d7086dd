// ==========================================
// 瓶装产线排产系统 - 排产预测输出模型
// ==========================================
// 用途: 生产状态看板 (按产线分组)
// 序列化: 订单字段 snake_case, 预测字段 camelCase (与前端约定一致)
// ==========================================

use crate::domain::order::PurchaseOrder;
use crate::domain::timestamp::{serde_millis, serde_millis_opt};
use crate::domain::types::{ProductType, ScheduleStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// CurrentOrder - 产线当前在产订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentOrder {
    pub id: i64,
    pub product_type: ProductType,
    pub customer_name: String,
    pub quantity: i64,
    pub notes: Option<String>,
    #[serde(with = "serde_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_millis")]
    pub started_at: DateTime<Utc>,
    /// None: 完工时刻超出可表示范围
    #[serde(rename = "expectedCompletion", with = "serde_millis_opt")]
    pub expected_completion: Option<DateTime<Utc>>,
}

impl CurrentOrder {
    pub fn from_order(
        order: &PurchaseOrder,
        started_at: DateTime<Utc>,
        expected_completion: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: order.id,
            product_type: order.product_type,
            customer_name: order.customer_name.clone(),
            quantity: order.quantity,
            notes: order.notes.clone(),
            created_at: order.created_at,
            started_at,
            expected_completion,
        }
    }
}

// ==========================================
// ScheduledOrder - 待生产订单 + 预测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOrder {
    pub id: i64,
    pub product_type: ProductType,
    pub customer_name: String,
    pub quantity: i64,
    pub notes: Option<String>,
    #[serde(with = "serde_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expectedStart", with = "serde_millis_opt")]
    pub expected_start: Option<DateTime<Utc>>,
    #[serde(rename = "expectedCompletion", with = "serde_millis_opt")]
    pub expected_completion: Option<DateTime<Utc>>,
    #[serde(rename = "scheduleStatus")]
    pub schedule_status: ScheduleStatus,
}

impl ScheduledOrder {
    /// 已排定（有开工/完工时间）
    pub fn scheduled(
        order: &PurchaseOrder,
        status: ScheduleStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self::build(order, status, Some(start), Some(end))
    }

    /// 无法满足（无时间）
    pub fn unable_to_fulfill(order: &PurchaseOrder) -> Self {
        Self::build(order, ScheduleStatus::UnableToFulfill, None, None)
    }

    fn build(
        order: &PurchaseOrder,
        schedule_status: ScheduleStatus,
        expected_start: Option<DateTime<Utc>>,
        expected_completion: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: order.id,
            product_type: order.product_type,
            customer_name: order.customer_name.clone(),
            quantity: order.quantity,
            notes: order.notes.clone(),
            created_at: order.created_at,
            expected_start,
            expected_completion,
            schedule_status,
        }
    }
}

// ==========================================
// LineStatus - 单条产线状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineStatus {
    #[serde(rename = "currentOrder")]
    pub current_order: Option<CurrentOrder>,
    #[serde(rename = "upcomingOrders")]
    pub upcoming_orders: Vec<ScheduledOrder>,
}

// ==========================================
// ProductionStatusReport - 生产状态看板
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionStatusReport {
    pub lines: BTreeMap<ProductType, LineStatus>,
}

impl ProductionStatusReport {
    /// 每条产线都有一项（可能为空）
    pub fn empty() -> Self {
        Self {
            lines: ProductType::ALL
                .iter()
                .map(|pt| (*pt, LineStatus::default()))
                .collect(),
        }
    }

    pub fn line(&self, product_type: ProductType) -> Option<&LineStatus> {
        self.lines.get(&product_type)
    }
}
