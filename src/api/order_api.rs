// ==========================================
// 瓶装产线排产系统 - 订单 API
// ==========================================
// 职责: 订单录入 (校验 + 写入 + 操作日志) 与查询
// 红线: 新订单一律 pending; 状态只由推进引擎修改
// ==========================================

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::api::audit;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::order::{NewPurchaseOrder, PurchaseOrder};
use crate::domain::production_log::{ProductionActionType, ProductionLog};
use crate::domain::timestamp::now_millis;
use crate::domain::types::ProductType;
use crate::repository::order_repo::PurchaseOrderRepository;
use crate::repository::production_log_repo::ProductionLogRepository;

pub struct OrderApi {
    order_repo: Arc<PurchaseOrderRepository>,
    log_repo: Arc<ProductionLogRepository>,
}

impl OrderApi {
    pub fn new(order_repo: Arc<PurchaseOrderRepository>, log_repo: Arc<ProductionLogRepository>) -> Self {
        Self { order_repo, log_repo }
    }

    /// 全部订单（最新在前）
    pub fn list_orders(&self) -> ApiResult<Vec<PurchaseOrder>> {
        Ok(self.order_repo.list_all()?)
    }

    /// 录入订单
    ///
    /// # 校验
    /// - product_type 必须是已知产线
    /// - customer_name 去空白后非空
    /// - quantity 为正整数
    pub fn create_order(&self, request: NewPurchaseOrder, actor: &str) -> ApiResult<PurchaseOrder> {
        let product_type = ProductType::parse(&request.product_type).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "无效的产品类型: {}（可选: liter, gallon）",
                request.product_type
            ))
        })?;

        let customer_name = request.customer_name.trim();
        if customer_name.is_empty() {
            return Err(ApiError::InvalidInput("客户名称不能为空".to_string()));
        }

        let quantity = validate_quantity(request.quantity)?;
        let notes = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let order = self
            .order_repo
            .insert(product_type, customer_name, quantity, notes, now_millis())?;

        info!(
            order_id = order.id,
            product_type = %order.product_type,
            quantity = order.quantity,
            "订单已录入"
        );

        audit::record(
            &self.log_repo,
            &ProductionLog::new(
                ProductionActionType::CreateOrder,
                order.created_at,
                actor,
                Some(json!({
                    "order_id": order.id,
                    "product_type": order.product_type,
                    "customer_name": order.customer_name,
                    "quantity": order.quantity,
                })),
                None,
            ),
        );

        Ok(order)
    }
}

/// 单个订单数量上限 (gallon 产能下约 76 年)
pub const MAX_ORDER_QUANTITY: i64 = 1_000_000_000;

fn validate_quantity(quantity: f64) -> ApiResult<i64> {
    if !quantity.is_finite() || quantity.fract() != 0.0 {
        return Err(ApiError::InvalidInput(format!("数量必须为整数: {}", quantity)));
    }
    if quantity <= 0.0 {
        return Err(ApiError::InvalidInput(format!("数量必须大于0: {}", quantity)));
    }
    if quantity > MAX_ORDER_QUANTITY as f64 {
        return Err(ApiError::InvalidInput(format!(
            "数量超出上限 {}: {}",
            MAX_ORDER_QUANTITY, quantity
        )));
    }
    Ok(quantity as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(12.0).unwrap(), 12);
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-3.0).is_err());
        assert!(validate_quantity(1.5).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
        assert_eq!(validate_quantity(MAX_ORDER_QUANTITY as f64).unwrap(), MAX_ORDER_QUANTITY);
        assert!(validate_quantity(MAX_ORDER_QUANTITY as f64 + 1.0).is_err());
        assert!(validate_quantity(1e13).is_err());
    }
}
