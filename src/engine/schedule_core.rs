// ==========================================
// 瓶装产线排产系统 - 排产公共计算
// ==========================================
// 预测 (ScheduleWalker) 与推进 (AdvanceEngine) 共用的原料/时长计算
// 两种模式只在“可用原料来源”上不同:
// - StockOnly: 仅真实库存 (推进)
// - StockAndInbound: 库存 + 在途到货 (预测)
// ==========================================

use crate::config::ProductionConfig;
use crate::domain::order::PurchaseOrder;
use crate::domain::types::MaterialAmounts;
use crate::engine::ledger::MaterialLedger;
use crate::engine::supply_claim::{ClaimOutcome, InboundSupplyQueue, SupplyClaim};
use chrono::{DateTime, Duration, Utc};

/// 可用原料来源
#[derive(Debug, Clone, Copy)]
pub enum MaterialSource<'a> {
    StockOnly,
    StockAndInbound(&'a InboundSupplyQueue),
}

/// 单个订单的需求
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequirement {
    pub required: MaterialAmounts,
    /// None: 时长超出可表示范围，订单无法排入
    pub duration: Option<Duration>,
}

impl OrderRequirement {
    /// 自 started_at 开工的预计完工时刻
    pub fn completion_from(&self, started_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration
            .and_then(|duration| started_at.checked_add_signed(duration))
    }
}

/// 计算订单的原料需求与生产时长
pub fn order_requirement(config: &ProductionConfig, order: &PurchaseOrder) -> OrderRequirement {
    let line = config.line(order.product_type);
    OrderRequirement {
        required: line.required_materials(order.quantity),
        duration: line.production_duration(order.quantity),
    }
}

/// 原料判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialPlan {
    /// 库存直接覆盖
    FromStock,
    /// 库存不足，但在途到货可补齐
    WithInbound(SupplyClaim),
    /// 无法覆盖：shortage 为库存缺口，remaining 为计入可用来源后仍缺的部分
    Shortfall {
        shortage: MaterialAmounts,
        remaining: MaterialAmounts,
    },
}

/// 判定订单原料能否满足（只读）
pub fn assess_materials(
    ledger: &MaterialLedger,
    required: &MaterialAmounts,
    source: MaterialSource<'_>,
) -> MaterialPlan {
    let shortage = ledger.shortage(required);
    if shortage.is_empty() {
        return MaterialPlan::FromStock;
    }

    match source {
        MaterialSource::StockOnly => MaterialPlan::Shortfall {
            shortage,
            remaining: shortage,
        },
        MaterialSource::StockAndInbound(queue) => match queue.resolve(&shortage) {
            ClaimOutcome::Resolved(claim) => MaterialPlan::WithInbound(claim),
            ClaimOutcome::Unresolved { remaining } => MaterialPlan::Shortfall { shortage, remaining },
        },
    }
}

/// 将判定结果落到台账
///
/// - FromStock: 扣减需求
/// - WithInbound: 先补记被认领到货的整单数量，再扣减需求（多余部分留给后续订单）
/// - Shortfall: 不做任何修改
///
/// 认领记录从队列移除由调用方负责（`InboundSupplyQueue::commit`）。
pub fn commit_materials(ledger: &mut MaterialLedger, required: &MaterialAmounts, plan: &MaterialPlan) {
    match plan {
        MaterialPlan::FromStock => ledger.deduct(required),
        MaterialPlan::WithInbound(claim) => {
            ledger.credit(&claim.credited);
            ledger.deduct(required);
        }
        MaterialPlan::Shortfall { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Material;
    use crate::engine::supply_claim::InboundSupply;
    use chrono::{TimeZone, Utc};

    fn queue() -> InboundSupplyQueue {
        InboundSupplyQueue::new(vec![InboundSupply {
            supply_id: 7,
            material: Material::Pet,
            quantity: 1_000.0,
            eta: Utc.with_ymd_and_hms(2026, 1, 21, 0, 0, 0).unwrap(),
        }])
    }

    #[test]
    fn test_stock_only_never_uses_inbound() {
        let ledger = MaterialLedger::new(MaterialAmounts::new(100.0, 100.0, 100.0));
        let required = MaterialAmounts::new(200.0, 0.0, 0.0);

        let plan = assess_materials(&ledger, &required, MaterialSource::StockOnly);
        assert_eq!(
            plan,
            MaterialPlan::Shortfall {
                shortage: MaterialAmounts::new(100.0, 0.0, 0.0),
                remaining: MaterialAmounts::new(100.0, 0.0, 0.0),
            }
        );

        let q = queue();
        let plan = assess_materials(&ledger, &required, MaterialSource::StockAndInbound(&q));
        assert!(matches!(plan, MaterialPlan::WithInbound(_)));
    }

    #[test]
    fn test_commit_with_inbound_keeps_surplus_in_ledger() {
        let mut ledger = MaterialLedger::new(MaterialAmounts::new(100.0, 100.0, 100.0));
        let required = MaterialAmounts::new(200.0, 50.0, 0.0);
        let q = queue();

        let plan = assess_materials(&ledger, &required, MaterialSource::StockAndInbound(&q));
        commit_materials(&mut ledger, &required, &plan);

        // 100 + 1000 - 200 = 900
        assert_eq!(ledger.get(Material::Pet), 900.0);
        assert_eq!(ledger.get(Material::Pta), 50.0);
    }

    #[test]
    fn test_completion_from_out_of_range() {
        let config = ProductionConfig::default();
        let start = Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap();
        let mut order = PurchaseOrder {
            id: 1,
            product_type: crate::domain::types::ProductType::Liter,
            customer_name: "客户".to_string(),
            quantity: 2_000,
            notes: None,
            production_status: crate::domain::types::ProductionStatus::Pending,
            created_at: start,
            started_at: None,
            completed_at: None,
        };

        let requirement = order_requirement(&config, &order);
        assert_eq!(requirement.completion_from(start), Some(start + Duration::hours(1)));

        // 10^13 件 liter = 50 亿小时，超出 DateTime 范围
        order.quantity = 10_000_000_000_000;
        let requirement = order_requirement(&config, &order);
        assert_eq!(requirement.completion_from(start), None);
    }

    #[test]
    fn test_shortfall_commit_is_noop() {
        let mut ledger = MaterialLedger::new(MaterialAmounts::new(1.0, 1.0, 1.0));
        let required = MaterialAmounts::new(5.0, 0.0, 0.0);
        let plan = assess_materials(&ledger, &required, MaterialSource::StockOnly);
        commit_materials(&mut ledger, &required, &plan);
        assert_eq!(ledger.snapshot(), MaterialAmounts::new(1.0, 1.0, 1.0));
    }
}
