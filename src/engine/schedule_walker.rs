// ==========================================
// 瓶装产线排产系统 - 排产预测引擎
// ==========================================
// 职责: 纯预测, 不写任何持久化数据
// 输入: 库存 + 在产订单 + 待生产订单 (created_at 升序, 两条产线交错) + 在途到货 (eta 升序)
// 输出: 每条产线的当前订单 + 待生产订单的预测状态
// ==========================================
// 规则 (逐个待生产订单):
// 1) 产线已阻断 -> unable_to_fulfill (不推进时钟, 不动台账/队列)
// 2) 库存覆盖 -> 扣减, start = 产线时钟, on_track
// 3) 库存不足但在途可补齐 -> 补记整单 + 扣减 + 移除认领记录,
//    start = max(产线时钟, 原料就绪), delay_expected
// 4) 补不齐 -> 阻断产线, unable_to_fulfill
// 5) 完工时刻超出可表示范围 -> 阻断产线, unable_to_fulfill (不动台账/队列)
// ==========================================

use crate::config::ProductionConfig;
use crate::domain::inventory::InventoryRow;
use crate::domain::order::PurchaseOrder;
use crate::domain::schedule::{CurrentOrder, ProductionStatusReport, ScheduledOrder};
use crate::domain::supply::Supply;
use crate::domain::types::{MaterialAmounts, ProductType, ProductionStatus, ScheduleStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger::MaterialLedger;
use crate::engine::line_clock::LineClocks;
use crate::engine::schedule_core::{
    assess_materials, commit_materials, order_requirement, MaterialPlan, MaterialSource,
};
use crate::engine::store::ProductionStore;
use crate::engine::supply_claim::{InboundSupply, InboundSupplyQueue};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 预测输入快照（一次读取，整个预测过程不再访问持久化）
#[derive(Debug, Clone, Default)]
pub struct ScheduleSnapshot {
    pub inventory: Vec<InventoryRow>,
    pub in_production: Vec<PurchaseOrder>,
    pub pending: Vec<PurchaseOrder>,
    pub inbound_supplies: Vec<Supply>,
}

/// 预测过程的最终状态（看板 + 模拟结束时的台账/队列/阻断情况）
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub report: ProductionStatusReport,
    pub final_inventory: MaterialAmounts,
    pub unclaimed_supplies: Vec<InboundSupply>,
    pub blocked_lines: Vec<ProductType>,
}

// ==========================================
// ScheduleWalker - 排产预测引擎
// ==========================================
pub struct ScheduleWalker {
    config: Arc<ProductionConfig>,
}

impl ScheduleWalker {
    pub fn new(config: Arc<ProductionConfig>) -> Self {
        Self { config }
    }

    /// 读取持久化数据并预测
    ///
    /// 四项读取并发执行；任一失败则整体失败。
    #[instrument(skip(self, store))]
    pub async fn project(
        &self,
        store: &dyn ProductionStore,
        now: DateTime<Utc>,
    ) -> EngineResult<ProductionStatusReport> {
        let (inventory, in_production, pending, inbound_supplies) = futures::try_join!(
            store.load_inventory(),
            store.list_orders_by_status(ProductionStatus::InProduction),
            store.list_orders_by_status(ProductionStatus::Pending),
            store.list_inbound_supplies(),
        )
        .map_err(EngineError::StoreRead)?;

        let snapshot = ScheduleSnapshot {
            inventory,
            in_production,
            pending,
            inbound_supplies,
        };

        Ok(self.walk(&snapshot, now)?.report)
    }

    /// 在快照上执行预测（纯计算）
    pub fn walk(&self, snapshot: &ScheduleSnapshot, now: DateTime<Utc>) -> EngineResult<WalkOutcome> {
        let mut ledger = MaterialLedger::from_rows(&snapshot.inventory);
        let mut clocks = LineClocks::new(now);
        let mut inbound = InboundSupplyQueue::from_supplies(&snapshot.inbound_supplies);
        let mut blocked = [false; ProductType::COUNT];
        let mut report = ProductionStatusReport::empty();

        // ===== 步骤1: 在产订单 -> 产线时钟 =====
        for order in &snapshot.in_production {
            let started_at = order.started_at.ok_or_else(|| {
                EngineError::InconsistentState(format!("在产订单缺少开工时间: order_id={}", order.id))
            })?;
            let requirement = order_requirement(&self.config, order);
            let completion = requirement.completion_from(started_at);
            match completion {
                Some(completion) => clocks.observe_in_production(order.product_type, completion),
                None => {
                    warn!(
                        order_id = order.id,
                        quantity = order.quantity,
                        "在产订单预计完工时刻超出可表示范围，产线阻断"
                    );
                    blocked[order.product_type.index()] = true;
                }
            }

            if let Some(line) = report.lines.get_mut(&order.product_type) {
                if let Some(previous) = &line.current_order {
                    warn!(
                        product_type = %order.product_type,
                        previous_order_id = previous.id,
                        order_id = order.id,
                        "同一产线存在多个在产订单"
                    );
                }
                line.current_order = Some(CurrentOrder::from_order(order, started_at, completion));
            }
        }

        // ===== 步骤2: 按全局 FIFO 逐单预测 =====
        for order in &snapshot.pending {
            let pt = order.product_type;

            if blocked[pt.index()] {
                push_upcoming(&mut report, ScheduledOrder::unable_to_fulfill(order));
                continue;
            }

            let requirement = order_requirement(&self.config, order);
            let Some(duration) = requirement.duration else {
                block_out_of_range(&mut blocked, order);
                push_upcoming(&mut report, ScheduledOrder::unable_to_fulfill(order));
                continue;
            };
            let plan = assess_materials(
                &ledger,
                &requirement.required,
                MaterialSource::StockAndInbound(&inbound),
            );

            let scheduled = match &plan {
                MaterialPlan::FromStock => match clocks.reserve(pt, None, duration) {
                    Some((start, end)) => {
                        commit_materials(&mut ledger, &requirement.required, &plan);
                        ScheduledOrder::scheduled(order, ScheduleStatus::OnTrack, start, end)
                    }
                    None => {
                        block_out_of_range(&mut blocked, order);
                        ScheduledOrder::unable_to_fulfill(order)
                    }
                },
                MaterialPlan::WithInbound(claim) => {
                    match clocks.reserve(pt, claim.materials_ready_at, duration) {
                        Some((start, end)) => {
                            commit_materials(&mut ledger, &requirement.required, &plan);
                            inbound.commit(claim);
                            debug!(
                                order_id = order.id,
                                claimed = claim.claimed.len(),
                                "订单依赖在途到货"
                            );
                            ScheduledOrder::scheduled(order, ScheduleStatus::DelayExpected, start, end)
                        }
                        None => {
                            block_out_of_range(&mut blocked, order);
                            ScheduledOrder::unable_to_fulfill(order)
                        }
                    }
                }
                MaterialPlan::Shortfall { remaining, .. } => {
                    blocked[pt.index()] = true;
                    debug!(
                        order_id = order.id,
                        product_type = %pt,
                        remaining = ?remaining,
                        "库存与在途均不足，产线阻断"
                    );
                    ScheduledOrder::unable_to_fulfill(order)
                }
            };

            push_upcoming(&mut report, scheduled);
        }

        let blocked_lines: Vec<ProductType> = ProductType::ALL
            .iter()
            .copied()
            .filter(|pt| blocked[pt.index()])
            .collect();

        info!(
            in_production = snapshot.in_production.len(),
            pending = snapshot.pending.len(),
            blocked_lines = blocked_lines.len(),
            "排产预测完成"
        );

        Ok(WalkOutcome {
            report,
            final_inventory: ledger.snapshot(),
            unclaimed_supplies: inbound.items().to_vec(),
            blocked_lines,
        })
    }
}

fn block_out_of_range(blocked: &mut [bool; ProductType::COUNT], order: &PurchaseOrder) {
    warn!(
        order_id = order.id,
        product_type = %order.product_type,
        quantity = order.quantity,
        "订单完工时刻超出可表示范围，产线阻断"
    );
    blocked[order.product_type.index()] = true;
}

fn push_upcoming(report: &mut ProductionStatusReport, scheduled: ScheduledOrder) {
    if let Some(line) = report.lines.get_mut(&scheduled.product_type) {
        line.upcoming_orders.push(scheduled);
    }
}
