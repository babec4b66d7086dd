// ==========================================
// 瓶装产线排产系统 - 生产推进引擎
// ==========================================
// 职责: 真实状态迁移 (会写持久化)
// 步骤:
// A) 完工扫描: 预计完工 <= now 的在产订单 -> completed (completed_at = 预计完工时刻)
// B) 空闲产线: 重新读取在产订单, 无在产订单的产线为空闲
// C) 候选: 每条空闲产线只取最早的一个待生产订单
// D) 候选按 created_at 升序 (只影响抢库存的先后)
// E) 逐个候选: 只看真实库存 (不计在途); 够则逐原料原子扣减后开工
// ==========================================
// 扣减失败处理: 同一订单已扣减的原料按相反数补回, 订单保持 pending
// 完工时刻超出可表示范围: 在产订单不完工, 待生产订单不开工
// ==========================================

use crate::config::ProductionConfig;
use crate::domain::order::PurchaseOrder;
use crate::domain::timestamp::serde_millis;
use crate::domain::types::{Material, MaterialAmounts, ProductType, ProductionStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger::MaterialLedger;
use crate::engine::schedule_core::{
    assess_materials, commit_materials, order_requirement, MaterialPlan, MaterialSource,
};
use crate::engine::store::ProductionStore;
use crate::repository::error::RepositoryError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// AdvanceReport - 推进结果
// ==========================================

/// 完工订单
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedOrder {
    pub order_id: i64,
    pub product_type: ProductType,
    #[serde(with = "serde_millis")]
    pub completed_at: DateTime<Utc>,
}

/// 开工订单
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartedOrder {
    pub order_id: i64,
    pub product_type: ProductType,
    #[serde(with = "serde_millis")]
    pub started_at: DateTime<Utc>,
    pub consumed: MaterialAmounts,
}

/// 跳过原因（订单保持 pending，下次推进重新评估）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkipReason {
    /// 真实库存不足
    InsufficientInventory { shortage: MaterialAmounts },
    /// 生产时长使完工时刻超出可表示范围
    DurationOutOfRange,
    /// 库存扣减失败；rollback_failed 中的原料补回也失败，需人工对账
    LedgerWriteFailed {
        material: Material,
        message: String,
        rollback_failed: Vec<Material>,
    },
}

/// 被跳过的候选
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub order_id: i64,
    pub product_type: ProductType,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvanceReport {
    #[serde(with = "serde_millis")]
    pub now: DateTime<Utc>,
    pub completed: Vec<CompletedOrder>,
    pub started: Vec<StartedOrder>,
    pub skipped: Vec<SkippedCandidate>,
}

impl AdvanceReport {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            completed: Vec::new(),
            started: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// 是否产生了持久化变更
    pub fn has_changes(&self) -> bool {
        !self.completed.is_empty() || !self.started.is_empty()
    }
}

// ==========================================
// AdvanceEngine - 生产推进引擎
// ==========================================
pub struct AdvanceEngine {
    config: Arc<ProductionConfig>,
}

impl AdvanceEngine {
    pub fn new(config: Arc<ProductionConfig>) -> Self {
        Self { config }
    }

    /// 执行一次生产推进
    #[instrument(skip(self, store))]
    pub async fn advance(
        &self,
        store: &dyn ProductionStore,
        now: DateTime<Utc>,
    ) -> EngineResult<AdvanceReport> {
        let mut report = AdvanceReport::new(now);

        // ===== 步骤A: 完工扫描 =====
        self.complete_finished_orders(store, now, &mut report).await?;

        // ===== 步骤B: 空闲产线 =====
        let still_in_production = store
            .list_orders_by_status(ProductionStatus::InProduction)
            .await
            .map_err(EngineError::StoreRead)?;
        let busy_lines: HashSet<ProductType> =
            still_in_production.iter().map(|o| o.product_type).collect();
        let free_lines: Vec<ProductType> = ProductType::ALL
            .iter()
            .copied()
            .filter(|pt| !busy_lines.contains(pt))
            .collect();

        if free_lines.is_empty() {
            debug!("无空闲产线");
            return Ok(report);
        }

        // ===== 步骤C: 每条空闲产线取最早待生产订单 =====
        let mut candidates: Vec<PurchaseOrder> = Vec::new();
        for pt in free_lines {
            if let Some(order) = store
                .find_oldest_pending_order(pt)
                .await
                .map_err(EngineError::StoreRead)?
            {
                candidates.push(order);
            }
        }

        if candidates.is_empty() {
            debug!("空闲产线无待生产订单");
            return Ok(report);
        }

        // ===== 步骤D: 跨产线按创建时间排序 =====
        candidates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        // ===== 步骤E: 逐个候选校验并开工 =====
        let inventory = store.load_inventory().await.map_err(EngineError::StoreRead)?;
        let mut ledger = MaterialLedger::from_rows(&inventory);

        for order in &candidates {
            self.try_start(store, order, now, &mut ledger, &mut report).await?;
        }

        info!(
            completed = report.completed.len(),
            started = report.started.len(),
            skipped = report.skipped.len(),
            "生产推进完成"
        );

        Ok(report)
    }

    async fn complete_finished_orders(
        &self,
        store: &dyn ProductionStore,
        now: DateTime<Utc>,
        report: &mut AdvanceReport,
    ) -> EngineResult<()> {
        let in_production = store
            .list_orders_by_status(ProductionStatus::InProduction)
            .await
            .map_err(EngineError::StoreRead)?;

        for order in in_production {
            let started_at = order.started_at.ok_or_else(|| {
                EngineError::InconsistentState(format!("在产订单缺少开工时间: order_id={}", order.id))
            })?;
            let Some(completion) = order_requirement(&self.config, &order).completion_from(started_at)
            else {
                warn!(
                    order_id = order.id,
                    quantity = order.quantity,
                    "预计完工时刻超出可表示范围，订单保持在产"
                );
                continue;
            };

            if completion <= now {
                store
                    .mark_order_completed(order.id, completion)
                    .await
                    .map_err(|source| EngineError::StoreWrite {
                        order_id: order.id,
                        source,
                    })?;

                info!(
                    order_id = order.id,
                    product_type = %order.product_type,
                    completed_at = %completion,
                    "订单完工"
                );
                report.completed.push(CompletedOrder {
                    order_id: order.id,
                    product_type: order.product_type,
                    completed_at: completion,
                });
            }
        }

        Ok(())
    }

    async fn try_start(
        &self,
        store: &dyn ProductionStore,
        order: &PurchaseOrder,
        now: DateTime<Utc>,
        ledger: &mut MaterialLedger,
        report: &mut AdvanceReport,
    ) -> EngineResult<()> {
        let requirement = order_requirement(&self.config, order);

        if requirement.completion_from(now).is_none() {
            warn!(
                order_id = order.id,
                quantity = order.quantity,
                "预计完工时刻超出可表示范围，订单保持待生产"
            );
            report.skipped.push(SkippedCandidate {
                order_id: order.id,
                product_type: order.product_type,
                reason: SkipReason::DurationOutOfRange,
            });
            return Ok(());
        }

        // 先整体校验，再逐原料扣减
        let plan = assess_materials(ledger, &requirement.required, MaterialSource::StockOnly);
        if let MaterialPlan::Shortfall { shortage, .. } = &plan {
            debug!(order_id = order.id, shortage = ?shortage, "库存不足，订单保持待生产");
            report.skipped.push(SkippedCandidate {
                order_id: order.id,
                product_type: order.product_type,
                reason: SkipReason::InsufficientInventory { shortage: *shortage },
            });
            return Ok(());
        }

        let mut applied: Vec<(Material, f64)> = Vec::new();
        for (material, amount) in requirement.required.iter() {
            if amount <= 0.0 {
                continue;
            }
            if let Err(err) = store.adjust_inventory(material, -amount).await {
                warn!(
                    order_id = order.id,
                    material = %material,
                    error = %err,
                    "库存扣减失败，跳过该订单"
                );
                let rollback_failed = rollback(store, order.id, &applied).await;
                report.skipped.push(SkippedCandidate {
                    order_id: order.id,
                    product_type: order.product_type,
                    reason: SkipReason::LedgerWriteFailed {
                        material,
                        message: err.to_string(),
                        rollback_failed,
                    },
                });
                return Ok(());
            }
            applied.push((material, amount));
        }

        if let Err(source) = store.mark_order_started(order.id, now).await {
            rollback(store, order.id, &applied).await;
            return Err(EngineError::StoreWrite {
                order_id: order.id,
                source,
            });
        }

        commit_materials(ledger, &requirement.required, &plan);

        info!(
            order_id = order.id,
            product_type = %order.product_type,
            quantity = order.quantity,
            "订单开工"
        );
        report.started.push(StartedOrder {
            order_id: order.id,
            product_type: order.product_type,
            started_at: now,
            consumed: requirement.required,
        });

        Ok(())
    }
}

/// 补回已扣减的原料，返回补回失败的原料
async fn rollback(
    store: &dyn ProductionStore,
    order_id: i64,
    applied: &[(Material, f64)],
) -> Vec<Material> {
    let mut failed = Vec::new();
    for (material, amount) in applied.iter().rev() {
        if let Err(err) = store.adjust_inventory(*material, *amount).await {
            log_rollback_failure(order_id, *material, *amount, &err);
            failed.push(*material);
        }
    }
    failed
}

fn log_rollback_failure(order_id: i64, material: Material, amount: f64, err: &RepositoryError) {
    error!(
        order_id,
        material = %material,
        amount,
        error = %err,
        "库存补回失败，需人工对账"
    );
}

#[cfg(test)]
mod tests;
