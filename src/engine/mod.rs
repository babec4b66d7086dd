// ==========================================
// 瓶装产线排产系统 - 引擎层
// ==========================================
// 职责: 排产预测与生产推进的业务规则, 不拼 SQL
// 持久化只通过 ProductionStore 访问
// ==========================================

pub mod advance;
pub mod error;
pub mod ledger;
pub mod line_clock;
pub mod schedule_core;
pub mod schedule_walker;
pub mod store;
pub mod supply_claim;

#[cfg(test)]
pub(crate) mod test_support;

// 重导出核心引擎
pub use advance::{
    AdvanceEngine, AdvanceReport, CompletedOrder, SkipReason, SkippedCandidate, StartedOrder,
};
pub use error::{EngineError, EngineResult};
pub use ledger::MaterialLedger;
pub use line_clock::LineClocks;
pub use schedule_core::{MaterialPlan, MaterialSource, OrderRequirement};
pub use schedule_walker::{ScheduleSnapshot, ScheduleWalker, WalkOutcome};
pub use store::ProductionStore;
pub use supply_claim::{ClaimOutcome, InboundSupply, InboundSupplyQueue, SupplyClaim};
