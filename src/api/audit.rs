// ==========================================
// 操作日志记录辅助
// ==========================================

use crate::domain::production_log::ProductionLog;
use crate::repository::production_log_repo::ProductionLogRepository;
use tracing::warn;

/// 推进等系统动作的默认操作人
pub const SYSTEM_ACTOR: &str = "system";

/// 记录操作日志，失败时只记录警告（不影响主要操作）
pub(crate) fn record(repo: &ProductionLogRepository, log: &ProductionLog) {
    if let Err(e) = repo.insert(log) {
        warn!(error = %e, action_type = %log.action_type, "记录操作日志失败");
    }
}
