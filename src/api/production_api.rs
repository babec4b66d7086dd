// ==========================================
// 瓶装产线排产系统 - 生产 API
// ==========================================
// 职责: 生产推进、生产状态看板、操作日志查询、健康检查
// 说明:
// - get_production_status 只做预测, 不写任何数据
// - refresh_production_status 按配置先推进一次再预测
// - 推进产生变更时写入一条 ADVANCE_PRODUCTION 日志 (含当时生效配置)
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use tracing::{instrument, warn};

use crate::api::audit::{self, SYSTEM_ACTOR};
use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::config::production_config::ProductionConfig;
use crate::db::read_schema_version;
use crate::domain::production_log::{ProductionActionType, ProductionLog};
use crate::domain::schedule::ProductionStatusReport;
use crate::engine::advance::{AdvanceEngine, AdvanceReport};
use crate::engine::schedule_walker::ScheduleWalker;
use crate::engine::store::ProductionStore;
use crate::repository::production_log_repo::ProductionLogRepository;

/// 健康检查结果
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub schema_version: Option<i64>,
}

pub struct ProductionApi {
    store: Arc<dyn ProductionStore>,
    walker: ScheduleWalker,
    engine: AdvanceEngine,
    log_repo: Arc<ProductionLogRepository>,
    config_manager: Arc<ConfigManager>,
    conn: Arc<Mutex<Connection>>,
}

impl ProductionApi {
    /// # 参数
    /// - store: 生产数据存取
    /// - config: 产线配置（预测与推进共用同一份）
    /// - log_repo: 操作日志仓储
    /// - config_manager: 配置管理器（读取 auto_advance_on_status / 配置快照）
    /// - conn: 共享连接（健康检查读取 schema_version）
    pub fn new(
        store: Arc<dyn ProductionStore>,
        config: Arc<ProductionConfig>,
        log_repo: Arc<ProductionLogRepository>,
        config_manager: Arc<ConfigManager>,
        conn: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            store,
            walker: ScheduleWalker::new(config.clone()),
            engine: AdvanceEngine::new(config),
            log_repo,
            config_manager,
            conn,
        }
    }

    /// 执行一次生产推进
    #[instrument(skip(self))]
    pub async fn advance_production(&self, now: DateTime<Utc>) -> ApiResult<AdvanceReport> {
        let report = self.engine.advance(self.store.as_ref(), now).await?;

        if report.has_changes() {
            let config_snapshot = self
                .config_manager
                .get_config_snapshot()
                .unwrap_or_else(|e| {
                    warn!(error = %e, "读取配置快照失败");
                    "{}".to_string()
                });
            let config_snapshot: serde_json::Value =
                serde_json::from_str(&config_snapshot).unwrap_or(serde_json::Value::Null);

            audit::record(
                &self.log_repo,
                &ProductionLog::new(
                    ProductionActionType::AdvanceProduction,
                    now,
                    SYSTEM_ACTOR,
                    Some(json!({
                        "report": report,
                        "config_snapshot": config_snapshot,
                    })),
                    Some(format!(
                        "完工 {} / 开工 {} / 跳过 {}",
                        report.completed.len(),
                        report.started.len(),
                        report.skipped.len()
                    )),
                ),
            );
        }

        Ok(report)
    }

    /// 生产状态看板（纯预测，不修改任何数据）
    #[instrument(skip(self))]
    pub async fn get_production_status(&self, now: DateTime<Utc>) -> ApiResult<ProductionStatusReport> {
        Ok(self.walker.project(self.store.as_ref(), now).await?)
    }

    /// 刷新生产状态: auto_advance_on_status 为 true 时先推进，再预测
    pub async fn refresh_production_status(
        &self,
        now: DateTime<Utc>,
    ) -> ApiResult<ProductionStatusReport> {
        if self.config_manager.auto_advance_on_status()? {
            self.advance_production(now).await?;
        }
        self.get_production_status(now).await
    }

    /// 最近的操作日志
    pub fn list_recent_logs(&self, limit: usize) -> ApiResult<Vec<ProductionLog>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于0".to_string()));
        }
        Ok(self.log_repo.list_recent(limit)?)
    }

    /// 健康检查
    pub fn health(&self) -> ApiResult<HealthStatus> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))?;
        let schema_version =
            read_schema_version(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(HealthStatus {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
            schema_version,
        })
    }
}
