// ==========================================
// 瓶装产线排产系统 - 生产操作日志数据仓储
// ==========================================
// 对齐: production_log 表
// 红线: 所有写入必须记录; 日志只追加不修改
// ==========================================

use crate::domain::production_log::ProductionLog;
use crate::domain::timestamp::format_ts;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::ts_column;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct ProductionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入日志，返回 action_id
    pub fn insert(&self, log: &ProductionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_log (
                action_id, action_type, action_ts, actor, payload_json, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.action_id,
                log.action_type,
                format_ts(&log.action_ts),
                log.actor,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.detail,
            ],
        )?;
        Ok(log.action_id.clone())
    }

    /// 最近的日志（时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ProductionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor, payload_json, detail
            FROM production_log
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;
        let logs = stmt
            .query_map(params![limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    fn map_row(&self, row: &Row) -> SqliteResult<ProductionLog> {
        let payload_json_str: Option<String> = row.get(4)?;
        Ok(ProductionLog {
            action_id: row.get(0)?,
            action_type: row.get(1)?,
            action_ts: ts_column(row, 2)?,
            actor: row.get(3)?,
            payload_json: payload_json_str.and_then(|s| serde_json::from_str(&s).ok()),
            detail: row.get(5)?,
        })
    }
}
