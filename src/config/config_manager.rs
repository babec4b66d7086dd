// ==========================================
// 瓶装产线排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::production_config::ProductionConfig;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 加载产线配置
    ///
    /// # 说明
    /// - config_kv 中无 production_lines 时使用默认常量
    /// - 存在但格式错误/校验失败时返回错误（不静默降级，避免按错误产能排产）
    pub fn load_production_config(&self) -> ConfigResult<ProductionConfig> {
        match self.get_global_config_value(config_keys::PRODUCTION_LINES)? {
            Some(raw) => {
                let config = ProductionConfig::from_json(&raw)?;
                tracing::info!(config_key = config_keys::PRODUCTION_LINES, "已加载产线配置覆写");
                Ok(config)
            }
            None => Ok(ProductionConfig::default()),
        }
    }

    /// 查询生产状态时是否先执行一次生产推进（默认 false，只预测）
    pub fn auto_advance_on_status(&self) -> ConfigResult<bool> {
        let value = self.get_global_config_value(config_keys::AUTO_ADVANCE_ON_STATUS)?;
        Ok(match value {
            None => false,
            Some(v) => match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    tracing::warn!(
                        config_key = config_keys::AUTO_ADVANCE_ON_STATUS,
                        raw_value = %v,
                        "配置值无法识别，使用默认值 false"
                    );
                    false
                }
            },
        })
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 生产推进日志中记录当时生效的配置
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 产线配置 (JSON)
    pub const PRODUCTION_LINES: &str = "production_lines";

    // 查询状态前自动推进
    pub const AUTO_ADVANCE_ON_STATUS: &str = "auto_advance_on_status";
}
