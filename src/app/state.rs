// ==========================================
// 瓶装产线排产系统 - 应用状态
// ==========================================
// 职责: 打开共享连接、建表、加载配置, 组装所有 API 实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{InventoryApi, OrderApi, ProductionApi, SupplyApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    InventoryRepository, ProductionLogRepository, PurchaseOrderRepository, SqliteProductionStore,
    SupplyRepository,
};

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub order_api: Arc<OrderApi>,
    pub supply_api: Arc<SupplyApi>,
    pub inventory_api: Arc<InventoryApi>,
    pub production_api: Arc<ProductionApi>,

    /// 配置管理器（用于配置覆写命令）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开连接并初始化 schema（幂等）
    /// 2. 从 config_kv 加载产线配置（格式错误时启动失败）
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 基于已初始化 schema 的连接组装
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let order_repo = Arc::new(PurchaseOrderRepository::new(conn.clone()));
        let supply_repo = Arc::new(SupplyRepository::new(conn.clone()));
        let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
        let log_repo = Arc::new(ProductionLogRepository::new(conn.clone()));
        let store = Arc::new(SqliteProductionStore::new(conn.clone()));

        // ==========================================
        // 加载配置
        // ==========================================
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let production_config = Arc::new(
            config_manager
                .load_production_config()
                .map_err(|e| format!("产线配置加载失败: {}", e))?,
        );
        tracing::debug!(config = ?production_config, "产线配置已加载");

        // ==========================================
        // 创建API实例
        // ==========================================
        let order_api = Arc::new(OrderApi::new(order_repo, log_repo.clone()));
        let supply_api = Arc::new(SupplyApi::new(supply_repo, log_repo.clone()));
        let inventory_api = Arc::new(InventoryApi::new(inventory_repo));
        let production_api = Arc::new(ProductionApi::new(
            store,
            production_config,
            log_repo,
            config_manager.clone(),
            conn,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            order_api,
            supply_api,
            inventory_api,
            production_api,
            config_manager,
        })
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 BOTTLE_LINE_APS_DB_PATH（非空时）
/// - 用户数据目录/bottle-line-aps/bottle_line_aps.db
/// - 无法获取数据目录时: ./bottle_line_aps.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("BOTTLE_LINE_APS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./bottle_line_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("bottle-line-aps");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("bottle_line_aps.db");
        }
    }

    path.to_string_lossy().to_string()
}
