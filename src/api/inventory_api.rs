// ==========================================
// 瓶装产线排产系统 - 库存 API
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::inventory::InventoryRow;
use crate::repository::inventory_repo::InventoryRepository;

pub struct InventoryApi {
    inventory_repo: Arc<InventoryRepository>,
}

impl InventoryApi {
    pub fn new(inventory_repo: Arc<InventoryRepository>) -> Self {
        Self { inventory_repo }
    }

    /// 当前库存（每种原料一行）
    pub fn get_inventory(&self) -> ApiResult<Vec<InventoryRow>> {
        Ok(self.inventory_repo.load()?)
    }
}
