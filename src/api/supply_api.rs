// ==========================================
// 瓶装产线排产系统 - 原料到货 API
// ==========================================
// 职责: 采购录入、到货入库、查询
// 红线: 入库 (ordered -> received) 只能一次, 与库存增加同事务
// ==========================================

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::api::audit;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::production_log::{ProductionActionType, ProductionLog};
use crate::domain::supply::{NewSupply, Supply};
use crate::domain::timestamp::now_millis;
use crate::domain::types::Material;
use crate::repository::production_log_repo::ProductionLogRepository;
use crate::repository::supply_repo::{SupplyInsert, SupplyRepository};

pub struct SupplyApi {
    supply_repo: Arc<SupplyRepository>,
    log_repo: Arc<ProductionLogRepository>,
}

impl SupplyApi {
    pub fn new(supply_repo: Arc<SupplyRepository>, log_repo: Arc<ProductionLogRepository>) -> Self {
        Self { supply_repo, log_repo }
    }

    /// 全部到货记录（最新在前）
    pub fn list_supplies(&self) -> ApiResult<Vec<Supply>> {
        Ok(self.supply_repo.list_all()?)
    }

    /// 录入采购（状态 ordered）
    pub fn create_supply(&self, request: NewSupply, actor: &str) -> ApiResult<Supply> {
        let material = Material::parse(&request.material).ok_or_else(|| {
            ApiError::InvalidInput(format!("无效的原料: {}（可选: pet, pta, eg）", request.material))
        })?;

        if !request.quantity.is_finite() || request.quantity <= 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "数量必须大于0: {}",
                request.quantity
            )));
        }

        let supplier_name = request.supplier_name.trim();
        if supplier_name.is_empty() {
            return Err(ApiError::InvalidInput("供应商名称不能为空".to_string()));
        }

        let tracking_number = request
            .tracking_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let supply = self.supply_repo.insert(&SupplyInsert {
            material,
            quantity: request.quantity,
            supplier_name,
            tracking_number,
            eta: request.eta,
            created_at: now_millis(),
        })?;

        info!(
            supply_id = supply.id,
            material = %supply.material,
            quantity = supply.quantity,
            eta = %supply.eta,
            "采购已录入"
        );

        audit::record(
            &self.log_repo,
            &ProductionLog::new(
                ProductionActionType::CreateSupply,
                supply.created_at,
                actor,
                Some(json!({
                    "supply_id": supply.id,
                    "material": supply.material,
                    "quantity": supply.quantity,
                    "eta": supply.eta,
                })),
                None,
            ),
        );

        Ok(supply)
    }

    /// 到货入库: ordered -> received，库存按数量增加
    pub fn receive_supply(&self, supply_id: i64, actor: &str) -> ApiResult<Supply> {
        let supply = self
            .supply_repo
            .mark_received_and_credit(supply_id, now_millis())?;

        info!(
            supply_id = supply.id,
            material = %supply.material,
            quantity = supply.quantity,
            "到货已入库"
        );

        if let Some(received_at) = supply.received_at {
            audit::record(
                &self.log_repo,
                &ProductionLog::new(
                    ProductionActionType::ReceiveSupply,
                    received_at,
                    actor,
                    Some(json!({
                        "supply_id": supply.id,
                        "material": supply.material,
                        "quantity": supply.quantity,
                    })),
                    Some(format!("{} +{}", supply.material, supply.quantity)),
                ),
            );
        }

        Ok(supply)
    }
}
