// ==========================================
// 瓶装产线排产系统 - 库存领域模型
// ==========================================
// 对齐: inventory 表 (每种原料一行)
// ==========================================

use crate::domain::types::{Material, MaterialAmounts};
use serde::{Deserialize, Serialize};

/// 库存行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub material: Material,
    pub quantity: f64,
}

/// 库存行汇总为原料向量（缺失的原料视为 0）
pub fn inventory_amounts(rows: &[InventoryRow]) -> MaterialAmounts {
    let mut amounts = MaterialAmounts::zero();
    for row in rows {
        amounts[row.material] = row.quantity;
    }
    amounts
}
