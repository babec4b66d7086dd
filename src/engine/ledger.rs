// ==========================================
// 瓶装产线排产系统 - 原料台账
// ==========================================
// 职责: 单次计算内的原料库存快照 (扣减 / 补记)
// 红线: 只改内存, 不碰持久化; 真实扣减由推进引擎通过仓储完成
// ==========================================

use crate::domain::inventory::{inventory_amounts, InventoryRow};
use crate::domain::types::{Material, MaterialAmounts};

/// 原料台账
///
/// 每次预测/推进各自持有一份，互不共享。
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLedger {
    stock: MaterialAmounts,
}

impl MaterialLedger {
    pub fn new(stock: MaterialAmounts) -> Self {
        Self { stock }
    }

    /// 由库存行构造（缺失的原料按 0 计）
    pub fn from_rows(rows: &[InventoryRow]) -> Self {
        Self::new(inventory_amounts(rows))
    }

    pub fn get(&self, material: Material) -> f64 {
        self.stock[material]
    }

    pub fn snapshot(&self) -> MaterialAmounts {
        self.stock
    }

    /// 扣减
    ///
    /// 调用方负责先校验可行性（见 `covers` / `shortage`），此处不做越界检查。
    pub fn deduct(&mut self, amounts: &MaterialAmounts) {
        for (material, amount) in amounts.iter() {
            self.stock[material] -= amount;
        }
    }

    /// 补记
    pub fn credit(&mut self, amounts: &MaterialAmounts) {
        for (material, amount) in amounts.iter() {
            self.stock[material] += amount;
        }
    }

    /// 缺口 = max(0, 需求 - 库存)，逐原料计算
    pub fn shortage(&self, required: &MaterialAmounts) -> MaterialAmounts {
        let mut shortage = MaterialAmounts::zero();
        for (material, amount) in required.iter() {
            shortage[material] = (amount - self.stock[material]).max(0.0);
        }
        shortage
    }

    /// 库存是否覆盖全部需求
    pub fn covers(&self, required: &MaterialAmounts) -> bool {
        self.shortage(required).is_empty()
    }
}
