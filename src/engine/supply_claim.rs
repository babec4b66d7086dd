// ==========================================
// 瓶装产线排产系统 - 在途原料认领
// ==========================================
// 职责: 用在途 (ordered) 到货记录贪心补齐原料缺口
// 规则:
// 1) 按调用方给定顺序 (ETA 升序) 单次遍历, 不重新排序
// 2) 到货记录整单认领, 不拆分; 多余部分由调用方补记进台账
// 3) 未能补齐时视为未认领任何记录 (无部分副作用)
// ==========================================

use crate::domain::supply::Supply;
use crate::domain::types::{Material, MaterialAmounts};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 可认领的在途到货
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundSupply {
    pub supply_id: i64,
    pub material: Material,
    pub quantity: f64,
    pub eta: DateTime<Utc>,
}

impl From<&Supply> for InboundSupply {
    fn from(supply: &Supply) -> Self {
        Self {
            supply_id: supply.id,
            material: supply.material,
            quantity: supply.quantity,
            eta: supply.eta,
        }
    }
}

/// 认领结果（已补齐）
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyClaim {
    /// 被认领记录在队列中的下标（升序）
    claimed_indices: Vec<usize>,
    /// 被认领的到货记录
    pub claimed: Vec<InboundSupply>,
    /// 被认领记录的最晚 ETA（未认领任何记录时为 None）
    pub materials_ready_at: Option<DateTime<Utc>>,
    /// 被认领记录的整单数量合计
    pub credited: MaterialAmounts,
}

/// 认领判定
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Resolved(SupplyClaim),
    Unresolved { remaining: MaterialAmounts },
}

// ==========================================
// InboundSupplyQueue - 在途到货队列
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InboundSupplyQueue {
    items: Vec<InboundSupply>,
}

impl InboundSupplyQueue {
    /// 以给定顺序构造（调用方保证 ETA 升序）
    pub fn new(items: Vec<InboundSupply>) -> Self {
        Self { items }
    }

    pub fn from_supplies(supplies: &[Supply]) -> Self {
        Self::new(supplies.iter().map(InboundSupply::from).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[InboundSupply] {
        &self.items
    }

    /// 尝试用队列补齐缺口（只读，不修改队列）
    pub fn resolve(&self, shortage: &MaterialAmounts) -> ClaimOutcome {
        let mut remaining = *shortage;
        let mut claimed_indices = Vec::new();
        let mut claimed = Vec::new();
        let mut materials_ready_at: Option<DateTime<Utc>> = None;
        let mut credited = MaterialAmounts::zero();

        for (idx, supply) in self.items.iter().enumerate() {
            if remaining.is_empty() {
                break;
            }
            if remaining[supply.material] <= 0.0 {
                continue;
            }

            remaining[supply.material] = (remaining[supply.material] - supply.quantity).max(0.0);
            credited[supply.material] += supply.quantity;
            materials_ready_at = Some(match materials_ready_at {
                Some(ts) if ts >= supply.eta => ts,
                _ => supply.eta,
            });
            claimed_indices.push(idx);
            claimed.push(supply.clone());
        }

        if remaining.is_empty() {
            ClaimOutcome::Resolved(SupplyClaim {
                claimed_indices,
                claimed,
                materials_ready_at,
                credited,
            })
        } else {
            ClaimOutcome::Unresolved { remaining }
        }
    }

    /// 提交认领：扫描结束后统一移除被认领记录
    ///
    /// `claim` 必须来自对当前队列（未被修改过）的 `resolve`。
    pub fn commit(&mut self, claim: &SupplyClaim) {
        for (idx, supply) in claim.claimed_indices.iter().zip(claim.claimed.iter()).rev() {
            debug_assert_eq!(self.items[*idx].supply_id, supply.supply_id);
            self.items.remove(*idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap()
    }

    fn supply(id: i64, material: Material, quantity: f64, eta_hours: i64) -> InboundSupply {
        InboundSupply {
            supply_id: id,
            material,
            quantity,
            eta: base() + Duration::hours(eta_hours),
        }
    }

    #[test]
    fn test_resolve_claims_whole_supplies_and_tracks_latest_eta() {
        let queue = InboundSupplyQueue::new(vec![
            supply(1, Material::Pet, 300.0, 2),
            supply(2, Material::Eg, 50.0, 5),
            supply(3, Material::Pet, 500.0, 3),
            supply(4, Material::Pet, 900.0, 9),
        ]);

        let outcome = queue.resolve(&MaterialAmounts::new(600.0, 0.0, 0.0));
        let ClaimOutcome::Resolved(claim) = outcome else {
            panic!("缺口应可补齐");
        };

        let ids: Vec<i64> = claim.claimed.iter().map(|s| s.supply_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(claim.credited[Material::Pet], 800.0);
        assert_eq!(claim.materials_ready_at, Some(base() + Duration::hours(3)));
    }

    #[test]
    fn test_unresolved_leaves_queue_untouched() {
        let queue = InboundSupplyQueue::new(vec![
            supply(1, Material::Pet, 100.0, 1),
            supply(2, Material::Pta, 100.0, 1),
        ]);

        let outcome = queue.resolve(&MaterialAmounts::new(50.0, 150.0, 0.0));
        match outcome {
            ClaimOutcome::Unresolved { remaining } => {
                assert_eq!(remaining, MaterialAmounts::new(0.0, 50.0, 0.0));
            }
            ClaimOutcome::Resolved(_) => panic!("PTA 缺口不应被补齐"),
        }
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_commit_removes_claimed_supplies_in_entirety() {
        let mut queue = InboundSupplyQueue::new(vec![
            supply(1, Material::Pet, 300.0, 2),
            supply(2, Material::Eg, 50.0, 5),
            supply(3, Material::Pet, 500.0, 3),
        ]);

        let ClaimOutcome::Resolved(claim) = queue.resolve(&MaterialAmounts::new(350.0, 0.0, 10.0)) else {
            panic!("缺口应可补齐");
        };
        queue.commit(&claim);

        assert!(queue.is_empty());
        assert_eq!(claim.credited, MaterialAmounts::new(800.0, 0.0, 50.0));
    }

    #[test]
    fn test_empty_shortage_resolves_without_claims() {
        let queue = InboundSupplyQueue::new(vec![supply(1, Material::Pet, 1.0, 1)]);
        let ClaimOutcome::Resolved(claim) = queue.resolve(&MaterialAmounts::zero()) else {
            panic!("无缺口应直接视为补齐");
        };
        assert!(claim.claimed.is_empty());
        assert_eq!(claim.materials_ready_at, None);
    }
}
