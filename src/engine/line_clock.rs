// ==========================================
// 瓶装产线排产系统 - 产线时钟
// ==========================================
// 每条产线一个“空闲时刻”
// 规则:
// 1) 初始化为 now, 永不早于 now
// 2) 只前进不后退
// 3) 排入订单: start = max(时钟, 原料就绪时刻), end = start + 时长, 时钟 = end
// 4) end 超出可表示范围: 不排入, 时钟不变
// ==========================================

use crate::domain::types::ProductType;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct LineClocks {
    now: DateTime<Utc>,
    available_at: [DateTime<Utc>; ProductType::COUNT],
}

impl LineClocks {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            available_at: [now; ProductType::COUNT],
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn available_at(&self, product_type: ProductType) -> DateTime<Utc> {
        self.available_at[product_type.index()]
    }

    /// 纳入在产订单的预计完工时刻
    pub fn observe_in_production(&mut self, product_type: ProductType, completion: DateTime<Utc>) {
        let available = completion.max(self.now);
        let slot = &mut self.available_at[product_type.index()];
        if available > *slot {
            *slot = available;
        }
    }

    /// 在产线上排入一段生产，返回 (开工, 完工)
    pub fn reserve(
        &mut self,
        product_type: ProductType,
        ready_at: Option<DateTime<Utc>>,
        duration: Duration,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let slot = &mut self.available_at[product_type.index()];
        let start = match ready_at {
            Some(ready) if ready > *slot => ready,
            _ => *slot,
        };
        let end = start.checked_add_signed(duration)?;
        *slot = end;
        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_past_completion_is_clamped_to_now() {
        let mut clocks = LineClocks::new(now());
        clocks.observe_in_production(ProductType::Liter, now() - Duration::hours(3));
        assert_eq!(clocks.available_at(ProductType::Liter), now());
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut clocks = LineClocks::new(now());
        clocks.observe_in_production(ProductType::Gallon, now() + Duration::hours(4));
        clocks.observe_in_production(ProductType::Gallon, now() + Duration::hours(1));
        assert_eq!(clocks.available_at(ProductType::Gallon), now() + Duration::hours(4));
        assert_eq!(clocks.available_at(ProductType::Liter), now());
    }

    #[test]
    fn test_reserve_waits_for_materials_and_chains() {
        let mut clocks = LineClocks::new(now());

        let (s1, e1) = clocks.reserve(ProductType::Liter, None, Duration::hours(1)).unwrap();
        assert_eq!((s1, e1), (now(), now() + Duration::hours(1)));

        // 原料就绪早于产线空闲：按产线时钟
        let (s2, _) = clocks.reserve(ProductType::Liter, Some(now()), Duration::hours(1)).unwrap();
        assert_eq!(s2, e1);

        // 原料就绪晚于产线空闲：等待原料
        let ready = now() + Duration::hours(10);
        let (s3, e3) = clocks
            .reserve(ProductType::Liter, Some(ready), Duration::minutes(30))
            .unwrap();
        assert_eq!(s3, ready);
        assert_eq!(clocks.available_at(ProductType::Liter), e3);
    }

    #[test]
    fn test_reserve_past_representable_range_leaves_clock() {
        let mut clocks = LineClocks::new(now());
        clocks.reserve(ProductType::Gallon, None, Duration::hours(2)).unwrap();

        assert_eq!(clocks.reserve(ProductType::Gallon, None, Duration::MAX), None);
        assert_eq!(clocks.available_at(ProductType::Gallon), now() + Duration::hours(2));
    }
}
