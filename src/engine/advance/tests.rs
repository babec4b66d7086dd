// ==========================================
// AdvanceEngine 单元测试
// ==========================================
// 覆盖: 完工时间取预计完工时刻 / 抢库存顺序 / 只看真实库存 /
//       扣减失败补回 / 读写失败
// ==========================================

use super::*;
use crate::domain::inventory::InventoryRow;
use crate::domain::supply::Supply;
use crate::domain::types::SupplyStatus;
use crate::engine::test_support::MemoryStore;
use chrono::{Duration, TimeZone};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
}

fn engine() -> AdvanceEngine {
    AdvanceEngine::new(Arc::new(ProductionConfig::default()))
}

fn pending(id: i64, pt: ProductType, quantity: i64, created_minutes_ago: i64) -> PurchaseOrder {
    PurchaseOrder {
        id,
        product_type: pt,
        customer_name: format!("客户{}", id),
        quantity,
        notes: None,
        production_status: ProductionStatus::Pending,
        created_at: now() - Duration::minutes(created_minutes_ago),
        started_at: None,
        completed_at: None,
    }
}

fn running(id: i64, pt: ProductType, quantity: i64, started_minutes_ago: i64) -> PurchaseOrder {
    let mut order = pending(id, pt, quantity, started_minutes_ago + 60);
    order.production_status = ProductionStatus::InProduction;
    order.started_at = Some(now() - Duration::minutes(started_minutes_ago));
    order
}

fn inventory(pet: f64, pta: f64, eg: f64) -> Vec<InventoryRow> {
    vec![
        InventoryRow { material: Material::Pet, quantity: pet },
        InventoryRow { material: Material::Pta, quantity: pta },
        InventoryRow { material: Material::Eg, quantity: eg },
    ]
}

#[tokio::test]
async fn test_completion_uses_computed_instant() {
    // 2000 件 liter = 1 小时，3 小时前开工 -> 2 小时前完工
    let store = MemoryStore::new(
        vec![running(1, ProductType::Liter, 2_000, 180)],
        inventory(0.0, 0.0, 0.0),
    );

    let report = engine().advance(&store, now()).await.unwrap();

    let expected = now() - Duration::hours(2);
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.completed[0].completed_at, expected);

    let order = store.order(1);
    assert_eq!(order.production_status, ProductionStatus::Completed);
    assert_eq!(order.completed_at, Some(expected));
}

#[tokio::test]
async fn test_unfinished_order_keeps_line_busy() {
    let store = MemoryStore::new(
        vec![
            running(1, ProductType::Gallon, 3_000, 30), // 2 小时，未完工
            pending(2, ProductType::Gallon, 10, 10),
        ],
        inventory(1e6, 1e6, 1e6),
    );

    let report = engine().advance(&store, now()).await.unwrap();

    assert!(report.completed.is_empty());
    assert!(report.started.is_empty());
    assert_eq!(store.order(2).production_status, ProductionStatus::Pending);
}

#[tokio::test]
async fn test_earlier_candidate_wins_scarce_material() {
    // liter 100 件需 pet 2000；gallon 100 件需 pet 6500
    // 库存 pet 7000 只够其中之一
    let store = MemoryStore::new(
        vec![
            pending(1, ProductType::Liter, 100, 10),
            pending(2, ProductType::Gallon, 100, 20),
        ],
        inventory(7_000.0, 1e6, 1e6),
    );

    let report = engine().advance(&store, now()).await.unwrap();

    assert_eq!(report.started.len(), 1);
    assert_eq!(report.started[0].order_id, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].order_id, 1);
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::InsufficientInventory { .. }
    ));

    assert_eq!(store.order(2).production_status, ProductionStatus::InProduction);
    assert_eq!(store.order(2).started_at, Some(now()));
    assert_eq!(store.order(1).production_status, ProductionStatus::Pending);
    assert_eq!(store.stock(Material::Pet), 500.0);
}

#[tokio::test]
async fn test_inbound_supplies_are_not_counted() {
    let store = MemoryStore::new(vec![pending(1, ProductType::Liter, 10, 5)], inventory(0.0, 0.0, 0.0));
    store.state.lock().unwrap().supplies.push(Supply {
        id: 1,
        material: Material::Pet,
        quantity: 1e6,
        supplier_name: None,
        tracking_number: None,
        eta: now() - Duration::hours(1),
        order_status: SupplyStatus::Ordered,
        created_at: now() - Duration::days(1),
        received_at: None,
    });

    let report = engine().advance(&store, now()).await.unwrap();

    assert!(report.started.is_empty());
    assert!(store.state.lock().unwrap().adjust_calls.is_empty());
}

#[tokio::test]
async fn test_completed_line_starts_next_order_same_run() {
    let store = MemoryStore::new(
        vec![
            running(1, ProductType::Liter, 2_000, 180),
            pending(2, ProductType::Liter, 100, 30),
            pending(3, ProductType::Liter, 100, 20),
        ],
        inventory(1e6, 1e6, 1e6),
    );

    let report = engine().advance(&store, now()).await.unwrap();

    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.started.len(), 1);
    assert_eq!(report.started[0].order_id, 2);
    assert_eq!(store.order(3).production_status, ProductionStatus::Pending);
}

#[tokio::test]
async fn test_out_of_range_order_is_never_started() {
    // 10^13 件 liter = 50 亿小时，完工时刻超出 DateTime 范围
    let store = MemoryStore::new(
        vec![
            pending(1, ProductType::Liter, 10_000_000_000_000, 30),
            pending(2, ProductType::Gallon, 100, 20),
        ],
        inventory(1e15, 1e15, 1e15),
    );

    let report = engine().advance(&store, now()).await.unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].order_id, 1);
    assert_eq!(report.skipped[0].reason, SkipReason::DurationOutOfRange);
    assert_eq!(store.order(1).production_status, ProductionStatus::Pending);
    assert_eq!(report.started.len(), 1);
    assert_eq!(report.started[0].order_id, 2);
    // 只扣减了 gallon 单 (pet 65 * 100)
    assert_eq!(store.stock(Material::Pet), 1e15 - 6_500.0);
}

#[tokio::test]
async fn test_out_of_range_running_order_does_not_wedge_advance() {
    let store = MemoryStore::new(
        vec![
            running(1, ProductType::Liter, 10_000_000_000_000, 60),
            running(2, ProductType::Gallon, 1_500, 120),
            pending(3, ProductType::Gallon, 100, 30),
        ],
        inventory(1e6, 1e6, 1e6),
    );

    let report = engine().advance(&store, now()).await.unwrap();

    assert_eq!(store.order(1).production_status, ProductionStatus::InProduction);
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.completed[0].order_id, 2);
    assert_eq!(report.started.len(), 1);
    assert_eq!(report.started[0].order_id, 3);

    // 再次推进同样不会失败
    let again = engine().advance(&store, now() + Duration::hours(1)).await.unwrap();
    assert!(again.completed.iter().all(|c| c.order_id != 1));
}

#[tokio::test]
async fn test_failed_deduction_rolls_back_earlier_materials() {
    let store = MemoryStore::new(vec![pending(1, ProductType::Liter, 10, 5)], inventory(500.0, 500.0, 500.0));
    store.state.lock().unwrap().fail_deduct_for = Some(Material::Eg);

    let report = engine().advance(&store, now()).await.unwrap();

    assert!(report.started.is_empty());
    match &report.skipped[0].reason {
        SkipReason::LedgerWriteFailed {
            material,
            rollback_failed,
            ..
        } => {
            assert_eq!(*material, Material::Eg);
            assert!(rollback_failed.is_empty());
        }
        other => panic!("unexpected skip reason: {:?}", other),
    }

    // pet/pta 已扣减后被补回
    assert_eq!(store.stock(Material::Pet), 500.0);
    assert_eq!(store.stock(Material::Pta), 500.0);
    assert_eq!(store.order(1).production_status, ProductionStatus::Pending);

    let calls = store.state.lock().unwrap().adjust_calls.clone();
    assert_eq!(
        calls,
        vec![
            (Material::Pet, -200.0),
            (Material::Pta, -150.0),
            (Material::Eg, -100.0),
            (Material::Pta, 150.0),
            (Material::Pet, 200.0),
        ]
    );
}

#[tokio::test]
async fn test_failed_rollback_is_reported() {
    let store = MemoryStore::new(vec![pending(1, ProductType::Liter, 10, 5)], inventory(500.0, 500.0, 500.0));
    {
        let mut state = store.state.lock().unwrap();
        state.fail_deduct_for = Some(Material::Eg);
        state.fail_credit_for = Some(Material::Pet);
    }

    let report = engine().advance(&store, now()).await.unwrap();

    match &report.skipped[0].reason {
        SkipReason::LedgerWriteFailed { rollback_failed, .. } => {
            assert_eq!(rollback_failed, &vec![Material::Pet]);
        }
        other => panic!("unexpected skip reason: {:?}", other),
    }
    assert_eq!(store.stock(Material::Pet), 300.0);
}

#[tokio::test]
async fn test_failed_deduction_does_not_block_next_candidate() {
    let store = MemoryStore::new(
        vec![
            pending(1, ProductType::Liter, 10, 20),
            pending(2, ProductType::Gallon, 10, 10),
        ],
        inventory(10_000.0, 10_000.0, 10_000.0),
    );
    store.state.lock().unwrap().fail_deduct_for = Some(Material::Eg);

    let report = engine().advance(&store, now()).await.unwrap();

    // 两单都因 eg 扣减失败被跳过，整次推进不报错
    assert_eq!(report.skipped.len(), 2);
    assert!(report.started.is_empty());
    assert_eq!(store.stock(Material::Pet), 10_000.0);
}

#[tokio::test]
async fn test_mark_started_failure_aborts_run_and_restores_stock() {
    let store = MemoryStore::new(vec![pending(1, ProductType::Liter, 10, 5)], inventory(500.0, 500.0, 500.0));
    store.state.lock().unwrap().fail_mark_started = true;

    let result = engine().advance(&store, now()).await;

    assert!(matches!(result, Err(EngineError::StoreWrite { order_id: 1, .. })));
    assert_eq!(store.stock(Material::Pet), 500.0);
    assert_eq!(store.stock(Material::Eg), 500.0);
}

#[tokio::test]
async fn test_read_failure_is_fatal() {
    let store = MemoryStore::new(vec![pending(1, ProductType::Liter, 10, 5)], inventory(500.0, 500.0, 500.0));
    store.state.lock().unwrap().fail_reads = true;

    let result = engine().advance(&store, now()).await;
    assert!(matches!(result, Err(EngineError::StoreRead(_))));
}
