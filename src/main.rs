// ==========================================
// 瓶装产线排产系统 - 命令行入口
// ==========================================
// 用法:
//   bottle-line-aps status [--no-advance]
//   bottle-line-aps advance
//   bottle-line-aps orders | supplies | inventory
//   bottle-line-aps add-order <liter|gallon> <customer> <quantity> [notes]
//   bottle-line-aps add-supply <pet|pta|eg> <quantity> <supplier> <eta_rfc3339> [tracking]
//   bottle-line-aps receive <supply_id>
//   bottle-line-aps logs [limit]
//   bottle-line-aps health
// 数据库: BOTTLE_LINE_APS_DB_PATH 或用户数据目录
// 输出: stdout 打印 JSON
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use bottle_line_aps::app::{get_default_db_path, AppState};
use bottle_line_aps::domain::timestamp::{now_millis, parse_ts};
use bottle_line_aps::domain::{NewPurchaseOrder, NewSupply};
use bottle_line_aps::logging;
use serde::Serialize;

const OPERATOR: &str = "cli";

const USAGE: &str = "\
用法: bottle-line-aps <command> [args]

命令:
  status [--no-advance]                 生产状态看板（auto_advance_on_status 开启时先推进）
  advance                               执行一次生产推进
  orders                                订单列表
  supplies                              采购/到货列表
  inventory                             当前库存
  add-order <type> <customer> <qty> [notes]
  add-supply <material> <qty> <supplier> <eta> [tracking]
  receive <supply_id>                   到货入库
  logs [limit]                          最近的操作日志（默认 20）
  health                                健康检查";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{}", USAGE);
        bail!("缺少命令");
    };
    let rest = &args[1..];

    if matches!(command, "help" | "--help" | "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let db_path = get_default_db_path();
    tracing::debug!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match command {
        "status" => {
            let now = now_millis();
            let report = if rest.iter().any(|a| a == "--no-advance") {
                state.production_api.get_production_status(now).await?
            } else {
                state.production_api.refresh_production_status(now).await?
            };
            print_json(&report)
        }
        "advance" => {
            let report = state.production_api.advance_production(now_millis()).await?;
            print_json(&report)
        }
        "orders" => print_json(&state.order_api.list_orders()?),
        "supplies" => print_json(&state.supply_api.list_supplies()?),
        "inventory" => print_json(&state.inventory_api.get_inventory()?),
        "add-order" => {
            let [product_type, customer_name, quantity] = required::<3>(rest, "add-order")?;
            let request = NewPurchaseOrder {
                product_type,
                customer_name,
                quantity: quantity
                    .parse()
                    .with_context(|| format!("数量不是数字: {}", quantity))?,
                notes: rest.get(3).cloned(),
            };
            print_json(&state.order_api.create_order(request, OPERATOR)?)
        }
        "add-supply" => {
            let [material, quantity, supplier_name, eta] = required::<4>(rest, "add-supply")?;
            let request = NewSupply {
                material,
                quantity: quantity
                    .parse()
                    .with_context(|| format!("数量不是数字: {}", quantity))?,
                supplier_name,
                tracking_number: rest.get(4).cloned(),
                eta: parse_ts(&eta).with_context(|| format!("ETA 不是 RFC 3339 时间: {}", eta))?,
            };
            print_json(&state.supply_api.create_supply(request, OPERATOR)?)
        }
        "receive" => {
            let [supply_id] = required::<1>(rest, "receive")?;
            let supply_id: i64 = supply_id
                .parse()
                .with_context(|| format!("supply_id 不是整数: {}", supply_id))?;
            print_json(&state.supply_api.receive_supply(supply_id, OPERATOR)?)
        }
        "logs" => {
            let limit = match rest.first() {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("limit 不是整数: {}", raw))?,
                None => 20,
            };
            print_json(&state.production_api.list_recent_logs(limit)?)
        }
        "health" => print_json(&state.production_api.health()?),
        other => {
            eprintln!("{}", USAGE);
            bail!("未知命令: {}", other)
        }
    }
}

/// 取前 N 个必填参数
fn required<const N: usize>(args: &[String], command: &str) -> Result<[String; N]> {
    if args.len() < N {
        bail!("{} 需要 {} 个参数，实际 {} 个\n\n{}", command, N, args.len(), USAGE);
    }
    let values: Vec<String> = args[..N].to_vec();
    values
        .try_into()
        .map_err(|_| anyhow!("{} 参数数量错误", command))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
