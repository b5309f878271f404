// ==========================================
// 门店盘点值班轮转系统 - 每日触发入口
// ==========================================
// 用法: duty-rotation [YYYY-MM-DD]
// 说明: 不带参数时处理当天;每月 1 日先执行
//       月度再平衡,再做当日分配 (两者均幂等)
// ==========================================

use chrono::{Datelike, Local, NaiveDate};
use duty_rotation::app::{get_default_db_path, AppState};
use duty_rotation::logging;
use tracing::{error, info};

fn main() {
    logging::init();
    info!(version = duty_rotation::VERSION, "门店盘点值班轮转系统启动");

    let date = match parse_date_arg() {
        Ok(d) => d,
        Err(msg) => {
            error!("{}", msg);
            std::process::exit(1);
        }
    };

    let db_path = get_default_db_path();
    let state = match AppState::new(&db_path) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, db_path, "应用初始化失败");
            std::process::exit(1);
        }
    };

    // 每月 1 日: 进入新月份,先按上月完成次数再平衡
    if date.day() == 1 {
        let month_key = format!("{:04}-{:02}", date.year(), date.month());
        match state.duty_api.trigger_rebalance(&month_key, "system") {
            Ok(outcome) if outcome.applied => {
                info!(month = %outcome.month_key, order = ?outcome.order, "月度再平衡已执行");
            }
            Ok(_) => info!(month = %month_key, "月度再平衡开关关闭,跳过"),
            Err(e) => error!(error = %e, month = %month_key, "月度再平衡失败"),
        }
    }

    match state.duty_api.get_or_create_run(date, "system") {
        Ok(detail) => {
            info!(
                date = %detail.run.run_date,
                status = %detail.run.status,
                assignee = detail.run.assigned_employee_id.as_deref().unwrap_or("-"),
                assignee_name = detail.assignee_name.as_deref().unwrap_or("-"),
                skips = detail.skips.len(),
                "当日值班分配完成"
            );
        }
        Err(e) => {
            error!(error = %e, date = %date, "当日值班分配失败");
            std::process::exit(1);
        }
    }
}

/// 解析可选的日期参数 (缺省为当天)
fn parse_date_arg() -> Result<NaiveDate, String> {
    match std::env::args().nth(1) {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")
            .map_err(|_| format!("日期格式无效: {} (应为 YYYY-MM-DD)", arg)),
        None => Ok(Local::now().date_naive()),
    }
}
