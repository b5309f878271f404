// ==========================================
// 月度再平衡引擎集成测试
// ==========================================
// 测试目标: 按上月完成次数重排顺序、开关控制、
//           非活跃成员排位、无效月份键
// ==========================================

mod test_helpers;

use chrono::{Duration, Local, NaiveDate};
use duty_rotation::api::ApiError;
use duty_rotation::domain::duty_run::DutyRun;
use duty_rotation::domain::types::{AssignmentSource, DutyStatus};
use test_helpers::*;

/// 写入一条指定日期的已完成值班记录
fn insert_completed_run(env: &TestEnv, d: NaiveDate, employee_id: &str) {
    let now = Local::now().naive_local();
    let inserted = env
        .state
        .run_repo
        .try_insert(&DutyRun {
            run_date: d,
            status: DutyStatus::Completed,
            assigned_employee_id: Some(employee_id.to_string()),
            source: Some(AssignmentSource::Rotation),
            unassigned_reason: None,
            completed_by: Some(employee_id.to_string()),
            completed_at: Some(now),
            created_at: now,
            updated_at: now,
        })
        .unwrap();
    assert!(inserted);
}

#[test]
fn test_rebalance_orders_by_prior_month_completions() {
    let env = setup_three_member_store();

    // 2025-07 完成次数: E001=3, E002=1, E003=2
    let july = date(2025, 7, 1);
    for (i, employee_id) in ["E001", "E001", "E001", "E002", "E003", "E003"]
        .iter()
        .enumerate()
    {
        insert_completed_run(&env, july + Duration::days(i as i64), employee_id);
    }

    let outcome = env
        .state
        .rebalance_engine
        .rebalance("2025-08", "system")
        .unwrap();

    assert!(outcome.applied);
    assert_eq!(outcome.order, vec!["E002", "E003", "E001"]);

    let members = env.state.config_repo.list_members().unwrap();
    let ids: Vec<&str> = members.iter().map(|m| m.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["E002", "E003", "E001"]);
}

#[test]
fn test_rebalance_ties_break_by_employee_id() {
    let env = setup_three_member_store();
    // 上月无任何完成记录: 全员并列 0 次,按员工ID升序
    let outcome = env
        .state
        .rebalance_engine
        .rebalance("2025-08", "system")
        .unwrap();

    assert!(outcome.applied);
    assert_eq!(outcome.order, vec!["E001", "E002", "E003"]);
}

#[test]
fn test_inactive_members_stay_after_active_ones() {
    let env = setup_three_member_store();
    {
        let conn = env.conn.lock().unwrap();
        conn.execute(
            "UPDATE rotation_member SET active = 0 WHERE employee_id = 'E001'",
            [],
        )
        .unwrap();
    }
    insert_completed_run(&env, date(2025, 7, 10), "E002");

    let outcome = env
        .state
        .rebalance_engine
        .rebalance("2025-08", "system")
        .unwrap();
    assert_eq!(outcome.order, vec!["E003", "E002"]);

    // 非活跃成员排在全部活跃成员之后
    let members = env.state.config_repo.list_members().unwrap();
    let ids: Vec<&str> = members.iter().map(|m| m.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["E003", "E002", "E001"]);
}

#[test]
fn test_rebalance_disabled_is_noop() {
    let env = setup_three_member_store();
    env.state
        .config_repo
        .set_monthly_rebalance_enabled(false)
        .unwrap();
    insert_completed_run(&env, date(2025, 7, 10), "E003");

    let outcome = env
        .state
        .rebalance_engine
        .rebalance("2025-08", "system")
        .unwrap();

    assert!(!outcome.applied);
    // 顺序保持原样
    let members = env.state.config_repo.list_members().unwrap();
    let ids: Vec<&str> = members.iter().map(|m| m.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["E001", "E002", "E003"]);
}

#[test]
fn test_invalid_month_key_is_rejected() {
    let env = setup_three_member_store();
    let err = env
        .state
        .duty_api
        .trigger_rebalance("2025/08", "system")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
