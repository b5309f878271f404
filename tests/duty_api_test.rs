// ==========================================
// 值班 API 集成测试
// ==========================================
// 测试目标: 完成值班的权限与终态保护、店长重算、
//           按日豁免增删查、只读预测、月度统计
// ==========================================

mod test_helpers;

use duty_rotation::api::ApiError;
use duty_rotation::domain::types::{ActorRole, DutyStatus};
use test_helpers::*;

// ==========================================
// 完成值班
// ==========================================

#[test]
fn test_assignee_completes_own_duty() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);
    env.state.duty_api.get_or_create_run(d, "system").unwrap();

    let run = env
        .state
        .duty_api
        .mark_completed(d, "E002", "E002", ActorRole::Staff)
        .unwrap();

    assert_eq!(run.status, DutyStatus::Completed);
    assert_eq!(run.completed_by.as_deref(), Some("E002"));
    assert!(run.completed_at.is_some());
}

#[test]
fn test_staff_cannot_complete_for_someone_else() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);
    env.state.duty_api.get_or_create_run(d, "system").unwrap();

    // 被分配人是 E002,E001 以普通员工身份代为完成被拒
    let err = env
        .state
        .duty_api
        .mark_completed(d, "E001", "E001", ActorRole::Staff)
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    // 店长代完成放行
    let run = env
        .state
        .duty_api
        .mark_completed(d, "E001", "M001", ActorRole::Manager)
        .unwrap();
    assert_eq!(run.completed_by.as_deref(), Some("E001"));
}

#[test]
fn test_completed_run_is_terminal() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);
    env.state.duty_api.get_or_create_run(d, "system").unwrap();
    env.state
        .duty_api
        .mark_completed(d, "E002", "E002", ActorRole::Staff)
        .unwrap();

    // 重复完成被拒,记录不变
    let err = env
        .state
        .duty_api
        .mark_completed(d, "E002", "E002", ActorRole::Staff)
        .unwrap_err();
    assert!(matches!(err, ApiError::AlreadyCompleted(_)));

    // 已完成的记录不可重算
    let err = env.state.duty_api.recompute(d, "M001").unwrap_err();
    assert!(matches!(err, ApiError::AlreadyCompleted(_)));

    let run = env.state.run_repo.find_by_date(d).unwrap().unwrap();
    assert_eq!(run.status, DutyStatus::Completed);
    assert_eq!(run.assigned_employee_id.as_deref(), Some("E002"));
}

#[test]
fn test_complete_without_assignment_is_rejected() {
    let env = setup_three_member_store();
    env.state.config_repo.set_enabled(false).unwrap();
    let d = date(2025, 1, 1);
    env.state.duty_api.get_or_create_run(d, "system").unwrap();

    let err = env
        .state
        .duty_api
        .mark_completed(d, "E002", "E002", ActorRole::Staff)
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
}

// ==========================================
// 店长重算
// ==========================================

#[test]
fn test_recompute_after_exclusion_changes_assignee() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);

    let detail = env.state.duty_api.get_or_create_run(d, "system").unwrap();
    assert_eq!(detail.run.assigned_employee_id.as_deref(), Some("E002"));

    // 店长追加当日豁免后重算,改派下一位
    env.state
        .exclusion_api
        .add_exclusion(d, "E002", Some("临时接待".to_string()), "M001")
        .unwrap();
    let detail = env.state.duty_api.recompute(d, "M001").unwrap();

    assert_eq!(detail.run.assigned_employee_id.as_deref(), Some("E003"));
    assert_eq!(detail.skips.len(), 1);
    assert_eq!(detail.skips[0].employee_id, "E002");
}

#[test]
fn test_recompute_requires_existing_run() {
    let env = setup_three_member_store();
    let err = env
        .state
        .duty_api
        .recompute(date(2025, 1, 1), "M001")
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 按日豁免
// ==========================================

#[test]
fn test_exclusion_add_remove_are_idempotent() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);

    env.state
        .exclusion_api
        .add_exclusion(d, "E002", Some("盘点培训".to_string()), "M001")
        .unwrap();
    // 重复添加刷新原因,不报错
    env.state
        .exclusion_api
        .add_exclusion(d, "E002", Some("收银".to_string()), "M001")
        .unwrap();

    let list = env.state.exclusion_api.list_exclusions(d).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].employee_id, "E002");
    assert_eq!(list[0].display_name, "李四");
    assert_eq!(list[0].reason.as_deref(), Some("收银"));

    env.state
        .exclusion_api
        .remove_exclusion(d, "E002", "M001")
        .unwrap();
    // 重复移除静默成功
    env.state
        .exclusion_api
        .remove_exclusion(d, "E002", "M001")
        .unwrap();
    assert!(env.state.exclusion_api.list_exclusions(d).unwrap().is_empty());
}

#[test]
fn test_exclusion_rejects_unknown_employee() {
    let env = setup_three_member_store();
    let err = env
        .state
        .exclusion_api
        .add_exclusion(date(2025, 1, 1), "E999", None, "M001")
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 只读预测
// ==========================================

#[test]
fn test_projection_persists_nothing() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);

    let projected = env.state.duty_api.project(d).unwrap();
    assert_eq!(projected.employee_id.as_deref(), Some("E002"));
    assert!(!projected.note.is_empty());

    // 预测不创建值班记录、不动队列
    assert!(env.state.run_repo.find_by_date(d).unwrap().is_none());
    assert!(env.state.queue_repo.list_ordered().unwrap().is_empty());
}

#[test]
fn test_projection_reports_no_eligible() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);
    set_attendance(&env, "E001", d, "OFF");
    set_attendance(&env, "E002", d, "OFF");
    set_attendance(&env, "E003", d, "OFF");

    let projected = env.state.duty_api.project(d).unwrap();
    assert!(projected.employee_id.is_none());
    assert!(env.state.run_repo.find_by_date(d).unwrap().is_none());
}

// ==========================================
// 月度统计与 DTO 组装
// ==========================================

#[test]
fn test_monthly_completion_counts() {
    let env = setup_three_member_store();
    let d1 = date(2025, 1, 1);
    let d2 = date(2025, 1, 2);

    env.state.duty_api.get_or_create_run(d1, "system").unwrap();
    env.state
        .duty_api
        .mark_completed(d1, "E002", "E002", ActorRole::Staff)
        .unwrap();
    env.state.duty_api.get_or_create_run(d2, "system").unwrap();

    let counts = env.state.duty_api.monthly_completion_counts("2025-01").unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].employee_id, "E002");
    assert_eq!(counts[0].display_name, "李四");
    assert_eq!(counts[0].completed, 1);
}

#[test]
fn test_run_detail_includes_display_names() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);
    set_attendance(&env, "E002", d, "OFF");

    let detail = env.state.duty_api.get_or_create_run(d, "system").unwrap();
    assert_eq!(detail.run.assigned_employee_id.as_deref(), Some("E003"));
    assert_eq!(detail.assignee_name.as_deref(), Some("王五"));
    assert_eq!(detail.skips.len(), 1);
    assert_eq!(detail.skips[0].display_name, "李四");
}

#[test]
fn test_blank_actor_is_rejected() {
    let env = setup_three_member_store();
    let err = env
        .state
        .duty_api
        .get_or_create_run(date(2025, 1, 1), "  ")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
