// ==========================================
// 补班等待队列集成测试
// ==========================================
// 测试目标: SHORT 跳过入队、队列优先于轮转行走、
//           过期清理、自继任保护、条目刷新
// ==========================================

mod test_helpers;

use chrono::{Duration, Local};
use duty_rotation::domain::queue::WaitingQueueEntry;
use duty_rotation::domain::types::{ActorRole, AssignmentSource, SkipReason};
use duty_rotation::domain::ActionType;
use test_helpers::*;

#[test]
fn test_short_skip_enqueues_with_seven_day_expiry() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);
    set_attendance(&env, "E002", d, "OFF");

    let run = env
        .state
        .assignment_engine
        .get_or_create_run(d, "system")
        .unwrap();
    assert_eq!(run.assigned_employee_id.as_deref(), Some("E003"));

    let entry = env
        .state
        .queue_repo
        .find_by_employee("E002")
        .unwrap()
        .expect("排休跳过应产生补班条目");
    assert_eq!(entry.reason, SkipReason::Off);
    assert_eq!(entry.last_skipped_date, d);
    assert_eq!(entry.expires_at - entry.queued_at, Duration::days(7));
}

#[test]
fn test_queue_hit_bypasses_rotation_walk() {
    let env = setup_three_member_store();
    let d1 = date(2025, 1, 1);
    let d2 = date(2025, 1, 2);

    // 第一天: E002 排休被跳过并入队,E003 被分配
    set_attendance(&env, "E002", d1, "OFF");
    env.state
        .assignment_engine
        .get_or_create_run(d1, "system")
        .unwrap();

    // 第二天: E002 回归,队列命中,不走轮转、无跳过明细
    let run = env
        .state
        .assignment_engine
        .get_or_create_run(d2, "system")
        .unwrap();
    assert_eq!(run.assigned_employee_id.as_deref(), Some("E002"));
    assert_eq!(run.source, Some(AssignmentSource::Queue));
    assert!(env.state.run_repo.list_skips(d2).unwrap().is_empty());

    // 条目已被消费
    assert!(env.state.queue_repo.find_by_employee("E002").unwrap().is_none());
    assert_eq!(
        env.state
            .action_log_repo
            .count_by_type(ActionType::QueueConsume)
            .unwrap(),
        1
    );
}

#[test]
fn test_expired_entry_is_purged_not_consumed() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);

    // E001 的补班条目已过期
    let now = Local::now().naive_local();
    env.state
        .queue_repo
        .upsert(&WaitingQueueEntry {
            employee_id: "E001".to_string(),
            reason: SkipReason::Off,
            queued_at: now - Duration::days(10),
            expires_at: now - Duration::days(3),
            last_skipped_date: d - Duration::days(10),
        })
        .unwrap();

    let run = env
        .state
        .assignment_engine
        .get_or_create_run(d, "system")
        .unwrap();

    // 过期条目不参与分配,轮转照常行走 (起点 E002)
    assert_eq!(run.assigned_employee_id.as_deref(), Some("E002"));
    assert_eq!(run.source, Some(AssignmentSource::Rotation));
    assert!(env.state.queue_repo.find_by_employee("E001").unwrap().is_none());
    assert_eq!(
        env.state
            .action_log_repo
            .count_by_type(ActionType::QueueExpire)
            .unwrap(),
        1
    );
}

#[test]
fn test_yesterday_completer_is_not_consumed() {
    let env = setup_three_member_store();
    let d1 = date(2025, 1, 1);
    let d2 = date(2025, 1, 2);

    // 第一天: E002 被分配并完成
    env.state
        .assignment_engine
        .get_or_create_run(d1, "system")
        .unwrap();
    env.state
        .assignment_engine
        .mark_completed(d1, "E002", "E002", ActorRole::Staff)
        .unwrap();

    // E002 手工入队 (模拟历史补班信用)
    let now = Local::now().naive_local();
    env.state
        .queue_repo
        .upsert(&WaitingQueueEntry {
            employee_id: "E002".to_string(),
            reason: SkipReason::Off,
            queued_at: now,
            expires_at: now + Duration::days(7),
            last_skipped_date: d1,
        })
        .unwrap();

    // 第二天: 自继任保护生效,改走轮转 (序号 2 => 起点 E003)
    let run = env
        .state
        .assignment_engine
        .get_or_create_run(d2, "system")
        .unwrap();
    assert_eq!(run.assigned_employee_id.as_deref(), Some("E003"));
    assert_eq!(run.source, Some(AssignmentSource::Rotation));

    // 条目保留,后续日期仍可消费
    assert!(env.state.queue_repo.find_by_employee("E002").unwrap().is_some());
}

#[test]
fn test_repeated_skip_refreshes_single_entry() {
    let env = setup_three_member_store();
    let d1 = date(2025, 1, 1);
    let d2 = date(2025, 1, 2);

    assert!(env
        .state
        .queue_engine
        .try_enqueue("E002", d1, SkipReason::Off)
        .unwrap());
    let first = env
        .state
        .queue_repo
        .find_by_employee("E002")
        .unwrap()
        .unwrap();

    assert!(env
        .state
        .queue_engine
        .try_enqueue("E002", d2, SkipReason::Absent)
        .unwrap());

    let entries = env.state.queue_repo.list_ordered().unwrap();
    assert_eq!(entries.len(), 1);
    // 刷新原因与最近跳过日,保留原 queued_at (FIFO 排位不变)
    assert_eq!(entries[0].queued_at, first.queued_at);
    assert_eq!(entries[0].reason, SkipReason::Absent);
    assert_eq!(entries[0].last_skipped_date, d2);
}

#[test]
fn test_long_leave_does_not_enqueue() {
    let env = setup_three_member_store();
    let d = date(2025, 1, 1);
    insert_leave(&env, "E002", d, date(2025, 1, 5), "SICK");

    assert!(!env
        .state
        .queue_engine
        .try_enqueue("E002", d, SkipReason::Leave)
        .unwrap());
    assert!(env.state.queue_repo.find_by_employee("E002").unwrap().is_none());
}
