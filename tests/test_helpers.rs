// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时测试数据库初始化、花名册/考勤/请假
//       测试数据写入、应用状态装配
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use duty_rotation::app::AppState;
use duty_rotation::db;
use duty_rotation::domain::rotation::RotationMember;
use rusqlite::params;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 测试环境: 临时数据库 + 完整装配的应用状态
///
/// NamedTempFile 需要保持存活,否则数据库文件被提前删除
pub struct TestEnv {
    _temp_file: NamedTempFile,
    pub conn: Arc<Mutex<rusqlite::Connection>>,
    pub state: AppState,
}

/// 创建临时测试数据库并装配应用状态
pub fn setup() -> TestEnv {
    let temp_file = NamedTempFile::new().expect("创建临时数据库文件失败");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path).expect("打开测试数据库失败");
    db::init_schema(&conn).expect("初始化 schema 失败");

    let conn = Arc::new(Mutex::new(conn));
    let state = AppState::from_connection(conn.clone());

    TestEnv {
        _temp_file: temp_file,
        conn,
        state,
    }
}

/// 插入员工
pub fn insert_employee(
    env: &TestEnv,
    employee_id: &str,
    display_name: &str,
    active: bool,
    is_manager: bool,
    excluded_from_duty: bool,
) {
    let conn = env.conn.lock().unwrap();
    conn.execute(
        r#"
        INSERT INTO employee (employee_id, display_name, active, is_manager, excluded_from_duty)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            employee_id,
            display_name,
            active as i64,
            is_manager as i64,
            excluded_from_duty as i64
        ],
    )
    .expect("插入员工失败");
}

/// 插入普通在职员工 (非店长、非豁免)
pub fn insert_staff(env: &TestEnv, employee_id: &str, display_name: &str) {
    insert_employee(env, employee_id, display_name, true, false, false);
}

/// 写入考勤记录
pub fn set_attendance(env: &TestEnv, employee_id: &str, date: NaiveDate, status: &str) {
    let conn = env.conn.lock().unwrap();
    conn.execute(
        r#"
        INSERT INTO attendance_day (employee_id, work_date, status)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(employee_id, work_date) DO UPDATE SET status = excluded.status
        "#,
        params![employee_id, date.format("%Y-%m-%d").to_string(), status],
    )
    .expect("写入考勤记录失败");
}

/// 写入已批准请假
pub fn insert_leave(
    env: &TestEnv,
    employee_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    kind: &str,
) {
    let conn = env.conn.lock().unwrap();
    let leave_id = format!("L-{}-{}", employee_id, start.format("%Y%m%d"));
    conn.execute(
        r#"
        INSERT INTO leave_request (leave_id, employee_id, start_date, end_date, leave_kind, approved)
        VALUES (?1, ?2, ?3, ?4, ?5, 1)
        "#,
        params![
            leave_id,
            employee_id,
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
            kind
        ],
    )
    .expect("写入请假记录失败");
}

/// 按给定顺序显式播种轮转成员
pub fn seed_rotation(env: &TestEnv, employee_ids: &[&str]) {
    env.state
        .config_repo
        .get_or_create()
        .expect("创建轮转配置失败");

    let members: Vec<RotationMember> = employee_ids
        .iter()
        .enumerate()
        .map(|(i, id)| RotationMember {
            employee_id: id.to_string(),
            base_order_index: i as i32,
            active: true,
        })
        .collect();
    env.state
        .config_repo
        .insert_members(&members)
        .expect("播种轮转成员失败");
}

/// 标准三人门店: E001/E002/E003 均为普通在职员工,
/// 轮转顺序 E001 -> E002 -> E003
pub fn setup_three_member_store() -> TestEnv {
    let env = setup();
    insert_staff(&env, "E001", "张三");
    insert_staff(&env, "E002", "李四");
    insert_staff(&env, "E003", "王五");
    seed_rotation(&env, &["E001", "E002", "E003"]);
    env
}

/// 日期快捷构造
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
