// ==========================================
// 门店盘点值班轮转系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 内嵌建表 DDL，保证新库可直接初始化
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 内嵌建表 DDL（幂等，可重复执行）
///
/// 表说明:
/// - employee / attendance_day / leave_request: 外部花名册与考勤数据的本地投影（本系统只读）
/// - rotation_config / rotation_member: 轮转配置（单例 + 有序成员）
/// - duty_run / duty_skip: 每日值班记录与跳过明细（run_date 唯一约束承担并发去重）
/// - waiting_queue: 补班等待队列（每人至多一条活跃条目）
/// - duty_exclusion: 按日豁免（店长手工操作）
/// - action_log: 审计日志（只写）
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS employee (
    employee_id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    is_manager INTEGER NOT NULL DEFAULT 0,
    excluded_from_duty INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS attendance_day (
    employee_id TEXT NOT NULL REFERENCES employee(employee_id),
    work_date TEXT NOT NULL,
    status TEXT NOT NULL,
    PRIMARY KEY (employee_id, work_date)
);

CREATE TABLE IF NOT EXISTS leave_request (
    leave_id TEXT PRIMARY KEY,
    employee_id TEXT NOT NULL REFERENCES employee(employee_id),
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    leave_kind TEXT NOT NULL,
    approved INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS rotation_config (
    config_id TEXT PRIMARY KEY,
    enabled INTEGER NOT NULL DEFAULT 1,
    monthly_rebalance_enabled INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rotation_member (
    config_id TEXT NOT NULL REFERENCES rotation_config(config_id),
    employee_id TEXT NOT NULL,
    base_order_index INTEGER NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (config_id, employee_id),
    UNIQUE (config_id, base_order_index)
);

CREATE TABLE IF NOT EXISTS duty_run (
    run_date TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    assigned_employee_id TEXT,
    source TEXT,
    unassigned_reason TEXT,
    completed_by TEXT,
    completed_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS duty_skip (
    run_date TEXT NOT NULL REFERENCES duty_run(run_date) ON DELETE CASCADE,
    seq INTEGER NOT NULL,
    employee_id TEXT NOT NULL,
    skip_reason TEXT NOT NULL,
    PRIMARY KEY (run_date, seq)
);

CREATE TABLE IF NOT EXISTS waiting_queue (
    employee_id TEXT PRIMARY KEY,
    reason TEXT NOT NULL,
    queued_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    last_skipped_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS duty_exclusion (
    exclusion_date TEXT NOT NULL,
    employee_id TEXT NOT NULL,
    reason TEXT,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (exclusion_date, employee_id)
);

CREATE TABLE IF NOT EXISTS action_log (
    action_id TEXT PRIMARY KEY,
    action_type TEXT NOT NULL,
    action_ts TEXT NOT NULL,
    actor TEXT NOT NULL,
    entity_type TEXT,
    entity_id TEXT,
    before_json TEXT,
    after_json TEXT,
    detail TEXT
);

INSERT OR IGNORE INTO schema_version (version) VALUES (1);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
