// ==========================================
// 门店盘点值班轮转系统 - 审计日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 说明: 审计日志是只写存储,查询仅用于排障与测试
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::DATETIME_FMT;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ActionLogRepository - 审计日志仓储
// ==========================================
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入审计日志
    ///
    /// # 返回
    /// - Ok(action_id): 成功插入
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, action_type, action_ts, actor,
                entity_type, entity_id, before_json, after_json, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                log.action_id,
                log.action_type.as_str(),
                log.action_ts.format(DATETIME_FMT).to_string(),
                log.actor,
                log.entity_type,
                log.entity_id,
                log.before_json.as_ref().map(|v| v.to_string()),
                log.after_json.as_ref().map(|v| v.to_string()),
                log.detail,
            ],
        )?;

        Ok(log.action_id.clone())
    }

    /// 查询最近 N 条日志 (时间倒序)
    pub fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor,
                   entity_type, entity_id, before_json, after_json, detail
            FROM action_log
            ORDER BY action_ts DESC, action_id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<String>>(8)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (action_id, action_type, action_ts, actor, entity_type, entity_id, before, after, detail) =
                row?;
            logs.push(ActionLog {
                action_id,
                action_type: ActionType::from_db_str(&action_type).ok_or_else(|| {
                    RepositoryError::ValidationError(format!("未知的操作类型: {}", action_type))
                })?,
                action_ts: NaiveDateTime::parse_from_str(&action_ts, DATETIME_FMT)
                    .unwrap_or_default(),
                actor,
                entity_type,
                entity_id,
                before_json: before.and_then(|s| serde_json::from_str(&s).ok()),
                after_json: after.and_then(|s| serde_json::from_str(&s).ok()),
                detail,
            });
        }
        Ok(logs)
    }

    /// 按操作类型统计日志条数 (测试/排障用)
    pub fn count_by_type(&self, action_type: ActionType) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE action_type = ?1",
            params![action_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
