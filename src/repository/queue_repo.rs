// ==========================================
// 门店盘点值班轮转系统 - 等待队列仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: waiting_queue 表的数据访问
// 并发: 过期清理为"先查后删"单事务,避免两次并发
//       分配消费同一条目
// ==========================================

use crate::domain::queue::WaitingQueueEntry;
use crate::domain::types::SkipReason;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{DATETIME_FMT, DATE_FMT};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// WaitingQueueRepository - 等待队列仓储
// ==========================================
pub struct WaitingQueueRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WaitingQueueRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部条目 (queued_at 升序, FIFO)
    pub fn list_ordered(&self) -> RepositoryResult<Vec<WaitingQueueEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT employee_id, reason, queued_at, expires_at, last_skipped_date
            FROM waiting_queue
            ORDER BY queued_at ASC, employee_id ASC
            "#,
        )?;

        let rows = stmt.query_map([], Self::map_row_tuple)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(Self::build_entry(row?)?);
        }
        Ok(entries)
    }

    /// 按员工查询条目
    pub fn find_by_employee(
        &self,
        employee_id: &str,
    ) -> RepositoryResult<Option<WaitingQueueEntry>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT employee_id, reason, queued_at, expires_at, last_skipped_date
                FROM waiting_queue
                WHERE employee_id = ?1
                "#,
                params![employee_id],
                Self::map_row_tuple,
            )
            .optional()?;
        match result {
            Some(raw) => Ok(Some(Self::build_entry(raw)?)),
            None => Ok(None),
        }
    }

    /// 删除所有已过期条目并返回被删条目 (单事务)
    pub fn delete_expired(
        &self,
        now: NaiveDateTime,
    ) -> RepositoryResult<Vec<WaitingQueueEntry>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let now_str = now.format(DATETIME_FMT).to_string();
        let mut expired = Vec::new();
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT employee_id, reason, queued_at, expires_at, last_skipped_date
                FROM waiting_queue
                WHERE expires_at <= ?1
                ORDER BY queued_at ASC
                "#,
            )?;
            let rows = stmt.query_map(params![now_str], Self::map_row_tuple)?;
            for row in rows {
                expired.push(Self::build_entry(row?)?);
            }
        }

        tx.execute(
            "DELETE FROM waiting_queue WHERE expires_at <= ?1",
            params![now_str],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(expired)
    }

    /// 插入或刷新条目
    ///
    /// 已存在时刷新 reason / last_skipped_date / expires_at,
    /// 保留原 queued_at (不改变 FIFO 排位)
    pub fn upsert(&self, entry: &WaitingQueueEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO waiting_queue (employee_id, reason, queued_at, expires_at, last_skipped_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(employee_id) DO UPDATE SET
                reason = excluded.reason,
                expires_at = excluded.expires_at,
                last_skipped_date = excluded.last_skipped_date
            "#,
            params![
                entry.employee_id,
                entry.reason.to_db_str(),
                entry.queued_at.format(DATETIME_FMT).to_string(),
                entry.expires_at.format(DATETIME_FMT).to_string(),
                entry.last_skipped_date.format(DATE_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 按员工删除条目 (消费时调用)
    ///
    /// # 返回
    /// - Ok(true): 删除了一条
    /// - Ok(false): 条目不存在
    pub fn delete_by_employee(&self, employee_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM waiting_queue WHERE employee_id = ?1",
            params![employee_id],
        )?;
        Ok(rows == 1)
    }

    fn map_row_tuple(
        row: &rusqlite::Row<'_>,
    ) -> rusqlite::Result<(String, String, String, String, String)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn build_entry(
        raw: (String, String, String, String, String),
    ) -> RepositoryResult<WaitingQueueEntry> {
        let (employee_id, reason, queued_at, expires_at, last_skipped_date) = raw;
        Ok(WaitingQueueEntry {
            employee_id,
            reason: SkipReason::from_db_str(&reason).ok_or_else(|| {
                RepositoryError::ValidationError(format!("未知的跳过原因: {}", reason))
            })?,
            queued_at: parse_datetime(&queued_at)?,
            expires_at: parse_datetime(&expires_at)?,
            last_skipped_date: NaiveDate::parse_from_str(&last_skipped_date, DATE_FMT)
                .map_err(|e| {
                    RepositoryError::ValidationError(format!(
                        "日期格式无效: {} ({})",
                        last_skipped_date, e
                    ))
                })?,
        })
    }
}

fn parse_datetime(s: &str) -> RepositoryResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .map_err(|e| RepositoryError::ValidationError(format!("时间格式无效: {} ({})", s, e)))
}
