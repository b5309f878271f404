// ==========================================
// 门店盘点值班轮转系统 - 每日值班记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: duty_run / duty_skip 表的数据访问
// 并发: run_date 主键约束保证同日至多一行,
//       并发插入的失败方读回胜者结果
// ==========================================

use crate::domain::duty_run::{DutyRun, SkipRecord};
use crate::domain::types::{AssignmentSource, DutyStatus, SkipReason, UnassignedReason};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{DATETIME_FMT, DATE_FMT};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// DutyRunRepository - 每日值班记录仓储
// ==========================================
pub struct DutyRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DutyRunRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按日期查询值班记录
    pub fn find_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<DutyRun>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT run_date, status, assigned_employee_id, source, unassigned_reason,
                       completed_by, completed_at, created_at, updated_at
                FROM duty_run
                WHERE run_date = ?1
                "#,
                params![date.format(DATE_FMT).to_string()],
                Self::map_row,
            )
            .optional()?;
        Ok(result)
    }

    /// 尝试插入新记录
    ///
    /// # 返回
    /// - Ok(true): 插入成功
    /// - Ok(false): 同日记录已存在 (并发竞争失败,调用方应读回胜者)
    pub fn try_insert(&self, run: &DutyRun) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            INSERT OR IGNORE INTO duty_run (
                run_date, status, assigned_employee_id, source, unassigned_reason,
                completed_by, completed_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                run.run_date.format(DATE_FMT).to_string(),
                run.status.to_db_str(),
                run.assigned_employee_id,
                run.source.map(|s| s.to_db_str()),
                run.unassigned_reason.map(|r| r.to_db_str()),
                run.completed_by,
                run.completed_at.map(|t| t.format(DATETIME_FMT).to_string()),
                run.created_at.format(DATETIME_FMT).to_string(),
                run.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(rows == 1)
    }

    /// 更新分配结果 (重算 / 未分配记录的再次分配)
    pub fn update_assignment(&self, run: &DutyRun) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE duty_run
            SET status = ?1, assigned_employee_id = ?2, source = ?3,
                unassigned_reason = ?4, updated_at = ?5
            WHERE run_date = ?6
            "#,
            params![
                run.status.to_db_str(),
                run.assigned_employee_id,
                run.source.map(|s| s.to_db_str()),
                run.unassigned_reason.map(|r| r.to_db_str()),
                run.updated_at.format(DATETIME_FMT).to_string(),
                run.run_date.format(DATE_FMT).to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "duty_run".to_string(),
                id: run.run_date.to_string(),
            });
        }
        Ok(())
    }

    /// 标记完成 (终态写入)
    pub fn mark_completed(
        &self,
        date: NaiveDate,
        completed_by: &str,
        completed_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE duty_run
            SET status = ?1, completed_by = ?2, completed_at = ?3, updated_at = ?3
            WHERE run_date = ?4
            "#,
            params![
                DutyStatus::Completed.to_db_str(),
                completed_by,
                completed_at.format(DATETIME_FMT).to_string(),
                date.format(DATE_FMT).to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "duty_run".to_string(),
                id: date.to_string(),
            });
        }
        Ok(())
    }

    /// 整体重建跳过明细 (删除旧明细 + 写入新明细,单事务)
    pub fn replace_skips(&self, date: NaiveDate, skips: &[SkipRecord]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let date_str = date.format(DATE_FMT).to_string();
        tx.execute("DELETE FROM duty_skip WHERE run_date = ?1", params![date_str])?;
        for skip in skips {
            tx.execute(
                r#"
                INSERT INTO duty_skip (run_date, seq, employee_id, skip_reason)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![date_str, skip.seq, skip.employee_id, skip.reason.to_db_str()],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 查询跳过明细 (按行走顺序)
    pub fn list_skips(&self, date: NaiveDate) -> RepositoryResult<Vec<SkipRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_date, seq, employee_id, skip_reason
            FROM duty_skip
            WHERE run_date = ?1
            ORDER BY seq ASC
            "#,
        )?;

        let rows = stmt.query_map(params![date.format(DATE_FMT).to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut skips = Vec::new();
        for row in rows {
            let (date_str, seq, employee_id, reason) = row?;
            skips.push(SkipRecord {
                run_date: parse_date(&date_str)?,
                seq,
                employee_id,
                reason: SkipReason::from_db_str(&reason).ok_or_else(|| {
                    RepositoryError::ValidationError(format!("未知的跳过原因: {}", reason))
                })?,
            });
        }
        Ok(skips)
    }

    /// 查询指定日期值班的完成人 (自继任保护使用)
    pub fn completed_by_on(&self, date: NaiveDate) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT completed_by FROM duty_run
                WHERE run_date = ?1 AND status = 'COMPLETED'
                "#,
                params![date.format(DATE_FMT).to_string()],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(result.flatten())
    }

    /// 按被分配人统计日期区间内的完成次数 (含首尾)
    pub fn completion_counts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT assigned_employee_id, COUNT(*)
            FROM duty_run
            WHERE status = 'COMPLETED'
              AND assigned_employee_id IS NOT NULL
              AND run_date >= ?1 AND run_date <= ?2
            GROUP BY assigned_employee_id
            ORDER BY assigned_employee_id ASC
            "#,
        )?;

        let rows = stmt.query_map(
            params![
                from.format(DATE_FMT).to_string(),
                to.format(DATE_FMT).to_string()
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DutyRun> {
        let date_str: String = row.get(0)?;
        let status_str: String = row.get(1)?;
        let source_str: Option<String> = row.get(3)?;
        let reason_str: Option<String> = row.get(4)?;
        let completed_at_str: Option<String> = row.get(6)?;
        let created_at_str: String = row.get(7)?;
        let updated_at_str: String = row.get(8)?;

        Ok(DutyRun {
            run_date: NaiveDate::parse_from_str(&date_str, DATE_FMT)
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            status: DutyStatus::from_db_str(&status_str).unwrap_or(DutyStatus::Unassigned),
            assigned_employee_id: row.get(2)?,
            source: source_str.as_deref().and_then(AssignmentSource::from_db_str),
            unassigned_reason: reason_str.as_deref().and_then(UnassignedReason::from_db_str),
            completed_by: row.get(5)?,
            completed_at: completed_at_str
                .and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FMT).ok()),
            created_at: NaiveDateTime::parse_from_str(&created_at_str, DATETIME_FMT)
                .unwrap_or_default(),
            updated_at: NaiveDateTime::parse_from_str(&updated_at_str, DATETIME_FMT)
                .unwrap_or_default(),
        })
    }
}

fn parse_date(s: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|e| RepositoryError::ValidationError(format!("日期格式无效: {} ({})", s, e)))
}
