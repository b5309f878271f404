// ==========================================
// 门店盘点值班轮转系统 - 按日豁免仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: duty_exclusion 表的数据访问
// 约束: (exclusion_date, employee_id) 唯一,增删均幂等
// ==========================================

use crate::domain::exclusion::DutyExclusion;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{DATETIME_FMT, DATE_FMT};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// ExclusionRepository - 按日豁免仓储
// ==========================================
pub struct ExclusionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ExclusionRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 幂等插入/更新豁免
    pub fn upsert(&self, exclusion: &DutyExclusion) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO duty_exclusion (exclusion_date, employee_id, reason, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(exclusion_date, employee_id) DO UPDATE SET
                reason = excluded.reason,
                created_by = excluded.created_by
            "#,
            params![
                exclusion.exclusion_date.format(DATE_FMT).to_string(),
                exclusion.employee_id,
                exclusion.reason,
                exclusion.created_by,
                exclusion.created_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 幂等删除豁免
    ///
    /// # 返回
    /// - Ok(true): 删除了一条
    /// - Ok(false): 豁免不存在 (同样视为成功)
    pub fn delete(&self, date: NaiveDate, employee_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM duty_exclusion WHERE exclusion_date = ?1 AND employee_id = ?2",
            params![date.format(DATE_FMT).to_string(), employee_id],
        )?;
        Ok(rows == 1)
    }

    /// 查询指定日期的全部豁免
    pub fn list_for_date(&self, date: NaiveDate) -> RepositoryResult<Vec<DutyExclusion>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT exclusion_date, employee_id, reason, created_by, created_at
            FROM duty_exclusion
            WHERE exclusion_date = ?1
            ORDER BY employee_id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![date.format(DATE_FMT).to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut exclusions = Vec::new();
        for row in rows {
            let (date_str, employee_id, reason, created_by, created_at) = row?;
            exclusions.push(DutyExclusion {
                exclusion_date: NaiveDate::parse_from_str(&date_str, DATE_FMT).map_err(|e| {
                    RepositoryError::ValidationError(format!("日期格式无效: {} ({})", date_str, e))
                })?,
                employee_id,
                reason,
                created_by,
                created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT)
                    .unwrap_or_default(),
            });
        }
        Ok(exclusions)
    }

    /// 查询指定日期被豁免的员工集合
    pub fn excluded_set(&self, date: NaiveDate) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT employee_id FROM duty_exclusion WHERE exclusion_date = ?1",
        )?;

        let rows = stmt.query_map(params![date.format(DATE_FMT).to_string()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut set = HashSet::new();
        for row in rows {
            set.insert(row?);
        }
        Ok(set)
    }
}
