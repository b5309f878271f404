// ==========================================
// 门店盘点值班轮转系统 - 考勤/请假仓储 (只读)
// ==========================================
// 红线: Repository 不含业务逻辑
// 角色: 出勤判定的数据来源 (Availability Oracle 的落地实现)
// 约束: 逐日逐人查询,不跨日期缓存 —— 请假/缺勤数据随时会变
// ==========================================

use crate::domain::employee::ApprovedLeave;
use crate::domain::types::{Availability, LeaveKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::DATE_FMT;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// AttendanceRepository - 考勤/请假仓储
// ==========================================
pub struct AttendanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AttendanceRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询员工指定日期的出勤状态
    ///
    /// # 判定顺序
    /// 1. 存在覆盖该日期的已批准请假 → LEAVE
    /// 2. 存在考勤记录 → 按记录状态 (OFF / ABSENT / WORK)
    /// 3. 无记录 → WORK (默认排班出勤)
    pub fn availability_for(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Availability> {
        if self.approved_leave_covering(employee_id, date)?.is_some() {
            return Ok(Availability::Leave);
        }

        let conn = self.get_conn()?;
        let raw: Option<String> = conn
            .query_row(
                r#"
                SELECT status FROM attendance_day
                WHERE employee_id = ?1 AND work_date = ?2
                "#,
                params![employee_id, date.format(DATE_FMT).to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(s) => Availability::from_db_str(&s).ok_or_else(|| {
                RepositoryError::ValidationError(format!("未知的出勤状态: {}", s))
            }),
            None => Ok(Availability::Work),
        }
    }

    /// 查询覆盖指定日期的已批准请假记录
    ///
    /// 同日多条时取最晚结束的一条 (跳过类别判定取决于请假跨度)
    pub fn approved_leave_covering(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<ApprovedLeave>> {
        let conn = self.get_conn()?;
        let date_str = date.format(DATE_FMT).to_string();
        let result = conn
            .query_row(
                r#"
                SELECT employee_id, start_date, end_date, leave_kind
                FROM leave_request
                WHERE employee_id = ?1
                  AND approved = 1
                  AND start_date <= ?2
                  AND end_date >= ?2
                ORDER BY end_date DESC
                LIMIT 1
                "#,
                params![employee_id, date_str],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match result {
            Some((employee_id, start, end, kind)) => {
                let start_date = parse_date(&start)?;
                let end_date = parse_date(&end)?;
                let kind = LeaveKind::from_db_str(&kind).ok_or_else(|| {
                    RepositoryError::ValidationError(format!("未知的请假类型: {}", kind))
                })?;
                Ok(Some(ApprovedLeave {
                    employee_id,
                    start_date,
                    end_date,
                    kind,
                }))
            }
            None => Ok(None),
        }
    }
}

fn parse_date(s: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|e| RepositoryError::ValidationError(format!("日期格式无效: {} ({})", s, e)))
}
