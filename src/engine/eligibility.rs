// ==========================================
// 门店盘点值班轮转系统 - 值班资格引擎
// ==========================================
// 职责: 计算指定日期的可值班员工集合,
//       以及候选人被跳过时的类型化原因
// 红线: 逐日重新计算,绝不跨日期缓存 ——
//       请假/缺勤数据随时会变
// ==========================================

use crate::domain::employee::Employee;
use crate::domain::types::{Availability, SkipReason};
use crate::repository::{
    AttendanceRepository, EmployeeRepository, ExclusionRepository, RepositoryResult,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// EligibilityEngine - 值班资格引擎
// ==========================================
pub struct EligibilityEngine {
    employee_repo: Arc<EmployeeRepository>,
    attendance_repo: Arc<AttendanceRepository>,
    exclusion_repo: Arc<ExclusionRepository>,
}

impl EligibilityEngine {
    /// 创建新的资格引擎实例
    pub fn new(
        employee_repo: Arc<EmployeeRepository>,
        attendance_repo: Arc<AttendanceRepository>,
        exclusion_repo: Arc<ExclusionRepository>,
    ) -> Self {
        Self {
            employee_repo,
            attendance_repo,
            exclusion_repo,
        }
    }

    /// 计算指定日期的可值班员工集合
    ///
    /// 可值班 = 在职 且 非店长 且 非永久豁免 且 当日无按日豁免
    ///          且 出勤状态为 WORK
    pub fn eligible_employees(&self, date: NaiveDate) -> RepositoryResult<HashSet<String>> {
        let excluded_today = self.exclusion_repo.excluded_set(date)?;
        let mut eligible = HashSet::new();

        for employee in self.employee_repo.list_active()? {
            if employee.is_manager || employee.excluded_from_duty {
                continue;
            }
            if excluded_today.contains(&employee.employee_id) {
                continue;
            }
            if self
                .attendance_repo
                .availability_for(&employee.employee_id, date)?
                == Availability::Work
            {
                eligible.insert(employee.employee_id);
            }
        }

        debug!(date = %date, count = eligible.len(), "当日可值班集合计算完成");
        Ok(eligible)
    }

    /// 解析候选人当日被跳过的原因
    ///
    /// # 判定顺序
    /// 1. 当日豁免 → EXCLUDED_TODAY
    /// 2. 店长 / 永久豁免 → EXCLUDED
    /// 3. 出勤 LEAVE / OFF / ABSENT → 对应原因
    /// 4. 其余 (离职 / 不在花名册) → INACTIVE
    pub fn skip_reason_for(
        &self,
        employee_id: &str,
        date: NaiveDate,
        excluded_today: &HashSet<String>,
    ) -> RepositoryResult<SkipReason> {
        if excluded_today.contains(employee_id) {
            return Ok(SkipReason::ExcludedToday);
        }

        let employee: Option<Employee> = self.employee_repo.find_by_id(employee_id)?;
        let employee = match employee {
            Some(e) => e,
            None => return Ok(SkipReason::Inactive),
        };

        if employee.is_manager || employee.excluded_from_duty {
            return Ok(SkipReason::Excluded);
        }

        match self.attendance_repo.availability_for(employee_id, date)? {
            Availability::Leave => Ok(SkipReason::Leave),
            Availability::Off => Ok(SkipReason::Off),
            Availability::Absent => Ok(SkipReason::Absent),
            Availability::Work => Ok(SkipReason::Inactive),
        }
    }
}
