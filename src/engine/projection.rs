// ==========================================
// 门店盘点值班轮转系统 - 值班预测引擎
// ==========================================
// 职责: 只读前瞻 —— 与分配引擎共用同一套轮转行走,
//       但绝不持久化记录、绝不触碰等待队列
// 说明: 未来的请假/缺勤数据仍会变化,结果始终附带
//       参考性提示
// ==========================================

use crate::domain::types::UnassignedReason;
use crate::engine::eligibility::EligibilityEngine;
use crate::engine::walk::walk_rotation;
use crate::repository::{ExclusionRepository, RepositoryResult, RotationConfigRepository};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

/// 预测结果固定附带的参考性提示
const ADVISORY_NOTE: &str = "预测结果仅供参考,执行前出勤与请假数据仍可能变化";

// ==========================================
// ProjectedAssignee - 预测结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ProjectedAssignee {
    pub date: NaiveDate,
    pub employee_id: Option<String>,
    pub note: String,
}

// ==========================================
// ProjectionEngine - 值班预测引擎
// ==========================================
pub struct ProjectionEngine {
    config_repo: Arc<RotationConfigRepository>,
    exclusion_repo: Arc<ExclusionRepository>,
    eligibility: Arc<EligibilityEngine>,
}

impl ProjectionEngine {
    /// 创建新的预测引擎实例
    pub fn new(
        config_repo: Arc<RotationConfigRepository>,
        exclusion_repo: Arc<ExclusionRepository>,
        eligibility: Arc<EligibilityEngine>,
    ) -> Self {
        Self {
            config_repo,
            exclusion_repo,
            eligibility,
        }
    }

    /// 预测指定日期的值班人 (只读,不创建任何记录)
    pub fn project(&self, date: NaiveDate) -> RepositoryResult<ProjectedAssignee> {
        // 只读路径: 配置不存在时不创建
        let config = match self.config_repo.get()? {
            Some(c) => c,
            None => return Ok(self.unassigned(date, UnassignedReason::NoMembers)),
        };
        if !config.enabled {
            return Ok(self.unassigned(date, UnassignedReason::Disabled));
        }

        let members = self.config_repo.list_active_members()?;
        if members.is_empty() {
            return Ok(self.unassigned(date, UnassignedReason::NoMembers));
        }

        let eligible = self.eligibility.eligible_employees(date)?;
        let excluded_today = self.exclusion_repo.excluded_set(date)?;
        let outcome = walk_rotation(&members, date, &eligible, |employee_id| {
            self.eligibility
                .skip_reason_for(employee_id, date, &excluded_today)
        })?;

        match outcome.assignee {
            Some(employee_id) => Ok(ProjectedAssignee {
                date,
                employee_id: Some(employee_id),
                note: ADVISORY_NOTE.to_string(),
            }),
            None => Ok(self.unassigned(date, UnassignedReason::NoEligible)),
        }
    }

    fn unassigned(&self, date: NaiveDate, reason: UnassignedReason) -> ProjectedAssignee {
        ProjectedAssignee {
            date,
            employee_id: None,
            note: format!("{};{}", reason.description(), ADVISORY_NOTE),
        }
    }
}
