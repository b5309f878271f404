// ==========================================
// 门店盘点值班轮转系统 - 按日豁免 API
// ==========================================
// 职责: 按日豁免的增删查 —— 全部幂等
// 说明: 豁免只影响未来的分配/重算,不自动改写
//       已持久化的值班记录
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::exclusion::DutyExclusion;
use crate::domain::ActionType;
use crate::engine::AuditRecorder;
use crate::repository::{EmployeeRepository, ExclusionRepository};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 豁免详情 (含显示姓名)
#[derive(Debug, Clone, Serialize)]
pub struct ExclusionDetail {
    pub exclusion_date: NaiveDate,
    pub employee_id: String,
    pub display_name: String,
    pub reason: Option<String>,
    pub created_by: String,
}

// ==========================================
// ExclusionApi - 按日豁免接口
// ==========================================
pub struct ExclusionApi {
    exclusion_repo: Arc<ExclusionRepository>,
    employee_repo: Arc<EmployeeRepository>,
    audit: Arc<AuditRecorder>,
}

impl ExclusionApi {
    /// 创建新的豁免接口实例
    pub fn new(
        exclusion_repo: Arc<ExclusionRepository>,
        employee_repo: Arc<EmployeeRepository>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            exclusion_repo,
            employee_repo,
            audit,
        }
    }

    /// 添加按日豁免 (幂等: 重复添加刷新原因/操作人)
    pub fn add_exclusion(
        &self,
        date: NaiveDate,
        employee_id: &str,
        reason: Option<String>,
        created_by: &str,
    ) -> ApiResult<()> {
        if employee_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("员工ID不能为空".to_string()));
        }
        if created_by.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }
        if self.employee_repo.find_by_id(employee_id)?.is_none() {
            return Err(ApiError::NotFound(format!("员工 ({})", employee_id)));
        }

        let exclusion = DutyExclusion {
            exclusion_date: date,
            employee_id: employee_id.to_string(),
            reason,
            created_by: created_by.to_string(),
            created_at: Local::now().naive_local(),
        };
        self.exclusion_repo.upsert(&exclusion)?;

        self.audit.record(
            ActionType::ExclusionAdd,
            created_by,
            "duty_exclusion",
            &format!("{}:{}", date, employee_id),
            None,
            serde_json::to_value(&exclusion).ok(),
            Some(format!("按日豁免添加: {} @ {}", employee_id, date)),
        );
        info!(date = %date, employee_id, "按日豁免已添加");
        Ok(())
    }

    /// 移除按日豁免 (幂等: 不存在时静默成功)
    pub fn remove_exclusion(
        &self,
        date: NaiveDate,
        employee_id: &str,
        actor: &str,
    ) -> ApiResult<()> {
        if employee_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("员工ID不能为空".to_string()));
        }

        let removed = self.exclusion_repo.delete(date, employee_id)?;
        if removed {
            self.audit.record(
                ActionType::ExclusionRemove,
                actor,
                "duty_exclusion",
                &format!("{}:{}", date, employee_id),
                None,
                None,
                Some(format!("按日豁免移除: {} @ {}", employee_id, date)),
            );
            info!(date = %date, employee_id, "按日豁免已移除");
        }
        Ok(())
    }

    /// 查询指定日期的全部豁免 (含显示姓名)
    pub fn list_exclusions(&self, date: NaiveDate) -> ApiResult<Vec<ExclusionDetail>> {
        let mut details = Vec::new();
        for exclusion in self.exclusion_repo.list_for_date(date)? {
            let display_name = self
                .employee_repo
                .display_name(&exclusion.employee_id)?
                .unwrap_or_else(|| exclusion.employee_id.clone());
            details.push(ExclusionDetail {
                exclusion_date: exclusion.exclusion_date,
                employee_id: exclusion.employee_id,
                display_name,
                reason: exclusion.reason,
                created_by: exclusion.created_by,
            });
        }
        Ok(details)
    }
}
