// ==========================================
// 门店盘点值班轮转系统 - 值班 API
// ==========================================
// 职责: 值班记录的对外接口 —— 获取/创建、完成、
//       重算、预测、月度统计与再平衡触发
// 说明: DTO 在此组装 (补充显示姓名),引擎只认员工ID
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::duty_run::DutyRun;
use crate::domain::types::{ActorRole, SkipReason};
use crate::engine::projection::ProjectedAssignee;
use crate::engine::rebalance::{parse_month_key, RebalanceOutcome};
use crate::engine::{DutyAssignmentEngine, MonthlyRebalanceEngine, ProjectionEngine};
use crate::repository::{DutyRunRepository, EmployeeRepository};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

// ==========================================
// DTO 定义
// ==========================================

/// 跳过明细 (含显示姓名)
#[derive(Debug, Clone, Serialize)]
pub struct SkipDetail {
    pub employee_id: String,
    pub display_name: String,
    pub reason: SkipReason,
}

/// 值班记录详情
#[derive(Debug, Clone, Serialize)]
pub struct DutyRunDetail {
    pub run: DutyRun,
    pub assignee_name: Option<String>,
    pub skips: Vec<SkipDetail>,
}

/// 月度完成次数
#[derive(Debug, Clone, Serialize)]
pub struct CompletionCount {
    pub employee_id: String,
    pub display_name: String,
    pub completed: i64,
}

// ==========================================
// DutyApi - 值班接口
// ==========================================
pub struct DutyApi {
    assignment: Arc<DutyAssignmentEngine>,
    projection: Arc<ProjectionEngine>,
    rebalance: Arc<MonthlyRebalanceEngine>,
    run_repo: Arc<DutyRunRepository>,
    employee_repo: Arc<EmployeeRepository>,
}

impl DutyApi {
    /// 创建新的值班接口实例
    pub fn new(
        assignment: Arc<DutyAssignmentEngine>,
        projection: Arc<ProjectionEngine>,
        rebalance: Arc<MonthlyRebalanceEngine>,
        run_repo: Arc<DutyRunRepository>,
        employee_repo: Arc<EmployeeRepository>,
    ) -> Self {
        Self {
            assignment,
            projection,
            rebalance,
            run_repo,
            employee_repo,
        }
    }

    /// 获取或创建指定日期的值班记录 (幂等)
    ///
    /// # 参数
    /// - date: 值班日期
    /// - actor: 触发人 (定时任务为 "system")
    pub fn get_or_create_run(&self, date: NaiveDate, actor: &str) -> ApiResult<DutyRunDetail> {
        validate_actor(actor)?;
        let run = self.assignment.get_or_create_run(date, actor)?;
        self.build_detail(run)
    }

    /// 查询指定日期的值班记录 (只读,不创建)
    pub fn get_run(&self, date: NaiveDate) -> ApiResult<Option<DutyRunDetail>> {
        match self.assignment.run_with_skips(date)? {
            Some((run, _)) => Ok(Some(self.build_detail(run)?)),
            None => Ok(None),
        }
    }

    /// 标记值班完成 (终态)
    ///
    /// 代他人完成需要店长或管理员角色
    pub fn mark_completed(
        &self,
        date: NaiveDate,
        by_employee_id: &str,
        actor: &str,
        role: ActorRole,
    ) -> ApiResult<DutyRun> {
        validate_actor(actor)?;
        if by_employee_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("完成人员工ID不能为空".to_string()));
        }
        if self.employee_repo.find_by_id(by_employee_id)?.is_none() {
            return Err(ApiError::NotFound(format!("员工 ({})", by_employee_id)));
        }

        let run = self
            .assignment
            .mark_completed(date, by_employee_id, actor, role)?;
        info!(date = %date, by = by_employee_id, "值班完成已确认");
        Ok(run)
    }

    /// 店长重算指定日期的值班分配
    pub fn recompute(&self, date: NaiveDate, actor: &str) -> ApiResult<DutyRunDetail> {
        validate_actor(actor)?;
        let run = self.assignment.recompute(date, actor)?;
        self.build_detail(run)
    }

    /// 预测指定日期的值班人 (只读)
    pub fn project(&self, date: NaiveDate) -> ApiResult<ProjectedAssignee> {
        Ok(self.projection.project(date)?)
    }

    /// 查询指定月份的完成次数统计
    ///
    /// # 参数
    /// - month_key: 统计月份 (YYYY-MM)
    pub fn monthly_completion_counts(&self, month_key: &str) -> ApiResult<Vec<CompletionCount>> {
        let month_start = parse_month_key(month_key)?;
        let next_month = if month_start.month() == 12 {
            NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
        }
        .ok_or_else(|| ApiError::InvalidInput(format!("月份格式无效: {}", month_key)))?;
        let month_end = next_month - Duration::days(1);

        let mut counts = Vec::new();
        for (employee_id, completed) in self.run_repo.completion_counts(month_start, month_end)? {
            let display_name = self
                .employee_repo
                .display_name(&employee_id)?
                .unwrap_or_else(|| employee_id.clone());
            counts.push(CompletionCount {
                employee_id,
                display_name,
                completed,
            });
        }
        Ok(counts)
    }

    /// 触发月度再平衡
    ///
    /// # 参数
    /// - month_key: 进入的月份 (YYYY-MM);统计窗口为其前一个自然月
    pub fn trigger_rebalance(&self, month_key: &str, actor: &str) -> ApiResult<RebalanceOutcome> {
        validate_actor(actor)?;
        Ok(self.rebalance.rebalance(month_key, actor)?)
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    /// 组装值班详情 DTO (补充显示姓名)
    fn build_detail(&self, run: DutyRun) -> ApiResult<DutyRunDetail> {
        let assignee_name = match run.assigned_employee_id.as_deref() {
            Some(id) => self.employee_repo.display_name(id)?,
            None => None,
        };

        let mut skips = Vec::new();
        for record in self.run_repo.list_skips(run.run_date)? {
            let display_name = self
                .employee_repo
                .display_name(&record.employee_id)?
                .unwrap_or_else(|| record.employee_id.clone());
            skips.push(SkipDetail {
                employee_id: record.employee_id,
                display_name,
                reason: record.reason,
            });
        }

        Ok(DutyRunDetail {
            run,
            assignee_name,
            skips,
        })
    }
}

/// 校验触发人非空
fn validate_actor(actor: &str) -> ApiResult<()> {
    if actor.trim().is_empty() {
        return Err(ApiError::InvalidInput("触发人不能为空".to_string()));
    }
    Ok(())
}
