// ==========================================
// 门店盘点值班轮转系统 - 值班分配引擎
// ==========================================
// 职责: 每日值班的 get-or-create / 重算 / 完成
// 状态机: UNASSIGNED -> PENDING -> COMPLETED (终态)
// 并发: 进程内以 pass_lock 串行化整个分配流程;
//       跨进程由 duty_run.run_date 唯一约束兜底,
//       竞争失败方读回胜者结果
// ==========================================
// 流程 (get-or-create):
// 1. 配置停用 → UNASSIGNED(DISABLED)
// 2. 成员为空 (播种后仍为空) → UNASSIGNED(NO_MEMBERS)
// 3. 当日记录已有被分配人 → 原样返回 (幂等短路)
// 4. 计算当日资格集合与豁免集合
// 5. 队列消费命中 → 分配 (source=QUEUE),不行走、不产生跳过
// 6. 轮转行走一圈,逐个跳过并入队 (EXCLUDED_TODAY 除外)
// 7. 持久化记录 + 跳过明细,写审计事件
// ==========================================

use crate::domain::duty_run::{DutyRun, SkipRecord};
use crate::domain::rotation::RotationMember;
use crate::domain::types::{
    ActorRole, AssignmentSource, DutyStatus, SkipReason, UnassignedReason,
};
use crate::domain::ActionType;
use crate::engine::audit::AuditRecorder;
use crate::engine::eligibility::EligibilityEngine;
use crate::engine::queue::WaitingQueueEngine;
use crate::engine::walk::{walk_rotation, WalkSkip};
use crate::engine::{AssignmentError, AssignmentResult};
use crate::repository::{
    DutyRunRepository, ExclusionRepository, RepositoryError, RotationConfigRepository,
};
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// DutyAssignmentEngine - 值班分配引擎
// ==========================================
pub struct DutyAssignmentEngine {
    config_repo: Arc<RotationConfigRepository>,
    run_repo: Arc<DutyRunRepository>,
    exclusion_repo: Arc<ExclusionRepository>,
    eligibility: Arc<EligibilityEngine>,
    queue: Arc<WaitingQueueEngine>,
    audit: Arc<AuditRecorder>,
    // 进程内分配流程串行化 (同日并发调用只允许一次分配落库)
    pass_lock: Mutex<()>,
}

impl DutyAssignmentEngine {
    /// 创建新的分配引擎实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config_repo: Arc<RotationConfigRepository>,
        run_repo: Arc<DutyRunRepository>,
        exclusion_repo: Arc<ExclusionRepository>,
        eligibility: Arc<EligibilityEngine>,
        queue: Arc<WaitingQueueEngine>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            config_repo,
            run_repo,
            exclusion_repo,
            eligibility,
            queue,
            audit,
            pass_lock: Mutex::new(()),
        }
    }

    // ==========================================
    // get-or-create
    // ==========================================

    /// 获取或创建指定日期的值班记录 (幂等)
    #[instrument(skip(self), fields(date = %date))]
    pub fn get_or_create_run(&self, date: NaiveDate, actor: &str) -> AssignmentResult<DutyRun> {
        let _guard = self
            .pass_lock
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let config = self.config_repo.get_or_create()?;

        // 幂等短路: 已有被分配人的记录原样返回,不重跑、不再入队
        if let Some(run) = self.run_repo.find_by_date(date)? {
            if run.has_assignee() {
                return Ok(run);
            }
        }

        if !config.enabled {
            return self.persist_outcome(
                date,
                None,
                None,
                Some(UnassignedReason::Disabled),
                Vec::new(),
                actor,
                ActionType::CreateRun,
            );
        }

        // 首次播种: 成员为空时从当日可值班集合按员工ID稳定播种
        if self.config_repo.count_members()? == 0 {
            self.seed_members(date, actor)?;
        }

        let members = self.config_repo.list_active_members()?;
        if members.is_empty() {
            return self.persist_outcome(
                date,
                None,
                None,
                Some(UnassignedReason::NoMembers),
                Vec::new(),
                actor,
                ActionType::CreateRun,
            );
        }

        let eligible = self.eligibility.eligible_employees(date)?;

        // 队列优先: 命中时不行走、不产生跳过明细
        if let Some(employee_id) = self.queue.consume(date, &eligible)? {
            info!(date = %date, employee_id = %employee_id, "等待队列补班命中");
            return self.persist_outcome(
                date,
                Some(employee_id),
                Some(AssignmentSource::Queue),
                None,
                Vec::new(),
                actor,
                ActionType::CreateRun,
            );
        }

        let (assignee, skips) = self.execute_walk(date, &members, &eligible)?;
        match assignee {
            Some(employee_id) => self.persist_outcome(
                date,
                Some(employee_id),
                Some(AssignmentSource::Rotation),
                None,
                skips,
                actor,
                ActionType::CreateRun,
            ),
            None => self.persist_outcome(
                date,
                None,
                None,
                Some(UnassignedReason::NoEligible),
                skips,
                actor,
                ActionType::CreateRun,
            ),
        }
    }

    // ==========================================
    // 完成值班
    // ==========================================

    /// 标记值班完成 (终态,不可回退)
    ///
    /// 代他人完成 (by_employee_id ≠ 被分配人) 需要提权角色
    #[instrument(skip(self), fields(date = %date, by = %by_employee_id))]
    pub fn mark_completed(
        &self,
        date: NaiveDate,
        by_employee_id: &str,
        actor: &str,
        role: ActorRole,
    ) -> AssignmentResult<DutyRun> {
        let _guard = self
            .pass_lock
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let run = self
            .run_repo
            .find_by_date(date)?
            .ok_or(AssignmentError::RunNotFound(date))?;

        if run.is_completed() {
            return Err(AssignmentError::AlreadyCompleted(date));
        }

        match run.assigned_employee_id.as_deref() {
            None => return Err(AssignmentError::RunNotAssigned(date)),
            Some(assignee) if assignee != by_employee_id => {
                if !role.is_elevated() {
                    return Err(AssignmentError::Unauthorized(actor.to_string()));
                }
            }
            Some(_) => {}
        }

        let now = Local::now().naive_local();
        self.run_repo.mark_completed(date, by_employee_id, now)?;

        let completed = self
            .run_repo
            .find_by_date(date)?
            .ok_or(AssignmentError::RunNotFound(date))?;

        self.audit.record(
            ActionType::Complete,
            actor,
            "duty_run",
            &date.to_string(),
            serde_json::to_value(&run).ok(),
            serde_json::to_value(&completed).ok(),
            Some(format!("完成值班: completed_by={}", by_employee_id)),
        );
        Ok(completed)
    }

    // ==========================================
    // 重算
    // ==========================================

    /// 店长重算: 重新评估资格并重走轮转 (不做队列短路)
    ///
    /// 已完成的记录不可重算;跳过明细整体重建
    #[instrument(skip(self), fields(date = %date, actor = %actor))]
    pub fn recompute(&self, date: NaiveDate, actor: &str) -> AssignmentResult<DutyRun> {
        let _guard = self
            .pass_lock
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let run = self
            .run_repo
            .find_by_date(date)?
            .ok_or(AssignmentError::RunNotFound(date))?;

        if run.is_completed() {
            return Err(AssignmentError::AlreadyCompleted(date));
        }

        self.config_repo.get_or_create()?;
        let members = self.config_repo.list_active_members()?;
        if members.is_empty() {
            return self.persist_outcome(
                date,
                None,
                None,
                Some(UnassignedReason::NoMembers),
                Vec::new(),
                actor,
                ActionType::Recompute,
            );
        }

        let eligible = self.eligibility.eligible_employees(date)?;
        let (assignee, skips) = self.execute_walk(date, &members, &eligible)?;
        match assignee {
            Some(employee_id) => self.persist_outcome(
                date,
                Some(employee_id),
                Some(AssignmentSource::Rotation),
                None,
                skips,
                actor,
                ActionType::Recompute,
            ),
            None => self.persist_outcome(
                date,
                None,
                None,
                Some(UnassignedReason::NoEligible),
                skips,
                actor,
                ActionType::Recompute,
            ),
        }
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    /// 执行轮转行走并把符合条件的跳过转化为补班信用
    fn execute_walk(
        &self,
        date: NaiveDate,
        members: &[RotationMember],
        eligible: &HashSet<String>,
    ) -> AssignmentResult<(Option<String>, Vec<SkipRecord>)> {
        let excluded_today = self.exclusion_repo.excluded_set(date)?;

        let outcome = walk_rotation(members, date, eligible, |employee_id| {
            self.eligibility
                .skip_reason_for(employee_id, date, &excluded_today)
        })?;

        // 当日豁免不入队: 豁免不是缺席,无轮次可补
        for skip in &outcome.skips {
            if skip.reason != SkipReason::ExcludedToday {
                self.queue.try_enqueue(&skip.employee_id, date, skip.reason)?;
            }
        }

        let skips = outcome
            .skips
            .iter()
            .enumerate()
            .map(|(i, s): (usize, &WalkSkip)| SkipRecord {
                run_date: date,
                seq: i as i32,
                employee_id: s.employee_id.clone(),
                reason: s.reason,
            })
            .collect();

        Ok((outcome.assignee, skips))
    }

    /// 持久化分配结果 + 跳过明细,并写审计事件
    ///
    /// 并发插入冲突时读回胜者结果返回
    #[allow(clippy::too_many_arguments)]
    fn persist_outcome(
        &self,
        date: NaiveDate,
        assignee: Option<String>,
        source: Option<AssignmentSource>,
        reason: Option<UnassignedReason>,
        skips: Vec<SkipRecord>,
        actor: &str,
        action_type: ActionType,
    ) -> AssignmentResult<DutyRun> {
        let now = Local::now().naive_local();
        let status = if assignee.is_some() {
            DutyStatus::Pending
        } else {
            DutyStatus::Unassigned
        };

        let before = self.run_repo.find_by_date(date)?;
        let mut run = DutyRun {
            run_date: date,
            status,
            assigned_employee_id: assignee,
            source,
            unassigned_reason: reason,
            completed_by: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        match &before {
            Some(existing) => {
                run.created_at = existing.created_at;
                self.run_repo.update_assignment(&run)?;
            }
            None => {
                if !self.run_repo.try_insert(&run)? {
                    // 并发竞争失败: 不二次分配,读回胜者
                    let winner = self
                        .run_repo
                        .find_by_date(date)?
                        .ok_or(AssignmentError::RunNotFound(date))?;
                    warn!(date = %date, "并发创建冲突,返回已持久化的分配结果");
                    return Ok(winner);
                }
            }
        }

        self.run_repo.replace_skips(date, &skips)?;

        let detail = match (&run.assigned_employee_id, &run.unassigned_reason) {
            (Some(e), _) => format!(
                "分配={} 来源={} 跳过{}人",
                e,
                run.source.map(|s| s.to_db_str()).unwrap_or("-"),
                skips.len()
            ),
            (None, Some(r)) => format!("未分配: {} (跳过{}人)", r.description(), skips.len()),
            (None, None) => "未分配".to_string(),
        };

        self.audit.record(
            action_type,
            actor,
            "duty_run",
            &date.to_string(),
            before.as_ref().and_then(|b| serde_json::to_value(b).ok()),
            serde_json::to_value(&run).ok(),
            Some(detail),
        );

        info!(
            date = %date,
            status = %run.status,
            assignee = run.assigned_employee_id.as_deref().unwrap_or("-"),
            "值班分配已持久化"
        );
        Ok(run)
    }

    /// 首次播种: 从当日可值班集合按员工ID稳定排序生成成员
    fn seed_members(&self, date: NaiveDate, actor: &str) -> AssignmentResult<()> {
        let mut ids: Vec<String> = self
            .eligibility
            .eligible_employees(date)?
            .into_iter()
            .collect();
        ids.sort();

        if ids.is_empty() {
            return Ok(());
        }

        let members: Vec<RotationMember> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| RotationMember {
                employee_id: id.clone(),
                base_order_index: i as i32,
                active: true,
            })
            .collect();
        self.config_repo.insert_members(&members)?;

        self.audit.record(
            ActionType::SeedRotation,
            actor,
            "rotation_config",
            "default",
            None,
            serde_json::to_value(&ids).ok(),
            Some(format!("轮转成员首次播种: {}人", ids.len())),
        );
        info!(date = %date, count = ids.len(), "轮转成员首次播种完成");
        Ok(())
    }

    /// 查询值班记录与跳过明细 (只读)
    pub fn run_with_skips(
        &self,
        date: NaiveDate,
    ) -> AssignmentResult<Option<(DutyRun, Vec<SkipRecord>)>> {
        match self.run_repo.find_by_date(date)? {
            Some(run) => {
                let skips = self.run_repo.list_skips(date)?;
                Ok(Some((run, skips)))
            }
            None => Ok(None),
        }
    }
}
