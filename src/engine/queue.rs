// ==========================================
// 门店盘点值班轮转系统 - 补班等待队列引擎
// ==========================================
// 职责: 队列消费 (过期清理 + 自继任保护) 与入队判定
// 不变量:
// - expires_at 恒为最近一次入队/刷新 + 7 天
// - consume 绝不返回已过期条目
// - 只有 SHORT 类别的跳过才会入队
// ==========================================

use crate::domain::queue::{WaitingQueueEntry, QUEUE_TTL_DAYS};
use crate::domain::types::SkipReason;
use crate::domain::ActionType;
use crate::engine::audit::AuditRecorder;
use crate::engine::classifier::SkipClassifier;
use crate::repository::{
    AttendanceRepository, DutyRunRepository, RepositoryResult, WaitingQueueRepository,
};
use chrono::{Duration, Local, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// WaitingQueueEngine - 等待队列引擎
// ==========================================
pub struct WaitingQueueEngine {
    queue_repo: Arc<WaitingQueueRepository>,
    run_repo: Arc<DutyRunRepository>,
    attendance_repo: Arc<AttendanceRepository>,
    audit: Arc<AuditRecorder>,
}

impl WaitingQueueEngine {
    /// 创建新的等待队列引擎实例
    pub fn new(
        queue_repo: Arc<WaitingQueueRepository>,
        run_repo: Arc<DutyRunRepository>,
        attendance_repo: Arc<AttendanceRepository>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            queue_repo,
            run_repo,
            attendance_repo,
            audit,
        }
    }

    /// 尝试从队列中消费一位补班人
    ///
    /// # 流程
    /// 1. 删除全部已过期条目,逐条记录过期审计事件
    /// 2. 剩余条目按 queued_at 升序遍历
    /// 3. 返回第一位 在当日资格集合中 且 未完成昨日值班
    ///    (自继任保护,回看恰好一天) 的员工,并删除其条目
    ///
    /// # 返回
    /// - Ok(Some(employee_id)): 消费成功
    /// - Ok(None): 队列为空或无人满足条件
    pub fn consume(
        &self,
        date: NaiveDate,
        eligible: &HashSet<String>,
    ) -> RepositoryResult<Option<String>> {
        let now = Local::now().naive_local();

        // 过期清理
        for expired in self.queue_repo.delete_expired(now)? {
            info!(employee_id = %expired.employee_id, expires_at = %expired.expires_at, "补班条目过期清理");
            self.audit.record(
                ActionType::QueueExpire,
                "system",
                "waiting_queue",
                &expired.employee_id,
                serde_json::to_value(&expired).ok(),
                None,
                Some(format!("补班条目过期: expires_at={}", expired.expires_at)),
            );
        }

        // 自继任保护: 昨天完成值班的人今天不从队列补班
        let yesterday_completer = self.run_repo.completed_by_on(date - Duration::days(1))?;

        for entry in self.queue_repo.list_ordered()? {
            if !eligible.contains(&entry.employee_id) {
                continue;
            }
            if yesterday_completer.as_deref() == Some(entry.employee_id.as_str()) {
                debug!(employee_id = %entry.employee_id, "自继任保护: 跳过昨日完成人");
                continue;
            }

            self.queue_repo.delete_by_employee(&entry.employee_id)?;
            self.audit.record(
                ActionType::QueueConsume,
                "system",
                "waiting_queue",
                &entry.employee_id,
                serde_json::to_value(&entry).ok(),
                None,
                Some(format!("补班消费: 值班日={}", date)),
            );
            return Ok(Some(entry.employee_id));
        }

        Ok(None)
    }

    /// 尝试将一次跳过转化为补班信用
    ///
    /// 仅 SHORT 类别入队;已有条目时刷新而非重复入队
    ///
    /// # 返回
    /// - Ok(true): 已入队/已刷新
    /// - Ok(false): LONG 类别,不入队
    pub fn try_enqueue(
        &self,
        employee_id: &str,
        date: NaiveDate,
        reason: SkipReason,
    ) -> RepositoryResult<bool> {
        let leave = match reason {
            SkipReason::Leave => self.attendance_repo.approved_leave_covering(employee_id, date)?,
            _ => None,
        };

        let classification = SkipClassifier::classify(reason, leave.as_ref(), date);
        if !classification.is_short() {
            debug!(employee_id, reason = %reason, "LONG 跳过,不入队");
            return Ok(false);
        }

        let now = Local::now().naive_local();
        let entry = WaitingQueueEntry {
            employee_id: employee_id.to_string(),
            reason,
            queued_at: now,
            expires_at: now + Duration::days(QUEUE_TTL_DAYS),
            last_skipped_date: date,
        };
        self.queue_repo.upsert(&entry)?;

        self.audit.record(
            ActionType::QueueEnqueue,
            "system",
            "waiting_queue",
            employee_id,
            None,
            serde_json::to_value(&entry).ok(),
            Some(format!("补班入队: 被跳过日={}, 原因={}", date, reason)),
        );
        Ok(true)
    }
}
