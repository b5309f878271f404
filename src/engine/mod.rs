// ==========================================
// 门店盘点值班轮转系统 - 引擎层
// ==========================================
// 职责: 业务规则 —— 资格过滤、轮转行走、补班队列、
//       分配编排、月度再平衡、预测
// 红线: 纯计算核心 (classifier / walk) 无状态、无 I/O
// ==========================================

pub mod assignment;
pub mod audit;
pub mod classifier;
pub mod eligibility;
pub mod projection;
pub mod queue;
pub mod rebalance;
pub mod walk;

// 重导出核心引擎
pub use assignment::DutyAssignmentEngine;
pub use audit::AuditRecorder;
pub use classifier::{SkipClassification, SkipClassifier};
pub use eligibility::EligibilityEngine;
pub use projection::{ProjectedAssignee, ProjectionEngine};
pub use queue::WaitingQueueEngine;
pub use rebalance::{MonthlyRebalanceEngine, RebalanceOutcome};
pub use walk::{start_index, walk_rotation, WalkOutcome, WalkSkip};

use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

// ==========================================
// 引擎层错误类型
// ==========================================
// 注意: 未分配 (配置停用/无成员/无人可值) 是合法业务结果,
//       记录在 DutyRun 上,不出现在这里
#[derive(Error, Debug)]
pub enum AssignmentError {
    #[error("值班记录不存在: {0}")]
    RunNotFound(NaiveDate),

    #[error("值班已完成,不可再次变更: {0}")]
    AlreadyCompleted(NaiveDate),

    #[error("当日值班尚未分配,无法完成: {0}")]
    RunNotAssigned(NaiveDate),

    #[error("无权代他人完成值班: actor={0}")]
    Unauthorized(String),

    #[error("月份格式无效: {0} (应为 YYYY-MM)")]
    InvalidMonthKey(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type AssignmentResult<T> = Result<T, AssignmentError>;
