// ==========================================
// 门店盘点值班轮转系统 - API 层错误类型
// ==========================================
// 说明: 对外统一错误出口,下层错误在此收敛分类
// ==========================================

use crate::engine::AssignmentError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("输入无效: {0}")]
    InvalidInput(String),

    #[error("记录不存在: {0}")]
    NotFound(String),

    #[error("值班已完成,不可变更: {0}")]
    AlreadyCompleted(String),

    #[error("无权执行该操作: {0}")]
    Unauthorized(String),

    #[error("业务规则冲突: {0}")]
    BusinessRuleViolation(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} ({})", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::BusinessRuleViolation(format!("{} -> {}", from, to))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AssignmentError> for ApiError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::RunNotFound(date) => ApiError::NotFound(date.to_string()),
            AssignmentError::AlreadyCompleted(date) => ApiError::AlreadyCompleted(date.to_string()),
            AssignmentError::RunNotAssigned(date) => {
                ApiError::BusinessRuleViolation(format!("当日值班尚未分配: {}", date))
            }
            AssignmentError::Unauthorized(actor) => ApiError::Unauthorized(actor),
            AssignmentError::InvalidMonthKey(key) => {
                ApiError::InvalidInput(format!("月份格式无效: {} (应为 YYYY-MM)", key))
            }
            AssignmentError::Repository(inner) => inner.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
