// ==========================================
// 门店盘点值班轮转系统 - 领域层
// ==========================================
// 职责: 定义实体与封闭枚举,不含任何持久化逻辑
// ==========================================

pub mod action_log;
pub mod duty_run;
pub mod employee;
pub mod exclusion;
pub mod queue;
pub mod rotation;
pub mod types;

// 重导出领域实体
pub use action_log::{ActionLog, ActionType};
pub use duty_run::{DutyRun, SkipRecord};
pub use employee::{ApprovedLeave, Employee};
pub use exclusion::DutyExclusion;
pub use queue::{WaitingQueueEntry, QUEUE_TTL_DAYS};
pub use rotation::{RotationConfiguration, RotationMember, DEFAULT_CONFIG_ID};
