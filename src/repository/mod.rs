// ==========================================
// 门店盘点值班轮转系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod attendance_repo;
pub mod duty_run_repo;
pub mod employee_repo;
pub mod error;
pub mod exclusion_repo;
pub mod queue_repo;
pub mod rotation_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use attendance_repo::AttendanceRepository;
pub use duty_run_repo::DutyRunRepository;
pub use employee_repo::EmployeeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use exclusion_repo::ExclusionRepository;
pub use queue_repo::WaitingQueueRepository;
pub use rotation_repo::RotationConfigRepository;

/// 日期/时间的数据库存储格式
pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
