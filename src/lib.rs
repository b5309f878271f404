// ==========================================
// 门店盘点值班轮转系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 每日库存盘点值班分配引擎 (人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ActorRole, AssignmentSource, Availability, DutyStatus, LeaveKind, SkipCategory, SkipReason,
    UnassignedReason,
};

// 领域实体
pub use domain::{
    ActionLog, ActionType, ApprovedLeave, DutyExclusion, DutyRun, Employee, RotationConfiguration,
    RotationMember, SkipRecord, WaitingQueueEntry,
};

// 引擎
pub use engine::{
    AssignmentError, AssignmentResult, AuditRecorder, DutyAssignmentEngine, EligibilityEngine,
    MonthlyRebalanceEngine, ProjectionEngine, SkipClassifier, WaitingQueueEngine,
};

// API
pub use api::{ApiError, ApiResult, DutyApi, ExclusionApi};

// 应用状态
pub use app::AppState;

/// 系统版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
