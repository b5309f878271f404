// ==========================================
// 门店盘点值班轮转系统 - 应用状态装配
// ==========================================
// 职责: 单一共享连接 -> 仓储 -> 引擎 -> API 的装配
// 说明: 全链路共享同一个 Arc<Mutex<Connection>>,
//       写入顺序由连接互斥 + 分配引擎 pass_lock 保证
// ==========================================

use crate::api::{DutyApi, ExclusionApi};
use crate::db;
use crate::engine::{
    AuditRecorder, DutyAssignmentEngine, EligibilityEngine, MonthlyRebalanceEngine,
    ProjectionEngine, WaitingQueueEngine,
};
use crate::repository::{
    ActionLogRepository, AttendanceRepository, DutyRunRepository, EmployeeRepository,
    ExclusionRepository, RotationConfigRepository, WaitingQueueRepository,
};
use anyhow::Context;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// AppState - 应用状态
// ==========================================
pub struct AppState {
    // 仓储
    pub employee_repo: Arc<EmployeeRepository>,
    pub attendance_repo: Arc<AttendanceRepository>,
    pub config_repo: Arc<RotationConfigRepository>,
    pub run_repo: Arc<DutyRunRepository>,
    pub queue_repo: Arc<WaitingQueueRepository>,
    pub exclusion_repo: Arc<ExclusionRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,

    // 引擎
    pub eligibility_engine: Arc<EligibilityEngine>,
    pub queue_engine: Arc<WaitingQueueEngine>,
    pub assignment_engine: Arc<DutyAssignmentEngine>,
    pub projection_engine: Arc<ProjectionEngine>,
    pub rebalance_engine: Arc<MonthlyRebalanceEngine>,

    // API
    pub duty_api: Arc<DutyApi>,
    pub exclusion_api: Arc<ExclusionApi>,
}

impl AppState {
    /// 打开数据库并装配完整应用状态
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let conn = db::open_sqlite_connection(db_path)
            .with_context(|| format!("打开数据库失败: {}", db_path))?;
        db::init_schema(&conn).context("初始化数据库 schema 失败")?;
        info!(db_path, "数据库已打开并完成初始化");

        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接装配应用状态 (测试用同一入口)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        // 仓储层
        let employee_repo = Arc::new(EmployeeRepository::from_connection(conn.clone()));
        let attendance_repo = Arc::new(AttendanceRepository::from_connection(conn.clone()));
        let config_repo = Arc::new(RotationConfigRepository::from_connection(conn.clone()));
        let run_repo = Arc::new(DutyRunRepository::from_connection(conn.clone()));
        let queue_repo = Arc::new(WaitingQueueRepository::from_connection(conn.clone()));
        let exclusion_repo = Arc::new(ExclusionRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::from_connection(conn));

        // 引擎层
        let audit = Arc::new(AuditRecorder::new(action_log_repo.clone()));
        let eligibility_engine = Arc::new(EligibilityEngine::new(
            employee_repo.clone(),
            attendance_repo.clone(),
            exclusion_repo.clone(),
        ));
        let queue_engine = Arc::new(WaitingQueueEngine::new(
            queue_repo.clone(),
            run_repo.clone(),
            attendance_repo.clone(),
            audit.clone(),
        ));
        let assignment_engine = Arc::new(DutyAssignmentEngine::new(
            config_repo.clone(),
            run_repo.clone(),
            exclusion_repo.clone(),
            eligibility_engine.clone(),
            queue_engine.clone(),
            audit.clone(),
        ));
        let projection_engine = Arc::new(ProjectionEngine::new(
            config_repo.clone(),
            exclusion_repo.clone(),
            eligibility_engine.clone(),
        ));
        let rebalance_engine = Arc::new(MonthlyRebalanceEngine::new(
            config_repo.clone(),
            run_repo.clone(),
            audit.clone(),
        ));

        // API 层
        let duty_api = Arc::new(DutyApi::new(
            assignment_engine.clone(),
            projection_engine.clone(),
            rebalance_engine.clone(),
            run_repo.clone(),
            employee_repo.clone(),
        ));
        let exclusion_api = Arc::new(ExclusionApi::new(
            exclusion_repo.clone(),
            employee_repo.clone(),
            audit,
        ));

        Self {
            employee_repo,
            attendance_repo,
            config_repo,
            run_repo,
            queue_repo,
            exclusion_repo,
            action_log_repo,
            eligibility_engine,
            queue_engine,
            assignment_engine,
            projection_engine,
            rebalance_engine,
            duty_api,
            exclusion_api,
        }
    }
}

/// 默认数据库路径: <数据目录>/duty-rotation/duty_rotation.db
pub fn get_default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    let dir = base.join("duty-rotation");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(error = %e, "创建数据目录失败,回退到当前目录");
        return "duty_rotation.db".to_string();
    }
    dir.join("duty_rotation.db").to_string_lossy().into_owned()
}
