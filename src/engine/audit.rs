// ==========================================
// 门店盘点值班轮转系统 - 审计记录器
// ==========================================
// 红线: 审计写入失败不得阻断主流程成功,
//       但必须以降级告警的方式暴露出来
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::action_log_repo::ActionLogRepository;
use chrono::Local;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

// ==========================================
// AuditRecorder - 审计记录器
// ==========================================
pub struct AuditRecorder {
    repo: Arc<ActionLogRepository>,
}

impl AuditRecorder {
    /// 创建新的审计记录器
    pub fn new(repo: Arc<ActionLogRepository>) -> Self {
        Self { repo }
    }

    /// 记录一次状态转换
    ///
    /// # 参数
    /// - action_type: 操作类型
    /// - actor: 操作人 (系统操作为 "system")
    /// - entity_type / entity_id: 受影响实体
    /// - before / after: 转换前后快照 (JSON)
    /// - detail: 详细描述
    pub fn record(
        &self,
        action_type: ActionType,
        actor: &str,
        entity_type: &str,
        entity_id: &str,
        before: Option<JsonValue>,
        after: Option<JsonValue>,
        detail: Option<String>,
    ) {
        let log = ActionLog {
            action_id: Uuid::new_v4().to_string(),
            action_type,
            action_ts: Local::now().naive_local(),
            actor: actor.to_string(),
            entity_type: Some(entity_type.to_string()),
            entity_id: Some(entity_id.to_string()),
            before_json: before,
            after_json: after,
            detail,
        };

        if let Err(e) = self.repo.insert(&log) {
            // 降级模式: 主流程继续,审计缺口必须可见
            warn!(
                action_type = action_type.as_str(),
                entity_id = entity_id,
                error = %e,
                "审计日志写入失败,本次转换未被记录"
            );
        }
    }
}
