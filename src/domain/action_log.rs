// ==========================================
// 门店盘点值班轮转系统 - 审计日志领域模型
// ==========================================
// 红线: 所有状态转换必须记录
// 用途: 审计追踪,每一次跳过/入队/消费/过期都可解释
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 审计日志 (只写)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,              // 日志ID (uuid v4)
    pub action_type: ActionType,        // 操作类型
    pub action_ts: NaiveDateTime,       // 操作时间戳
    pub actor: String,                  // 操作人 (系统操作为 "system")
    pub entity_type: Option<String>,    // 实体类型 (duty_run / waiting_queue / ...)
    pub entity_id: Option<String>,      // 实体标识 (日期 / 员工ID / 月份)
    pub before_json: Option<JsonValue>, // 转换前快照
    pub after_json: Option<JsonValue>,  // 转换后快照
    pub detail: Option<String>,         // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    CreateRun,       // 创建当日值班记录
    Recompute,       // 店长重算
    Complete,        // 完成值班
    QueueEnqueue,    // 补班入队
    QueueConsume,    // 补班消费
    QueueExpire,     // 队列条目过期清理
    ExclusionAdd,    // 新增按日豁免
    ExclusionRemove, // 移除按日豁免
    Rebalance,       // 月度再平衡
    SeedRotation,    // 轮转成员首次播种
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateRun => "CREATE_RUN",
            ActionType::Recompute => "RECOMPUTE",
            ActionType::Complete => "COMPLETE",
            ActionType::QueueEnqueue => "QUEUE_ENQUEUE",
            ActionType::QueueConsume => "QUEUE_CONSUME",
            ActionType::QueueExpire => "QUEUE_EXPIRE",
            ActionType::ExclusionAdd => "EXCLUSION_ADD",
            ActionType::ExclusionRemove => "EXCLUSION_REMOVE",
            ActionType::Rebalance => "REBALANCE",
            ActionType::SeedRotation => "SEED_ROTATION",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CREATE_RUN" => Some(ActionType::CreateRun),
            "RECOMPUTE" => Some(ActionType::Recompute),
            "COMPLETE" => Some(ActionType::Complete),
            "QUEUE_ENQUEUE" => Some(ActionType::QueueEnqueue),
            "QUEUE_CONSUME" => Some(ActionType::QueueConsume),
            "QUEUE_EXPIRE" => Some(ActionType::QueueExpire),
            "EXCLUSION_ADD" => Some(ActionType::ExclusionAdd),
            "EXCLUSION_REMOVE" => Some(ActionType::ExclusionRemove),
            "REBALANCE" => Some(ActionType::Rebalance),
            "SEED_ROTATION" => Some(ActionType::SeedRotation),
            _ => None,
        }
    }
}
