// ==========================================
// 门店盘点值班轮转系统 - 轮转配置领域模型
// ==========================================
// 红线: 成员顺序只在两处被改写 —— 首次播种与月度再平衡
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 单例配置行的固定主键
pub const DEFAULT_CONFIG_ID: &str = "default";

// ==========================================
// RotationConfiguration - 轮转配置 (单例)
// ==========================================
// 说明: 建模为普通持久化状态 + get_or_create,
//       而不是语言级单例,便于测试构造隔离实例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfiguration {
    pub config_id: String,
    pub enabled: bool,                   // 总开关
    pub monthly_rebalance_enabled: bool, // 月度再平衡开关
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// RotationMember - 轮转成员
// ==========================================
// base_order_index 在配置内唯一,定义轮转行走顺序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationMember {
    pub employee_id: String,
    pub base_order_index: i32,
    pub active: bool,
}
