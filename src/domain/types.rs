// ==========================================
// 门店盘点值班轮转系统 - 领域类型定义
// ==========================================
// 红线: 所有分支判定使用封闭枚举 + 穷尽匹配,
//       新增变体必须由编译器强制处理
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 出勤状态 (Availability)
// ==========================================
// 来源: 考勤/请假数据 (本系统只读)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Work,   // 正常出勤
    Off,    // 排休
    Leave,  // 请假
    Absent, // 旷工/缺勤
}

impl Availability {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Availability::Work => "WORK",
            Availability::Off => "OFF",
            Availability::Leave => "LEAVE",
            Availability::Absent => "ABSENT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "WORK" => Some(Availability::Work),
            "OFF" => Some(Availability::Off),
            "LEAVE" => Some(Availability::Leave),
            "ABSENT" => Some(Availability::Absent),
            _ => None,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 值班状态 (Duty Status)
// ==========================================
// 状态机: UNASSIGNED -> PENDING -> COMPLETED
// 红线: COMPLETED 为终态,不可回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DutyStatus {
    Unassigned, // 未分配 (附带原因)
    Pending,    // 已分配待完成
    Completed,  // 已完成 (终态)
}

impl DutyStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DutyStatus::Unassigned => "UNASSIGNED",
            DutyStatus::Pending => "PENDING",
            DutyStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "UNASSIGNED" => Some(DutyStatus::Unassigned),
            "PENDING" => Some(DutyStatus::Pending),
            "COMPLETED" => Some(DutyStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 跳过原因 (Skip Reason)
// ==========================================
// 轮转行走中每个未被分配的候选人都有一条类型化原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    Leave,        // 请假
    Off,          // 排休
    Inactive,     // 离职/停用
    Excluded,     // 永久豁免 (店长或长期免值班)
    ExcludedToday, // 当日豁免 (手工设置)
    Absent,       // 旷工/缺勤
}

impl SkipReason {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SkipReason::Leave => "LEAVE",
            SkipReason::Off => "OFF",
            SkipReason::Inactive => "INACTIVE",
            SkipReason::Excluded => "EXCLUDED",
            SkipReason::ExcludedToday => "EXCLUDED_TODAY",
            SkipReason::Absent => "ABSENT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "LEAVE" => Some(SkipReason::Leave),
            "OFF" => Some(SkipReason::Off),
            "INACTIVE" => Some(SkipReason::Inactive),
            "EXCLUDED" => Some(SkipReason::Excluded),
            "EXCLUDED_TODAY" => Some(SkipReason::ExcludedToday),
            "ABSENT" => Some(SkipReason::Absent),
            _ => None,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 跳过类别 (Skip Category)
// ==========================================
// SHORT: 短期缺席,可在一周内补班 (进入等待队列)
// LONG: 长期缺席,无单一"下次轮到"可补 (仅作解释)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipCategory {
    Short,
    Long,
}

impl fmt::Display for SkipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipCategory::Short => write!(f, "SHORT"),
            SkipCategory::Long => write!(f, "LONG"),
        }
    }
}

// ==========================================
// 分配来源 (Assignment Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentSource {
    Rotation, // 轮转行走
    Queue,    // 等待队列补班
}

impl AssignmentSource {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssignmentSource::Rotation => "ROTATION",
            AssignmentSource::Queue => "QUEUE",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "ROTATION" => Some(AssignmentSource::Rotation),
            "QUEUE" => Some(AssignmentSource::Queue),
            _ => None,
        }
    }
}

impl fmt::Display for AssignmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 未分配原因 (Unassigned Reason)
// ==========================================
// 注意: 这些是合法的业务结果,不是错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnassignedReason {
    Disabled,   // 轮转配置停用
    NoMembers,  // 轮转成员为空
    NoEligible, // 当日轮转中无可值班人员
}

impl UnassignedReason {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UnassignedReason::Disabled => "DISABLED",
            UnassignedReason::NoMembers => "NO_MEMBERS",
            UnassignedReason::NoEligible => "NO_ELIGIBLE",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "DISABLED" => Some(UnassignedReason::Disabled),
            "NO_MEMBERS" => Some(UnassignedReason::NoMembers),
            "NO_ELIGIBLE" => Some(UnassignedReason::NoEligible),
            _ => None,
        }
    }

    /// 业务说明文案
    pub fn description(&self) -> &'static str {
        match self {
            UnassignedReason::Disabled => "轮转配置已停用",
            UnassignedReason::NoMembers => "轮转成员为空",
            UnassignedReason::NoEligible => "当日轮转中无可值班人员",
        }
    }
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 操作人角色 (Actor Role)
// ==========================================
// 用途: 代他人完成值班需要提权 (店长/管理员)
// 说明: 角色判定由上层调用方完成,本系统只消费结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Staff,
    Manager,
    Admin,
}

impl ActorRole {
    /// 是否为提权角色
    pub fn is_elevated(&self) -> bool {
        match self {
            ActorRole::Staff => false,
            ActorRole::Manager | ActorRole::Admin => true,
        }
    }
}

// ==========================================
// 请假类型 (Leave Kind)
// ==========================================
// 长假类型直接判定为 LONG 跳过,不进入等待队列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveKind {
    Casual,    // 事假
    Sick,      // 病假
    Annual,    // 年假
    Marriage,  // 婚假
    Maternity, // 产假
    Other,     // 其他
}

impl LeaveKind {
    /// 是否为长假类型 (与跨天判定并列的 LONG 条件)
    pub fn is_long_form(&self) -> bool {
        match self {
            LeaveKind::Annual | LeaveKind::Marriage | LeaveKind::Maternity => true,
            LeaveKind::Casual | LeaveKind::Sick | LeaveKind::Other => false,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            LeaveKind::Casual => "CASUAL",
            LeaveKind::Sick => "SICK",
            LeaveKind::Annual => "ANNUAL",
            LeaveKind::Marriage => "MARRIAGE",
            LeaveKind::Maternity => "MATERNITY",
            LeaveKind::Other => "OTHER",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CASUAL" => Some(LeaveKind::Casual),
            "SICK" => Some(LeaveKind::Sick),
            "ANNUAL" => Some(LeaveKind::Annual),
            "MARRIAGE" => Some(LeaveKind::Marriage),
            "MATERNITY" => Some(LeaveKind::Maternity),
            "OTHER" => Some(LeaveKind::Other),
            _ => None,
        }
    }
}

impl fmt::Display for LeaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
