// ==========================================
// 门店盘点值班轮转系统 - 每日值班记录领域模型
// ==========================================
// 不变量:
// - run_date 全局唯一 (幂等 get-or-create)
// - assigned_employee_id 为空 当且仅当 status = UNASSIGNED
// - COMPLETED 为终态
// ==========================================

use crate::domain::types::{AssignmentSource, DutyStatus, SkipReason, UnassignedReason};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DutyRun - 每日值班记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyRun {
    pub run_date: NaiveDate,
    pub status: DutyStatus,
    pub assigned_employee_id: Option<String>,
    pub source: Option<AssignmentSource>,          // 分配来源 (UNASSIGNED 时为空)
    pub unassigned_reason: Option<UnassignedReason>, // 仅 UNASSIGNED 时非空
    pub completed_by: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DutyRun {
    pub fn is_completed(&self) -> bool {
        self.status == DutyStatus::Completed
    }

    pub fn has_assignee(&self) -> bool {
        self.assigned_employee_id.is_some()
    }
}

// ==========================================
// SkipRecord - 跳过明细
// ==========================================
// 归属一条 DutyRun,重算时整体重建
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipRecord {
    pub run_date: NaiveDate,
    pub seq: i32, // 行走顺序号 (0 起)
    pub employee_id: String,
    pub reason: SkipReason,
}
