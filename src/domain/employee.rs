// ==========================================
// 门店盘点值班轮转系统 - 员工领域模型
// ==========================================
// 说明: 员工花名册与请假记录属于外部系统,
//       本系统只读其投影,不做任何写入
// ==========================================

use crate::domain::types::LeaveKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Employee - 员工 (只读投影)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,      // 员工ID
    pub display_name: String,     // 显示姓名
    pub active: bool,             // 在职标记
    pub is_manager: bool,         // 店长标记 (不参与值班)
    pub excluded_from_duty: bool, // 永久免值班标记
}

// ==========================================
// ApprovedLeave - 已批准请假记录 (只读投影)
// ==========================================
// 用途: 跳过类别判定 (SHORT / LONG)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedLeave {
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: LeaveKind,
}

impl ApprovedLeave {
    /// 请假跨越的自然天数 (含首尾)
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// 请假是否覆盖指定日期
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
