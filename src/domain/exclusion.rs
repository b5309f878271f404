// ==========================================
// 门店盘点值班轮转系统 - 按日豁免领域模型
// ==========================================
// 说明: 与员工的永久免值班标记相互独立;
//       增删豁免本身不触发重算,需店长另行调用重算
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DutyExclusion - 按日豁免
// ==========================================
// 唯一键: (exclusion_date, employee_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyExclusion {
    pub exclusion_date: NaiveDate,
    pub employee_id: String,
    pub reason: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}
