// ==========================================
// 门店盘点值班轮转系统 - 等待队列领域模型
// ==========================================
// 用途: 把一次短期缺席转化为一周内可兑现的补班信用,
//       而不是默默丢掉这个人的轮次
// ==========================================

use crate::domain::types::SkipReason;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 队列条目有效期 (天)
pub const QUEUE_TTL_DAYS: i64 = 7;

// ==========================================
// WaitingQueueEntry - 等待队列条目
// ==========================================
// 约束: 每位员工至多一条活跃条目 (upsert 刷新而非重复入队)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingQueueEntry {
    pub employee_id: String,
    pub reason: SkipReason,            // 最近一次入队的跳过原因
    pub queued_at: NaiveDateTime,      // 首次入队时间 (FIFO 排序键)
    pub expires_at: NaiveDateTime,     // 最近一次入队/刷新 + 7 天
    pub last_skipped_date: NaiveDate,  // 最近一次被跳过的值班日
}

impl WaitingQueueEntry {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}
