// ==========================================
// 门店盘点值班轮转系统 - 月度再平衡引擎
// ==========================================
// 职责: 按上月完成次数重排轮转顺序 (少者在前)
// 红线: 只改写 base_order_index,绝不改动已持久化的
//       历史值班记录 —— 只影响未来行走的起点相对位置
// ==========================================

use crate::domain::ActionType;
use crate::engine::audit::AuditRecorder;
use crate::engine::{AssignmentError, AssignmentResult};
use crate::repository::{DutyRunRepository, RotationConfigRepository};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// RebalanceOutcome - 再平衡结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceOutcome {
    pub month_key: String,
    pub applied: bool,         // false = 再平衡开关关闭,未执行
    pub order: Vec<String>,    // 执行后的活跃成员顺序 (employee_id)
}

// ==========================================
// MonthlyRebalanceEngine - 月度再平衡引擎
// ==========================================
pub struct MonthlyRebalanceEngine {
    config_repo: Arc<RotationConfigRepository>,
    run_repo: Arc<DutyRunRepository>,
    audit: Arc<AuditRecorder>,
}

impl MonthlyRebalanceEngine {
    /// 创建新的再平衡引擎实例
    pub fn new(
        config_repo: Arc<RotationConfigRepository>,
        run_repo: Arc<DutyRunRepository>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            config_repo,
            run_repo,
            audit,
        }
    }

    /// 执行月度再平衡
    ///
    /// # 参数
    /// - month_key: 进入的月份 (YYYY-MM);统计窗口为其前一个自然月
    /// - actor: 触发人 (定时任务为 "system")
    ///
    /// # 规则
    /// 活跃成员按上月完成次数升序 (少者在前),同次数按员工ID升序;
    /// 非活跃成员保持相对顺序排在活跃成员之后
    #[instrument(skip(self), fields(month = %month_key))]
    pub fn rebalance(&self, month_key: &str, actor: &str) -> AssignmentResult<RebalanceOutcome> {
        let month_start = parse_month_key(month_key)?;

        let config = self.config_repo.get_or_create()?;
        if !config.monthly_rebalance_enabled {
            info!(month = month_key, "月度再平衡开关关闭,跳过执行");
            return Ok(RebalanceOutcome {
                month_key: month_key.to_string(),
                applied: false,
                order: Vec::new(),
            });
        }

        // 统计窗口: month_key 的前一个自然月
        let prev_end = month_start - Duration::days(1);
        let prev_start = prev_end.with_day(1).unwrap_or(prev_end);
        let counts: HashMap<String, i64> = self
            .run_repo
            .completion_counts(prev_start, prev_end)?
            .into_iter()
            .collect();

        let members = self.config_repo.list_members()?;
        let before_order: Vec<String> =
            members.iter().map(|m| m.employee_id.clone()).collect();

        let mut active: Vec<&_> = members.iter().filter(|m| m.active).collect();
        let inactive: Vec<&_> = members.iter().filter(|m| !m.active).collect();

        active.sort_by(|a, b| {
            let ca = counts.get(&a.employee_id).copied().unwrap_or(0);
            let cb = counts.get(&b.employee_id).copied().unwrap_or(0);
            ca.cmp(&cb).then(a.employee_id.cmp(&b.employee_id))
        });

        let new_order: Vec<(String, i32)> = active
            .iter()
            .chain(inactive.iter())
            .enumerate()
            .map(|(i, m)| (m.employee_id.clone(), i as i32))
            .collect();
        self.config_repo.rewrite_order(&new_order)?;

        let order: Vec<String> = active.iter().map(|m| m.employee_id.clone()).collect();
        self.audit.record(
            ActionType::Rebalance,
            actor,
            "rotation_config",
            month_key,
            serde_json::to_value(&before_order).ok(),
            serde_json::to_value(&order).ok(),
            Some(format!(
                "月度再平衡: 统计窗口 {} ~ {}",
                prev_start, prev_end
            )),
        );
        info!(month = month_key, members = order.len(), "月度再平衡完成");

        Ok(RebalanceOutcome {
            month_key: month_key.to_string(),
            applied: true,
            order,
        })
    }
}

/// 解析 YYYY-MM 月份键为当月 1 日
pub fn parse_month_key(month_key: &str) -> AssignmentResult<NaiveDate> {
    if month_key.len() != 7 {
        return Err(AssignmentError::InvalidMonthKey(month_key.to_string()));
    }
    NaiveDate::parse_from_str(&format!("{}-01", month_key), "%Y-%m-%d")
        .map_err(|_| AssignmentError::InvalidMonthKey(month_key.to_string()))
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_key_valid() {
        let d = parse_month_key("2025-03").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_month_key_invalid() {
        for key in ["2025-3", "2025/03", "202503", "abcd-ef", "2025-13"] {
            assert!(parse_month_key(key).is_err(), "key={}", key);
        }
    }
}
