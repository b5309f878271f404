// ==========================================
// 门店盘点值班轮转系统 - 轮转行走 纯函数库
// ==========================================
// 职责: 确定性轮转行走 (一圈 N 步, 不重复)
// 红线: 无状态、无副作用、无 I/O 操作
// 说明: 行走起点由 day_of_year mod N 显式推导,
//       不保存可变"当前位置",保证 get_or_create
//       与 project 使用同一套可重放算法
// ==========================================

use crate::domain::rotation::RotationMember;
use crate::domain::types::SkipReason;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

// ==========================================
// WalkSkip - 行走中被跳过的候选人
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSkip {
    pub employee_id: String,
    pub reason: SkipReason,
}

// ==========================================
// WalkOutcome - 行走结果
// ==========================================
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub assignee: Option<String>,
    pub skips: Vec<WalkSkip>,
}

/// 计算行走起始下标: day_of_year mod N
///
/// # 参数
/// - date: 值班日
/// - member_count: 成员数 (必须 > 0)
pub fn start_index(date: NaiveDate, member_count: usize) -> usize {
    (date.ordinal() as usize) % member_count
}

/// 执行一圈轮转行走
///
/// 从起始下标出发恰好走 N 步;遇到第一位在资格集合中的
/// 候选人即分配,其余候选人逐个产生类型化跳过原因
///
/// # 参数
/// - members: 活跃成员,按 base_order_index 升序
/// - date: 值班日
/// - eligible: 当日资格集合
/// - reason_for: 解析候选人跳过原因的回调
pub fn walk_rotation<E, F>(
    members: &[RotationMember],
    date: NaiveDate,
    eligible: &HashSet<String>,
    mut reason_for: F,
) -> Result<WalkOutcome, E>
where
    F: FnMut(&str) -> Result<SkipReason, E>,
{
    if members.is_empty() {
        return Ok(WalkOutcome {
            assignee: None,
            skips: Vec::new(),
        });
    }

    let n = members.len();
    let start = start_index(date, n);
    let mut skips = Vec::new();

    for step in 0..n {
        let candidate = &members[(start + step) % n];
        if eligible.contains(&candidate.employee_id) {
            return Ok(WalkOutcome {
                assignee: Some(candidate.employee_id.clone()),
                skips,
            });
        }
        let reason = reason_for(&candidate.employee_id)?;
        skips.push(WalkSkip {
            employee_id: candidate.employee_id.clone(),
            reason,
        });
    }

    // 走完一圈无人可值
    Ok(WalkOutcome {
        assignee: None,
        skips,
    })
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn members(ids: &[&str]) -> Vec<RotationMember> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| RotationMember {
                employee_id: id.to_string(),
                base_order_index: i as i32,
                active: true,
            })
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_index_is_day_of_year_mod_n() {
        // 2025-01-01 是当年第 1 天
        assert_eq!(start_index(date(2025, 1, 1), 3), 1);
        assert_eq!(start_index(date(2025, 1, 2), 3), 2);
        assert_eq!(start_index(date(2025, 1, 3), 3), 0);
    }

    #[test]
    fn test_walk_assigns_first_eligible_from_start() {
        let ms = members(&["A", "B", "C"]);
        let eligible: HashSet<String> = ["B".to_string()].into_iter().collect();
        // day_of_year=1, start=1 → 直接命中 B
        let outcome = walk_rotation(&ms, date(2025, 1, 1), &eligible, |_| {
            Ok::<_, Infallible>(SkipReason::Off)
        })
        .unwrap();
        assert_eq!(outcome.assignee.as_deref(), Some("B"));
        assert!(outcome.skips.is_empty());
    }

    #[test]
    fn test_walk_wraps_around_and_records_skips_in_order() {
        let ms = members(&["A", "B", "C"]);
        let eligible: HashSet<String> = ["A".to_string()].into_iter().collect();
        // start=1 → 跳过 B、C,回绕命中 A
        let outcome = walk_rotation(&ms, date(2025, 1, 1), &eligible, |_| {
            Ok::<_, Infallible>(SkipReason::Off)
        })
        .unwrap();
        assert_eq!(outcome.assignee.as_deref(), Some("A"));
        let skipped: Vec<&str> = outcome.skips.iter().map(|s| s.employee_id.as_str()).collect();
        assert_eq!(skipped, vec!["B", "C"]);
    }

    #[test]
    fn test_walk_exhausted_without_assignment() {
        let ms = members(&["A", "B", "C"]);
        let eligible = HashSet::new();
        let outcome = walk_rotation(&ms, date(2025, 1, 1), &eligible, |_| {
            Ok::<_, Infallible>(SkipReason::Leave)
        })
        .unwrap();
        assert_eq!(outcome.assignee, None);
        assert_eq!(outcome.skips.len(), 3);
    }

    #[test]
    fn test_empty_members_yields_no_assignee() {
        let outcome = walk_rotation(&[], date(2025, 1, 1), &HashSet::new(), |_| {
            Ok::<_, Infallible>(SkipReason::Off)
        })
        .unwrap();
        assert_eq!(outcome.assignee, None);
        assert!(outcome.skips.is_empty());
    }
}
