// ==========================================
// 门店盘点值班轮转系统 - 跳过类别判定 纯函数库
// ==========================================
// 职责: SHORT / LONG 跳过类别判定
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================
// 规则:
// - LEAVE: 长假类型 或 跨度 > 1 天 → LONG (预计返回日 = 请假结束日);
//          否则 → SHORT (同样带预计返回日)
// - INACTIVE → LONG, 无返回日
// - OFF / ABSENT / EXCLUDED / EXCLUDED_TODAY → SHORT
// 只有 SHORT 允许进入等待队列; LONG 仅作解释 ——
// 多日缺席没有单一"下次轮到"可以补偿
// ==========================================

use crate::domain::employee::ApprovedLeave;
use crate::domain::types::{SkipCategory, SkipReason};
use chrono::NaiveDate;

// ==========================================
// SkipClassification - 判定结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipClassification {
    pub category: SkipCategory,
    pub expected_return_date: Option<NaiveDate>,
}

impl SkipClassification {
    pub fn is_short(&self) -> bool {
        self.category == SkipCategory::Short
    }
}

// ==========================================
// SkipClassifier - 纯函数工具类
// ==========================================
pub struct SkipClassifier;

impl SkipClassifier {
    /// 判定一次跳过的类别
    ///
    /// # 参数
    /// - reason: 跳过原因
    /// - leave: 覆盖当日的已批准请假记录 (仅 LEAVE 时有意义)
    /// - _date: 被跳过的值班日
    pub fn classify(
        reason: SkipReason,
        leave: Option<&ApprovedLeave>,
        _date: NaiveDate,
    ) -> SkipClassification {
        match reason {
            SkipReason::Leave => match leave {
                Some(l) if l.kind.is_long_form() || l.span_days() > 1 => SkipClassification {
                    category: SkipCategory::Long,
                    expected_return_date: Some(l.end_date),
                },
                Some(l) => SkipClassification {
                    category: SkipCategory::Short,
                    expected_return_date: Some(l.end_date),
                },
                // 出勤判定为请假但请假记录已不可见 —— 按单日短假处理
                None => SkipClassification {
                    category: SkipCategory::Short,
                    expected_return_date: None,
                },
            },
            SkipReason::Inactive => SkipClassification {
                category: SkipCategory::Long,
                expected_return_date: None,
            },
            SkipReason::Off
            | SkipReason::Absent
            | SkipReason::Excluded
            | SkipReason::ExcludedToday => SkipClassification {
                category: SkipCategory::Short,
                expected_return_date: None,
            },
        }
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::LeaveKind;

    fn leave(start: (i32, u32, u32), end: (i32, u32, u32), kind: LeaveKind) -> ApprovedLeave {
        ApprovedLeave {
            employee_id: "E001".to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            kind,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_casual_leave_is_short() {
        let l = leave((2025, 3, 10), (2025, 3, 10), LeaveKind::Casual);
        let c = SkipClassifier::classify(SkipReason::Leave, Some(&l), date(2025, 3, 10));
        assert_eq!(c.category, SkipCategory::Short);
        assert_eq!(c.expected_return_date, Some(date(2025, 3, 10)));
    }

    #[test]
    fn test_multi_day_leave_is_long() {
        let l = leave((2025, 3, 10), (2025, 3, 12), LeaveKind::Sick);
        let c = SkipClassifier::classify(SkipReason::Leave, Some(&l), date(2025, 3, 10));
        assert_eq!(c.category, SkipCategory::Long);
        assert_eq!(c.expected_return_date, Some(date(2025, 3, 12)));
    }

    #[test]
    fn test_long_form_leave_kind_is_long_even_for_single_day() {
        let l = leave((2025, 3, 10), (2025, 3, 10), LeaveKind::Annual);
        let c = SkipClassifier::classify(SkipReason::Leave, Some(&l), date(2025, 3, 10));
        assert_eq!(c.category, SkipCategory::Long);
    }

    #[test]
    fn test_inactive_is_long_without_return_date() {
        let c = SkipClassifier::classify(SkipReason::Inactive, None, date(2025, 3, 10));
        assert_eq!(c.category, SkipCategory::Long);
        assert_eq!(c.expected_return_date, None);
    }

    #[test]
    fn test_off_absent_excluded_are_short() {
        for reason in [
            SkipReason::Off,
            SkipReason::Absent,
            SkipReason::Excluded,
            SkipReason::ExcludedToday,
        ] {
            let c = SkipClassifier::classify(reason, None, date(2025, 3, 10));
            assert_eq!(c.category, SkipCategory::Short, "reason={}", reason);
        }
    }
}
