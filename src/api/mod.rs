// ==========================================
// 门店盘点值班轮转系统 - API 层
// ==========================================
// 职责: 对外业务接口 —— 参数校验、引擎编排、DTO 组装
// 红线: 不直接写 SQL,一切持久化经由仓储层
// ==========================================

pub mod duty_api;
pub mod error;
pub mod exclusion_api;

pub use duty_api::{CompletionCount, DutyApi, DutyRunDetail, SkipDetail};
pub use error::{ApiError, ApiResult};
pub use exclusion_api::{ExclusionApi, ExclusionDetail};
