// ==========================================
// Layup 排产系统 - API 层
// ==========================================
// 职责: 对外暴露排产入口，组合仓储与引擎
// ==========================================

pub mod error;
pub mod schedule_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use schedule_api::{PersistenceStatus, ScheduleApi, ScheduleOutcome, ScheduleSources};
