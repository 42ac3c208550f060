// ==========================================
// Layup 排产系统 - 引擎层
// ==========================================
// 职责: 实现排产规则引擎 (纯内存计算)
// 红线: Engine 不拼 SQL, 不做 I/O
// 红线: 所有排序/分配结果必须可复现
// ==========================================

pub mod allocator;
pub mod calendar;
pub mod capacity;
pub mod compatibility;
pub mod error;
pub mod orchestrator;
pub mod priority;
pub mod reporter;
pub mod sources;
pub mod validator;

// 重导出核心引擎
pub use allocator::{AllocationOutcome, AllocationState, Allocator};
pub use calendar::{CalendarGenerator, WorkCalendar};
pub use capacity::CapacityPlanner;
pub use compatibility::{
    is_mesa_universal, normalize_stock_model, CompatibilityIndex, MESA_UNIVERSAL,
};
pub use error::{IncompatibleOrder, ScheduleError, ScheduleResult};
pub use orchestrator::{RunResult, ScheduleOrchestrator};
pub use priority::{DueUrgency, PriorityRanker, RankedOrder};
pub use reporter::{
    DailyCount, InvariantViolation, MaterialBreakdown, MoldUsage, RunMetrics, RunReporter,
};
pub use sources::{
    BacklogSource, EmployeeDirectory, MoldRegistry, ScheduleStore, WindowReplaceStats,
};
pub use validator::CompatibilityValidator;
