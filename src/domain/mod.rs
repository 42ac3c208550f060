// ==========================================
// Layup 排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod capacity;
pub mod mold;
pub mod order;
pub mod types;

// 重导出核心类型
pub use allocation::{Allocation, EmployeeAssignment, ScheduleRow, UnscheduledOrder};
pub use capacity::{CapacityBudget, DailyCapacityCheck, DEFAULT_DAILY_ORDER_CEILING};
pub use mold::{Employee, Mold, MOLD_DAILY_HARD_CAP};
pub use order::{far_future_due_date, Order, OrderFeatures};
pub use types::{CapacitySource, MaterialPrefix, OrderSource, UnscheduledReason};
