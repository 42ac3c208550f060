// ==========================================
// Layup 排产系统 - 外部协作方接口
// ==========================================
// 职责: 定义排产核心所依赖的数据来源与落库边界
// 红线: 引擎只依赖这些 trait，不拼 SQL
// 实现: repository 层的 SQLite 仓储；测试中可替换为内存实现
// ==========================================

use crate::domain::mold::{Employee, Mold};
use crate::domain::order::Order;
use crate::domain::allocation::ScheduleRow;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;

/// 积压订单队列 (已跨上游来源去重)
pub trait BacklogSource: Send + Sync {
    fn fetch_backlog(&self) -> RepositoryResult<Vec<Order>>;
}

/// 模具注册表
pub trait MoldRegistry: Send + Sync {
    /// 启用模具，按注册顺序返回
    fn fetch_active_molds(&self) -> RepositoryResult<Vec<Mold>>;
}

/// 员工产能设置
pub trait EmployeeDirectory: Send + Sync {
    fn fetch_active_employees(&self, department: &str) -> RepositoryResult<Vec<Employee>>;
}

/// 落库统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReplaceStats {
    pub rows_deleted: usize,
    pub rows_written: usize,
}

/// 排产结果存储
pub trait ScheduleStore: Send + Sync {
    /// 单事务替换 [start, end] 窗口内的排产行
    fn replace_schedule_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        rows: &[ScheduleRow],
    ) -> RepositoryResult<WindowReplaceStats>;
}
