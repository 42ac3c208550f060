// ==========================================
// Layup 排产系统 - 引擎编排器
// ==========================================
// 用途: 协调各引擎的执行顺序 (纯内存计算，无 I/O)
// 流程:
//   配置校验 -> 优先级排序 -> 兼容性预检 -> 产能预算
//   -> 工作日历 -> 贪心分配 -> 运行报告
// ==========================================

use crate::config::RunConfig;
use crate::domain::allocation::{Allocation, UnscheduledOrder};
use crate::domain::capacity::CapacityBudget;
use crate::domain::mold::{Employee, Mold};
use crate::domain::order::Order;
use crate::engine::allocator::Allocator;
use crate::engine::calendar::CalendarGenerator;
use crate::engine::capacity::CapacityPlanner;
use crate::engine::compatibility::CompatibilityIndex;
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::priority::PriorityRanker;
use crate::engine::reporter::{RunMetrics, RunReporter};
use crate::engine::validator::CompatibilityValidator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// RunResult - 单次排产结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,                          // 运行ID (UUID v4)
    pub generated_for: NaiveDate,                // 计算基准日 (today)
    pub window_start: NaiveDate,                 // 窗口首日
    pub window_end: NaiveDate,                   // 窗口末日
    pub work_dates: Vec<NaiveDate>,              // 工作日历
    pub capacity: CapacityBudget,                // 产能预算
    pub allocations: Vec<Allocation>,            // 分配结果 (按优先级顺序)
    pub unscheduled_orders: Vec<UnscheduledOrder>, // 未排订单
    pub metrics: RunMetrics,                     // 运行指标
}

// ==========================================
// ScheduleOrchestrator - 引擎编排器
// ==========================================
pub struct ScheduleOrchestrator {
    ranker: PriorityRanker,
    validator: CompatibilityValidator,
    planner: CapacityPlanner,
    calendar: CalendarGenerator,
    allocator: Allocator,
    reporter: RunReporter,
}

impl ScheduleOrchestrator {
    /// 创建新的编排器实例
    pub fn new() -> Self {
        Self {
            ranker: PriorityRanker::new(),
            validator: CompatibilityValidator::new(),
            planner: CapacityPlanner::new(),
            calendar: CalendarGenerator::new(),
            allocator: Allocator::new(),
            reporter: RunReporter::new(),
        }
    }

    /// 执行完整排产流程
    ///
    /// # 参数
    /// - `config`: 运行配置
    /// - `backlog`: 积压订单
    /// - `molds`: 模具注册表快照 (未启用模具会被忽略)
    /// - `employees`: 员工产能快照 (None 表示不可用)
    /// - `today`: 计算基准日
    ///
    /// # 返回
    /// - Ok(RunResult): 计算完成 (可能含未排订单)
    /// - Err(Configuration): 配置错误，未做任何计算
    /// - Err(CompatibilityValidation): 整批拒绝
    /// - Err(InvariantViolation): 结果违反内部不变量
    #[instrument(skip_all, fields(orders = backlog.len(), molds = molds.len(), today = %today))]
    pub fn execute(
        &self,
        config: &RunConfig,
        backlog: Vec<Order>,
        molds: &[Mold],
        employees: Option<&[Employee]>,
        today: NaiveDate,
    ) -> ScheduleResult<RunResult> {
        info!("开始执行排产流程");

        // ==========================================
        // 步骤1: 配置校验
        // ==========================================
        config.validate()?;
        let weekdays = config.weekdays()?;

        // ==========================================
        // 步骤2: 优先级排序
        // ==========================================
        debug!("步骤2: 优先级排序");
        let ranked = self.ranker.rank(backlog, today);

        // ==========================================
        // 步骤3: 兼容性预检 (全有或全无)
        // ==========================================
        debug!("步骤3: 兼容性预检");
        let index = CompatibilityIndex::build(molds);
        self.validator.validate(&ranked, &index)?;

        // ==========================================
        // 步骤4: 产能预算
        // ==========================================
        let budget =
            self.planner
                .derive_budget(config.daily_order_ceiling, employees, &config.department);

        // ==========================================
        // 步骤5: 工作日历
        // ==========================================
        let start = config.start_date.unwrap_or(today);
        let calendar = self
            .calendar
            .generate(start, config.run_length_days, &weekdays)?;
        let (window_start, window_end) = match (calendar.first(), calendar.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(ScheduleError::InvariantViolation(
                    "工作日历为空".to_string(),
                ))
            }
        };

        // ==========================================
        // 步骤6: 贪心分配
        // ==========================================
        let outcome = self.allocator.allocate(&ranked, &calendar, &index, &budget);

        // ==========================================
        // 步骤7: 运行报告 + 不变量复核
        // ==========================================
        let metrics = self.reporter.report(
            &outcome.allocations,
            &outcome.unscheduled,
            &calendar,
            &index,
            &budget,
        );
        if metrics.has_violations() {
            let summary = metrics
                .invariant_violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            error!(
                violations = metrics.invariant_violations.len(),
                "排产结果违反内部不变量，本次运行作废"
            );
            return Err(ScheduleError::InvariantViolation(summary));
        }

        let result = RunResult {
            run_id: Uuid::new_v4().to_string(),
            generated_for: today,
            window_start,
            window_end,
            work_dates: calendar.dates().to_vec(),
            capacity: budget,
            allocations: outcome.allocations,
            unscheduled_orders: outcome.unscheduled,
            metrics,
        };

        info!(
            run_id = %result.run_id,
            window_start = %result.window_start,
            window_end = %result.window_end,
            scheduled = result.allocations.len(),
            unscheduled = result.unscheduled_orders.len(),
            "排产流程完成"
        );

        Ok(result)
    }
}

impl Default for ScheduleOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::domain::types::{CapacitySource, OrderSource};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn config(days: u32) -> RunConfig {
        RunConfig {
            run_length_days: days,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_config_error_before_any_work() {
        let mut cfg = config(2);
        cfg.permitted_weekdays.clear();
        let err = ScheduleOrchestrator::new()
            .execute(&cfg, vec![Order::new("O1", None)], &[], None, today())
            .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Configuration(ConfigError::EmptyPermittedWeekdays)
        );
    }

    #[test]
    fn test_validation_rejects_whole_batch() {
        let molds = vec![Mold::new("M1", &["cf_classic"], 2)];
        let orders = vec![
            Order::new("O1", Some("cf_classic")),
            Order::new("O2", Some("fg_unknown")),
        ];
        let err = ScheduleOrchestrator::new()
            .execute(&config(2), orders, &molds, None, today())
            .unwrap_err();
        match err {
            ScheduleError::CompatibilityValidation { invalid_orders } => {
                assert_eq!(invalid_orders.len(), 1);
                assert_eq!(invalid_orders[0].order_id, "O2");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_example_scenario() {
        let molds = vec![
            Mold::new("M1", &["cf_classic"], 2),
            Mold::new("M2", &["mesa_universal"], 1),
        ];
        let mut o1 = Order::new("O1", Some("cf_classic"));
        o1.source = OrderSource::PurchaseOrder;
        o1.due_date = Some(today() + Duration::days(2));
        let mut o2 = Order::new("O2", Some("cf_classic"));
        o2.due_date = Some(today() + Duration::days(40));
        let mut o3 = Order::new("O3", Some("mesa_universal"));
        o3.due_date = Some(today() + Duration::days(10));

        let result = ScheduleOrchestrator::new()
            .execute(&config(2), vec![o1, o2, o3], &molds, None, today())
            .unwrap();

        let got: Vec<(&str, &str, NaiveDate)> = result
            .allocations
            .iter()
            .map(|a| (a.order_id.as_str(), a.mold_id.as_str(), a.scheduled_date))
            .collect();
        assert_eq!(
            got,
            vec![
                ("O1", "M1", today()),
                ("O3", "M2", today()),
                ("O2", "M1", today()),
            ]
        );
        assert_eq!(result.capacity.source, CapacitySource::Fallback);
        assert_eq!(result.window_start, today());
        assert_eq!(result.window_end, today().succ_opt().unwrap());
        assert_eq!(result.metrics.total_scheduled, 3);
        assert!(result.unscheduled_orders.is_empty());
    }

    #[test]
    fn test_empty_backlog_is_not_an_error() {
        let result = ScheduleOrchestrator::new()
            .execute(&config(3), Vec::new(), &[], None, today())
            .unwrap();
        assert!(result.allocations.is_empty());
        assert_eq!(result.work_dates.len(), 3);
        assert_eq!(result.metrics.success_rate, 0.0);
    }
}
