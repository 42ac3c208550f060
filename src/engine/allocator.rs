// ==========================================
// Layup 排产系统 - 贪心分配引擎
// ==========================================
// 输入: 排序后订单 + 工作日历 + 兼容性索引 + 产能预算
// 输出: Allocation 列表 + 未排订单列表
// ==========================================
// 规则:
// 1) 按优先级顺序逐单处理，不回溯、不二次优化
// 2) 对每个订单按日期升序扫描:
//    a) 当日已达日产能 -> 跳过该日
//    b) 按索引顺序扫描兼容模具，模具当日未满即选中
// 3) 全窗口无可用 (日期, 模具) -> 未排 (正常结果)
// 红线: 计数器为单次运行状态，随运行创建、随运行丢弃
// ==========================================

use crate::domain::allocation::{Allocation, UnscheduledOrder};
use crate::domain::capacity::{CapacityBudget, DailyCapacityCheck};
use crate::domain::mold::Mold;
use crate::domain::types::{MaterialPrefix, UnscheduledReason};
use crate::engine::calendar::WorkCalendar;
use crate::engine::compatibility::CompatibilityIndex;
use crate::engine::priority::RankedOrder;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

// ==========================================
// AllocationState - 单次运行的占用计数
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AllocationState {
    daily_used: BTreeMap<NaiveDate, u32>,
    mold_used: HashMap<(NaiveDate, String), u32>,
}

impl AllocationState {
    /// 为日历 × 启用模具初始化为 0
    pub fn new(calendar: &WorkCalendar, index: &CompatibilityIndex<'_>) -> Self {
        let mut state = Self::default();
        for date in calendar.dates() {
            state.daily_used.insert(*date, 0);
            for mold in index.active_molds() {
                state.mold_used.insert((*date, mold.mold_id.clone()), 0);
            }
        }
        state
    }

    pub fn daily_used(&self, date: NaiveDate) -> u32 {
        self.daily_used.get(&date).copied().unwrap_or(0)
    }

    pub fn mold_used(&self, date: NaiveDate, mold_id: &str) -> u32 {
        self.mold_used
            .get(&(date, mold_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn consume(&mut self, date: NaiveDate, mold_id: &str) {
        *self.daily_used.entry(date).or_insert(0) += 1;
        *self
            .mold_used
            .entry((date, mold_id.to_string()))
            .or_insert(0) += 1;
    }
}

// ==========================================
// AllocationOutcome - 分配结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub allocations: Vec<Allocation>,
    pub unscheduled: Vec<UnscheduledOrder>,
    pub state: AllocationState,
}

// ==========================================
// Allocator - 贪心分配引擎
// ==========================================
pub struct Allocator {
    // 无状态引擎，状态全部在 AllocationState 中
}

impl Allocator {
    pub fn new() -> Self {
        Self {}
    }

    /// 执行贪心分配
    #[instrument(skip_all, fields(
        orders = ranked.len(),
        work_days = calendar.len(),
        daily_order_ceiling = budget.daily_order_ceiling
    ))]
    pub fn allocate(
        &self,
        ranked: &[RankedOrder],
        calendar: &WorkCalendar,
        index: &CompatibilityIndex<'_>,
        budget: &CapacityBudget,
    ) -> AllocationOutcome {
        let mut state = AllocationState::new(calendar, index);
        let mut allocations = Vec::new();
        let mut unscheduled = Vec::new();

        for entry in ranked {
            let compatible = index.compatible_molds(entry.order.stock_model_or_unknown());

            match self.find_slot(&state, calendar, &compatible, budget) {
                Some((date, mold)) => {
                    state.consume(date, &mold.mold_id);
                    debug!(
                        order_id = %entry.order.order_id,
                        mold_id = %mold.mold_id,
                        date = %date,
                        mold_used = state.mold_used(date, &mold.mold_id),
                        mold_ceiling = budget.per_mold_daily_ceiling(mold),
                        daily_used = state.daily_used(date),
                        "订单已分配"
                    );
                    allocations.push(self.create_allocation(entry, mold, date));
                }
                None => {
                    debug!(
                        order_id = %entry.order.order_id,
                        compatible_molds = compatible.len(),
                        "窗口内无可用产能，订单未排"
                    );
                    unscheduled.push(UnscheduledOrder {
                        order_id: entry.order.order_id.clone(),
                        stock_model_id: entry.order.stock_model_or_unknown().to_string(),
                        due_date: entry.order.due_date,
                        priority_score: entry.score,
                        reason: UnscheduledReason::NoCapacityInWindow,
                    });
                }
            }
        }

        info!(
            scheduled = allocations.len(),
            unscheduled = unscheduled.len(),
            "贪心分配完成"
        );

        AllocationOutcome {
            allocations,
            unscheduled,
            state,
        }
    }

    /// 找到最早可用的 (日期, 模具)
    fn find_slot<'m>(
        &self,
        state: &AllocationState,
        calendar: &WorkCalendar,
        compatible: &[&'m Mold],
        budget: &CapacityBudget,
    ) -> Option<(NaiveDate, &'m Mold)> {
        for &date in calendar.dates() {
            if budget.is_day_full(state.daily_used(date)) {
                continue;
            }
            for &mold in compatible {
                if state.mold_used(date, &mold.mold_id) < budget.per_mold_daily_ceiling(mold) {
                    return Some((date, mold));
                }
            }
        }
        None
    }

    fn create_allocation(&self, entry: &RankedOrder, mold: &Mold, date: NaiveDate) -> Allocation {
        let order = &entry.order;
        Allocation {
            order_id: order.order_id.clone(),
            mold_id: mold.mold_id.clone(),
            mold_name: mold.display_name.clone(),
            scheduled_date: date,
            stock_model_id: order.stock_model_or_unknown().to_string(),
            material_prefix: MaterialPrefix::from_normalized_model(&entry.normalized_model),
            heavy_fill: order.features.heavy_fill,
            lop_adjustment: order.features.lop_adjustment,
            customer: order
                .customer
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            due_date: order.due_date,
        }
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}
