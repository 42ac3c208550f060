// ==========================================
// Layup 排产系统 - 产能模型
// ==========================================
// 日产能:
// 1) 调用方显式指定 -> 原样使用
// 2) 否则 floor(Σ rate × hours)，仅统计在岗且属于排产部门的员工
// 3) 汇总不足 1 (含负值) 或员工数据不可用 -> 兜底 21
// 单模具日产能: min(倍率, 3)
// 红线: 一次排产内产能预算不可变
// ==========================================

use crate::domain::capacity::{CapacityBudget, DEFAULT_DAILY_ORDER_CEILING};
use crate::domain::mold::Employee;
use crate::domain::types::CapacitySource;
use tracing::{debug, info, warn};

pub struct CapacityPlanner {
    // 无状态引擎
}

impl CapacityPlanner {
    pub fn new() -> Self {
        Self {}
    }

    /// 推导产能预算
    ///
    /// # 参数
    /// - `explicit`: 显式日产能 (Some 时直接使用)
    /// - `employees`: 员工产能设置 (None 表示数据不可用)
    /// - `department`: 排产部门
    pub fn derive_budget(
        &self,
        explicit: Option<u32>,
        employees: Option<&[Employee]>,
        department: &str,
    ) -> CapacityBudget {
        if let Some(ceiling) = explicit.filter(|c| *c > 0) {
            info!(daily_order_ceiling = ceiling, "使用显式日产能");
            return CapacityBudget::new(ceiling, CapacitySource::Explicit);
        }

        let employees = match employees {
            Some(e) => e,
            None => {
                warn!(
                    fallback = DEFAULT_DAILY_ORDER_CEILING,
                    "员工产能数据不可用，使用兜底日产能"
                );
                return CapacityBudget::new(DEFAULT_DAILY_ORDER_CEILING, CapacitySource::Fallback);
            }
        };

        let total = self.employee_daily_total(employees, department);
        let floored = total.floor();
        if floored < 1.0 {
            warn!(
                department = department,
                total = total,
                fallback = DEFAULT_DAILY_ORDER_CEILING,
                "员工产能汇总为 0，使用兜底日产能"
            );
            return CapacityBudget::new(DEFAULT_DAILY_ORDER_CEILING, CapacitySource::Fallback);
        }

        let ceiling = if floored >= u32::MAX as f64 {
            u32::MAX
        } else {
            floored as u32
        };
        info!(
            department = department,
            total = total,
            daily_order_ceiling = ceiling,
            "由员工产能推导日产能"
        );
        CapacityBudget::new(ceiling, CapacitySource::EmployeeDerived)
    }

    /// Σ rate × hours（在岗 + 部门匹配）
    pub fn employee_daily_total(&self, employees: &[Employee], department: &str) -> f64 {
        employees
            .iter()
            .filter(|e| e.active && e.department.trim().eq_ignore_ascii_case(department.trim()))
            .map(|e| {
                let out = e.daily_output();
                debug!(
                    employee_id = %e.employee_id,
                    rate = e.rate,
                    hours = e.hours,
                    daily_output = out,
                    "员工日产能"
                );
                out
            })
            .sum()
    }
}

impl Default for CapacityPlanner {
    fn default() -> Self {
        Self::new()
    }
}
