// ==========================================
// Layup 排产系统 - 分配结果领域模型
// ==========================================
// 红线: Allocation 一旦生成即终态，只落库或丢弃，不修改
// ==========================================

use crate::domain::mold::Employee;
use crate::domain::types::{MaterialPrefix, UnscheduledReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Allocation - 订单分配 (order, mold, date)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub order_id: String,                 // 订单ID
    pub mold_id: String,                  // 模具ID
    pub mold_name: String,                // 模具名称
    pub scheduled_date: NaiveDate,        // 排产日期
    pub stock_model_id: String,           // 款式ID (原始写法)
    pub material_prefix: MaterialPrefix,  // 材料前缀
    pub heavy_fill: bool,                 // 加重填充
    pub lop_adjustment: bool,             // LOP 调整
    pub customer: String,                 // 客户
    pub due_date: Option<NaiveDate>,      // 交期
}

// ==========================================
// UnscheduledOrder - 未排订单诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledOrder {
    pub order_id: String,
    pub stock_model_id: String,
    pub due_date: Option<NaiveDate>,
    pub priority_score: i64,
    pub reason: UnscheduledReason,
}

// ==========================================
// EmployeeAssignment - 员工分派快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAssignment {
    pub employee_id: String,
    pub rate: f64,
    pub hours: f64,
    pub department: String,
}

impl From<&Employee> for EmployeeAssignment {
    fn from(e: &Employee) -> Self {
        Self {
            employee_id: e.employee_id.clone(),
            rate: e.rate,
            hours: e.hours,
            department: e.department.clone(),
        }
    }
}

// ==========================================
// ScheduleRow - 排产表落库行
// ==========================================
// 对齐 layup_schedule 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub order_id: String,
    pub scheduled_date: NaiveDate,
    pub mold_id: String,
    pub employee_assignments: Vec<EmployeeAssignment>,
    pub is_override: bool, // 算法排产恒为 false
}

impl ScheduleRow {
    /// 由分配结果 + 员工快照构造落库行
    pub fn from_allocation(allocation: &Allocation, employees: &[EmployeeAssignment]) -> Self {
        Self {
            order_id: allocation.order_id.clone(),
            scheduled_date: allocation.scheduled_date,
            mold_id: allocation.mold_id.clone(),
            employee_assignments: employees.to_vec(),
            is_override: false,
        }
    }
}
