// ==========================================
// Layup 排产系统 - 领域类型定义
// ==========================================
// 订单来源 / 材料前缀 / 未排原因 / 产能来源
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单来源 (Order Source)
// ==========================================
// 序列化格式: snake_case (与上游队列一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    PurchaseOrder,   // 采购单 (P1 PO)
    ProductionOrder, // 生产单
    Regular,         // 普通积压订单
}

impl OrderSource {
    /// 是否为 PO/生产单 (优先级 +1000)
    pub fn is_production_source(&self) -> bool {
        matches!(self, OrderSource::PurchaseOrder | OrderSource::ProductionOrder)
    }

    /// 从上游字符串解析来源
    ///
    /// 上游存在多种命名 (p1_purchase_order 等)，统一在入口归一。
    /// 未识别的来源一律视为 Regular。
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "purchase_order" | "p1_purchase_order" => OrderSource::PurchaseOrder,
            "production_order" => OrderSource::ProductionOrder,
            _ => OrderSource::Regular,
        }
    }
}

impl fmt::Display for OrderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSource::PurchaseOrder => write!(f, "purchase_order"),
            OrderSource::ProductionOrder => write!(f, "production_order"),
            OrderSource::Regular => write!(f, "regular"),
        }
    }
}

// ==========================================
// 材料前缀 (Material Prefix)
// ==========================================
// 由款式命名约定派生: cf_* / fg_*
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialPrefix {
    Cf,      // 碳纤维
    Fg,      // 玻璃纤维
    Unknown, // 无法识别
}

impl MaterialPrefix {
    /// 从归一化后的款式ID派生材料前缀
    pub fn from_normalized_model(normalized: &str) -> Self {
        if normalized.starts_with("cf_") {
            MaterialPrefix::Cf
        } else if normalized.starts_with("fg_") {
            MaterialPrefix::Fg
        } else {
            MaterialPrefix::Unknown
        }
    }
}

impl fmt::Display for MaterialPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialPrefix::Cf => write!(f, "cf"),
            MaterialPrefix::Fg => write!(f, "fg"),
            MaterialPrefix::Unknown => write!(f, "unknown"),
        }
    }
}

// ==========================================
// 未排原因 (Unscheduled Reason)
// ==========================================
// 产能耗尽不是错误，是正常的可报告结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnscheduledReason {
    NoCapacityInWindow, // 窗口内无剩余产能
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnscheduledReason::NoCapacityInWindow => write!(f, "no capacity within window"),
        }
    }
}

// ==========================================
// 日产能来源 (Capacity Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacitySource {
    Explicit,        // 调用方显式指定
    EmployeeDerived, // 员工产能汇总
    Fallback,        // 兜底常量
}

impl fmt::Display for CapacitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacitySource::Explicit => write!(f, "EXPLICIT"),
            CapacitySource::EmployeeDerived => write!(f, "EMPLOYEE_DERIVED"),
            CapacitySource::Fallback => write!(f, "FALLBACK"),
        }
    }
}
