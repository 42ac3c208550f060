// ==========================================
// Layup 排产系统 - 引擎层错误类型
// ==========================================
// 错误分类:
// - 配置错误: 计算前失败
// - 兼容性校验失败: 整批拒绝 (结构化清单)
// - 内部不变量破坏: 程序缺陷信号，必须大声报警
// 注: 产能耗尽不是错误，见 UnscheduledOrder
// ==========================================

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 无兼容模具的订单 (orderId, stockModelId)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompatibleOrder {
    pub order_id: String,
    pub stock_model_id: String,
}

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigError),

    #[error("模具兼容性校验失败: {} 个订单无可用模具", .invalid_orders.len())]
    CompatibilityValidation { invalid_orders: Vec<IncompatibleOrder> },

    #[error("内部不变量被破坏: {0}")]
    InvariantViolation(String),
}

/// Result 类型别名
pub type ScheduleResult<T> = Result<T, ScheduleError>;
