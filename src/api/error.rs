// ==========================================
// Layup 排产系统 - API层错误类型
// ==========================================
// 职责: 定义入口层错误类型，转换引擎与仓储错误
// 原则: 所有错误信息必须包含显式原因
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::{IncompatibleOrder, ScheduleError};
use crate::engine::orchestrator::RunResult;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 计算前失败 (无副作用)
    // ==========================================
    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigError),

    /// 整批拒绝，附完整的问题订单清单
    #[error("模具兼容性校验失败: {} 个订单无可用模具", .invalid_orders.len())]
    CompatibilityValidationFailed { invalid_orders: Vec<IncompatibleOrder> },

    #[error("数据源读取失败: {0}")]
    DataSourceError(String),

    // ==========================================
    // 计算后失败
    // ==========================================
    #[error("内部不变量被破坏: {0}")]
    InvariantViolation(String),

    /// 计算成功但落库失败；计算结果随错误一并返回
    #[error("排产结果落库失败 (run_id={}): {message}", .result.run_id)]
    PersistenceFailed {
        result: Box<RunResult>,
        message: String,
    },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 兼容性校验失败时的问题订单清单
    pub fn invalid_orders(&self) -> Option<&[IncompatibleOrder]> {
        match self {
            ApiError::CompatibilityValidationFailed { invalid_orders } => Some(invalid_orders.as_slice()),
            _ => None,
        }
    }

    /// 落库失败时仍可取回的计算结果
    pub fn computed_result(&self) -> Option<&RunResult> {
        match self {
            ApiError::PersistenceFailed { result, .. } => Some(result.as_ref()),
            _ => None,
        }
    }
}

// ==========================================
// 从 ScheduleError 转换
// ==========================================
impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Configuration(e) => ApiError::Configuration(e),
            ScheduleError::CompatibilityValidation { invalid_orders } => {
                ApiError::CompatibilityValidationFailed { invalid_orders }
            }
            ScheduleError::InvariantViolation(msg) => ApiError::InvariantViolation(msg),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Other(err) => ApiError::Other(err),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DataSourceError(format!("字段{}错误: {}", field, message))
            }
            other => ApiError::DataSourceError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
