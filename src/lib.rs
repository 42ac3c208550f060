// ==========================================
// Layup 排产系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 订单 × 模具 × 工作日 的确定性贪心分配
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排产规则 (纯内存计算)
pub mod engine;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 排产入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Allocation, CapacityBudget, CapacitySource, Employee, MaterialPrefix, Mold, Order,
    OrderSource, ScheduleRow, UnscheduledOrder,
};

// 引擎
pub use engine::{
    normalize_stock_model, CompatibilityIndex, RunMetrics, RunResult, ScheduleError,
    ScheduleOrchestrator,
};

// 配置
pub use config::{ConfigError, ConfigManager, RunConfig};

// API
pub use api::{ApiError, PersistenceStatus, ScheduleApi, ScheduleOutcome, ScheduleSources};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Layup 排产系统";
