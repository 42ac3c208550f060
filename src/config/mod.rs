// ==========================================
// Layup 排产系统 - 配置层
// ==========================================
// 职责: 排产运行配置 + config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod run_config;
pub mod schedule_config_trait;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use run_config::{weekday_from_index, ConfigError, RunConfig};
pub use schedule_config_trait::ScheduleConfigReader;
