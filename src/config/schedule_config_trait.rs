// ==========================================
// Layup 排产系统 - 排产配置读取 Trait
// ==========================================
// 职责: 定义排产运行所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::run_config::RunConfig;
use std::error::Error;

// ==========================================
// ScheduleConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ScheduleConfigReader: Send + Sync {
    /// 获取排产工作日数
    ///
    /// # 默认值
    /// - 10
    fn get_run_length_days(&self) -> Result<u32, Box<dyn Error>>;

    /// 获取允许的工作日列表 (0=周日 .. 6=周六)
    ///
    /// # 默认值
    /// - [1, 2, 3, 4]
    fn get_permitted_weekdays(&self) -> Result<Vec<u32>, Box<dyn Error>>;

    /// 获取显式日产能
    ///
    /// # 返回
    /// - None: 未配置，由员工产能推导
    fn get_daily_capacity(&self) -> Result<Option<u32>, Box<dyn Error>>;

    /// 获取员工产能汇总部门
    ///
    /// # 默认值
    /// - "Layup"
    fn get_department(&self) -> Result<String, Box<dyn Error>>;

    /// 组装完整运行配置（起始日期留空 = 今天）
    fn load_run_config(&self) -> Result<RunConfig, Box<dyn Error>> {
        Ok(RunConfig {
            run_length_days: self.get_run_length_days()?,
            permitted_weekdays: self.get_permitted_weekdays()?,
            daily_order_ceiling: self.get_daily_capacity()?,
            start_date: None,
            department: self.get_department()?,
        })
    }
}
