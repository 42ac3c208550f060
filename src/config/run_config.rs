// ==========================================
// Layup 排产系统 - 排产运行配置
// ==========================================
// 职责: 一次排产运行的入参 (窗口长度/工作日/日产能)
// 红线: 配置错误在任何计算之前失败
// ==========================================

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认排产工作日数 (两周 Mon-Thu)
pub const DEFAULT_RUN_LENGTH_DAYS: u32 = 10;

/// 默认工作日: 周一至周四 (0=周日 .. 6=周六)
pub const DEFAULT_PERMITTED_WEEKDAYS: [u32; 4] = [1, 2, 3, 4];

/// 默认排产部门
pub const DEFAULT_DEPARTMENT: &str = "Layup";

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("工作日集合为空")]
    EmptyPermittedWeekdays,

    #[error("无效的工作日取值: {0} (应为 0..=6, 0=周日)")]
    InvalidWeekday(u32),

    #[error("排产天数必须为正数: {0}")]
    NonPositiveRunLength(u32),

    #[error("显式日产能必须为正数")]
    NonPositiveDailyCapacity,

    #[error("日历超出可表示范围: 起始日期={0}")]
    CalendarOverflow(NaiveDate),

    #[error("配置值格式错误 (key={key}): {message}")]
    MalformedValue { key: String, message: String },
}

/// 0=周日 .. 6=周六 -> chrono::Weekday
pub fn weekday_from_index(index: u32) -> Result<Weekday, ConfigError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ConfigError::InvalidWeekday(other)),
    }
}

// ==========================================
// RunConfig - 排产运行配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub run_length_days: u32,             // 排产工作日数
    pub permitted_weekdays: Vec<u32>,     // 允许的工作日 (0=周日)
    pub daily_order_ceiling: Option<u32>, // 显式日产能 (None = 由员工产能推导)
    pub start_date: Option<NaiveDate>,    // 起始日期 (None = 今天)
    pub department: String,               // 员工产能汇总所用部门
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_length_days: DEFAULT_RUN_LENGTH_DAYS,
            permitted_weekdays: DEFAULT_PERMITTED_WEEKDAYS.to_vec(),
            daily_order_ceiling: None,
            start_date: None,
            department: DEFAULT_DEPARTMENT.to_string(),
        }
    }
}

impl RunConfig {
    /// 校验配置
    ///
    /// # 返回
    /// - Ok(()): 配置合法
    /// - Err(ConfigError): 第一个发现的配置错误
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.permitted_weekdays.is_empty() {
            return Err(ConfigError::EmptyPermittedWeekdays);
        }
        for &d in &self.permitted_weekdays {
            weekday_from_index(d)?;
        }
        if self.run_length_days == 0 {
            return Err(ConfigError::NonPositiveRunLength(self.run_length_days));
        }
        if self.daily_order_ceiling == Some(0) {
            return Err(ConfigError::NonPositiveDailyCapacity);
        }
        Ok(())
    }

    /// 允许的工作日 (chrono::Weekday，去重)
    pub fn weekdays(&self) -> Result<Vec<Weekday>, ConfigError> {
        let mut out: Vec<Weekday> = Vec::with_capacity(self.permitted_weekdays.len());
        for &d in &self.permitted_weekdays {
            let w = weekday_from_index(d)?;
            if !out.contains(&w) {
                out.push(w);
            }
        }
        Ok(out)
    }
}
