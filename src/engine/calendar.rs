// ==========================================
// Layup 排产系统 - 工作日历生成器
// ==========================================
// 输入: 起始日期 + 工作日数 + 允许的星期集合
// 输出: 升序、无重复、恰好 N 个工作日的日期序列
// 红线: 永不输出不在允许集合内的日期 (宁可中止，不可静默跳过)
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

// ==========================================
// WorkCalendar - 工作日历
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendar {
    dates: Vec<NaiveDate>,
    permitted: Vec<Weekday>,
}

impl WorkCalendar {
    /// 按时间顺序的工作日
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// 窗口首日
    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// 窗口末日
    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// 星期是否在允许集合内
    pub fn is_permitted(&self, date: NaiveDate) -> bool {
        self.permitted.contains(&date.weekday())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }
}

// ==========================================
// CalendarGenerator - 工作日历生成器
// ==========================================
pub struct CalendarGenerator {
    // 无状态引擎
}

impl CalendarGenerator {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成工作日历
    ///
    /// # 参数
    /// - `start_date`: 起始日期 (若非工作日则向后推进)
    /// - `run_length_days`: 工作日数 (> 0)
    /// - `permitted`: 允许的星期集合 (非空)
    ///
    /// # 返回
    /// - Ok(WorkCalendar): 恰好 run_length_days 个日期
    /// - Err(Configuration): 集合为空 / 天数为 0 / 日期溢出
    /// - Err(InvariantViolation): 生成结果违反日历不变量
    pub fn generate(
        &self,
        start_date: NaiveDate,
        run_length_days: u32,
        permitted: &[Weekday],
    ) -> ScheduleResult<WorkCalendar> {
        if permitted.is_empty() {
            return Err(ConfigError::EmptyPermittedWeekdays.into());
        }
        if run_length_days == 0 {
            return Err(ConfigError::NonPositiveRunLength(run_length_days).into());
        }

        let target = run_length_days as usize;
        let mut dates = Vec::with_capacity(target);
        let mut current = start_date;

        loop {
            if permitted.contains(&current.weekday()) {
                dates.push(current);
                if dates.len() == target {
                    break;
                }
            }
            current = current
                .succ_opt()
                .ok_or(ConfigError::CalendarOverflow(start_date))?;
        }

        let calendar = WorkCalendar {
            dates,
            permitted: permitted.to_vec(),
        };
        self.verify(&calendar, target)?;

        debug!(
            start = %start_date,
            first = ?calendar.first(),
            last = ?calendar.last(),
            work_days = calendar.len(),
            "工作日历生成完成"
        );

        Ok(calendar)
    }

    /// 日历不变量复核: 数量、星期、严格升序
    fn verify(&self, calendar: &WorkCalendar, target: usize) -> ScheduleResult<()> {
        if calendar.dates.len() != target {
            error!(
                expected = target,
                actual = calendar.dates.len(),
                "日历不变量被破坏: 日期数量不符"
            );
            return Err(ScheduleError::InvariantViolation(format!(
                "日历日期数量不符: expected={}, actual={}",
                target,
                calendar.dates.len()
            )));
        }

        for date in &calendar.dates {
            if !calendar.is_permitted(*date) {
                error!(date = %date, weekday = %date.weekday(), "日历不变量被破坏: 生成了非工作日");
                return Err(ScheduleError::InvariantViolation(format!(
                    "生成了不允许的工作日: {} ({})",
                    date,
                    date.weekday()
                )));
            }
        }

        if calendar.dates.windows(2).any(|w| w[0] >= w[1]) {
            error!("日历不变量被破坏: 日期非严格升序");
            return Err(ScheduleError::InvariantViolation(
                "日历日期非严格升序".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CalendarGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MON_THU: [Weekday; 4] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu];

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_generate_mon_thu_never_friday() {
        // 2026-10-16 是周五
        let cal = CalendarGenerator::new()
            .generate(d(2026, 10, 16), 10, &MON_THU)
            .unwrap();

        assert_eq!(cal.len(), 10);
        assert_eq!(cal.first(), Some(d(2026, 10, 19))); // 推进到周一
        assert_eq!(cal.last(), Some(d(2026, 11, 3)));
        assert!(cal.dates().iter().all(|x| x.weekday() != Weekday::Fri));
        assert!(cal.dates().iter().all(|x| MON_THU.contains(&x.weekday())));
    }

    #[test]
    fn test_generate_start_on_permitted_day_included() {
        let cal = CalendarGenerator::new()
            .generate(d(2026, 10, 19), 2, &MON_THU)
            .unwrap();
        assert_eq!(cal.dates(), &[d(2026, 10, 19), d(2026, 10, 20)]);
    }

    #[test]
    fn test_generate_single_weekday() {
        let cal = CalendarGenerator::new()
            .generate(d(2026, 10, 19), 3, &[Weekday::Sat])
            .unwrap();
        assert_eq!(
            cal.dates(),
            &[d(2026, 10, 24), d(2026, 10, 31), d(2026, 11, 7)]
        );
    }

    #[test]
    fn test_generate_empty_weekdays_is_config_error() {
        let err = CalendarGenerator::new()
            .generate(d(2026, 10, 19), 3, &[])
            .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Configuration(ConfigError::EmptyPermittedWeekdays)
        );
    }

    #[test]
    fn test_generate_zero_length_is_config_error() {
        let err = CalendarGenerator::new()
            .generate(d(2026, 10, 19), 0, &MON_THU)
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Configuration(ConfigError::NonPositiveRunLength(0))
        ));
    }

    #[test]
    fn test_generate_overflow() {
        let err = CalendarGenerator::new()
            .generate(NaiveDate::MAX, 2, &[NaiveDate::MAX.weekday()])
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Configuration(ConfigError::CalendarOverflow(_))
        ));
    }
}
