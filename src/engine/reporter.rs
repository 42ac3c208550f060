// ==========================================
// Layup 排产系统 - 运行报告
// ==========================================
// 职责: 统计排产结果，并对不变量做事后复核
// 红线: 纯诊断，不修改任何分配结果
// 复核项:
// - 每日分配数 <= 日产能
// - 每 (日期, 模具) 分配数 <= min(倍率, 3)
// - 排产日期在日历内，且星期在允许集合内
// - 分配模具与订单款式兼容
// ==========================================

use crate::domain::allocation::{Allocation, UnscheduledOrder};
use crate::domain::capacity::CapacityBudget;
use crate::domain::mold::Mold;
use crate::domain::types::MaterialPrefix;
use crate::engine::calendar::WorkCalendar;
use crate::engine::compatibility::{
    is_mesa_universal, normalize_stock_model, CompatibilityIndex, MESA_UNIVERSAL,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{error, info};

// ==========================================
// 报告数据结构
// ==========================================

/// 单日分配统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
    pub ceiling: u32,
}

/// 模具利用率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoldUsage {
    pub mold_id: String,
    pub mold_name: String,
    pub allocated: u32,
    pub capacity: u32,       // per_day_ceiling × 工作日数
    pub utilization_pct: f64,
}

/// 材料分布
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialBreakdown {
    pub cf: u32,
    pub fg: u32,
    pub unknown: u32,
}

/// 不变量违规 (程序缺陷信号)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvariantViolation {
    DailyCeilingExceeded { date: NaiveDate, count: u32, ceiling: u32 },
    MoldCeilingExceeded { date: NaiveDate, mold_id: String, count: u32, ceiling: u32 },
    DateOutsideWindow { order_id: String, date: NaiveDate },
    ForbiddenWeekday { order_id: String, date: NaiveDate },
    UnknownMold { order_id: String, mold_id: String },
    IncompatibleAssignment { order_id: String, mold_id: String, stock_model_id: String },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::DailyCeilingExceeded { date, count, ceiling } => {
                write!(f, "{} 日分配 {} 超过日产能 {}", date, count, ceiling)
            }
            InvariantViolation::MoldCeilingExceeded {
                date,
                mold_id,
                count,
                ceiling,
            } => write!(f, "{} 模具 {} 分配 {} 超过上限 {}", date, mold_id, count, ceiling),
            InvariantViolation::DateOutsideWindow { order_id, date } => {
                write!(f, "订单 {} 排产日期 {} 不在窗口内", order_id, date)
            }
            InvariantViolation::ForbiddenWeekday { order_id, date } => {
                write!(f, "订单 {} 排产日期 {} 不是允许的工作日", order_id, date)
            }
            InvariantViolation::UnknownMold { order_id, mold_id } => {
                write!(f, "订单 {} 分配到未启用模具 {}", order_id, mold_id)
            }
            InvariantViolation::IncompatibleAssignment {
                order_id,
                mold_id,
                stock_model_id,
            } => write!(
                f,
                "订单 {} (款式 {}) 分配到不兼容模具 {}",
                order_id, stock_model_id, mold_id
            ),
        }
    }
}

/// 运行指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_processed: usize,
    pub total_scheduled: usize,
    pub total_unscheduled: usize,
    pub success_rate: f64, // 百分比，未处理订单时为 0
    pub work_days: usize,
    pub daily_order_ceiling: u32,
    pub theoretical_max: u64, // 工作日数 × 日产能
    pub daily_breakdown: Vec<DailyCount>,
    pub mold_breakdown: Vec<MoldUsage>,
    pub material_breakdown: MaterialBreakdown,
    pub invariant_violations: Vec<InvariantViolation>,
}

impl RunMetrics {
    pub fn has_violations(&self) -> bool {
        !self.invariant_violations.is_empty()
    }
}

// ==========================================
// RunReporter - 运行报告生成器
// ==========================================
pub struct RunReporter {
    // 无状态引擎
}

impl RunReporter {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成运行指标
    ///
    /// # 参数
    /// - `allocations`: 分配结果
    /// - `unscheduled`: 未排订单
    /// - `calendar`: 本次工作日历
    /// - `index`: 兼容性索引 (用于复核)
    /// - `budget`: 产能预算
    pub fn report(
        &self,
        allocations: &[Allocation],
        unscheduled: &[UnscheduledOrder],
        calendar: &WorkCalendar,
        index: &CompatibilityIndex<'_>,
        budget: &CapacityBudget,
    ) -> RunMetrics {
        let total_scheduled = allocations.len();
        let total_unscheduled = unscheduled.len();
        let total_processed = total_scheduled + total_unscheduled;
        let success_rate = if total_processed == 0 {
            0.0
        } else {
            total_scheduled as f64 / total_processed as f64 * 100.0
        };

        let mut per_day: BTreeMap<NaiveDate, u32> =
            calendar.dates().iter().map(|d| (*d, 0)).collect();
        let mut per_mold_day: BTreeMap<(NaiveDate, String), u32> = BTreeMap::new();
        let mut per_mold: HashMap<String, u32> = HashMap::new();
        let mut material = MaterialBreakdown::default();

        for a in allocations {
            *per_day.entry(a.scheduled_date).or_insert(0) += 1;
            *per_mold_day
                .entry((a.scheduled_date, a.mold_id.clone()))
                .or_insert(0) += 1;
            *per_mold.entry(a.mold_id.clone()).or_insert(0) += 1;
            match a.material_prefix {
                MaterialPrefix::Cf => material.cf += 1,
                MaterialPrefix::Fg => material.fg += 1,
                MaterialPrefix::Unknown => material.unknown += 1,
            }
        }

        let violations =
            self.check_invariants(allocations, calendar, index, budget, &per_day, &per_mold_day);

        let daily_breakdown = per_day
            .iter()
            .filter(|(date, _)| calendar.contains(**date))
            .map(|(date, count)| DailyCount {
                date: *date,
                count: *count,
                ceiling: budget.daily_order_ceiling,
            })
            .collect();

        let work_days = calendar.len();
        let mold_breakdown = index
            .active_molds()
            .map(|m| {
                let allocated = per_mold.get(&m.mold_id).copied().unwrap_or(0);
                let capacity = budget.per_mold_daily_ceiling(m) * work_days as u32;
                let utilization_pct = if capacity == 0 {
                    0.0
                } else {
                    allocated as f64 / capacity as f64 * 100.0
                };
                MoldUsage {
                    mold_id: m.mold_id.clone(),
                    mold_name: m.display_name.clone(),
                    allocated,
                    capacity,
                    utilization_pct,
                }
            })
            .collect();

        let theoretical_max = work_days as u64 * budget.daily_order_ceiling as u64;

        info!(
            total_processed,
            total_scheduled,
            total_unscheduled,
            success_rate = %format!("{:.1}", success_rate),
            theoretical_max,
            cf = material.cf,
            fg = material.fg,
            unknown = material.unknown,
            "排产运行统计"
        );

        RunMetrics {
            total_processed,
            total_scheduled,
            total_unscheduled,
            success_rate,
            work_days,
            daily_order_ceiling: budget.daily_order_ceiling,
            theoretical_max,
            daily_breakdown,
            mold_breakdown,
            material_breakdown: material,
            invariant_violations: violations,
        }
    }

    fn check_invariants(
        &self,
        allocations: &[Allocation],
        calendar: &WorkCalendar,
        index: &CompatibilityIndex<'_>,
        budget: &CapacityBudget,
        per_day: &BTreeMap<NaiveDate, u32>,
        per_mold_day: &BTreeMap<(NaiveDate, String), u32>,
    ) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for (date, count) in per_day {
            if *count > budget.daily_order_ceiling {
                violations.push(InvariantViolation::DailyCeilingExceeded {
                    date: *date,
                    count: *count,
                    ceiling: budget.daily_order_ceiling,
                });
            }
        }

        let molds: HashMap<&str, &Mold> = index
            .active_molds()
            .map(|m| (m.mold_id.as_str(), m))
            .collect();

        for ((date, mold_id), count) in per_mold_day {
            if let Some(mold) = molds.get(mold_id.as_str()) {
                let ceiling = budget.per_mold_daily_ceiling(mold);
                if *count > ceiling {
                    violations.push(InvariantViolation::MoldCeilingExceeded {
                        date: *date,
                        mold_id: mold_id.clone(),
                        count: *count,
                        ceiling,
                    });
                }
            }
        }

        for a in allocations {
            if !calendar.contains(a.scheduled_date) {
                violations.push(InvariantViolation::DateOutsideWindow {
                    order_id: a.order_id.clone(),
                    date: a.scheduled_date,
                });
            }
            if !calendar.is_permitted(a.scheduled_date) {
                violations.push(InvariantViolation::ForbiddenWeekday {
                    order_id: a.order_id.clone(),
                    date: a.scheduled_date,
                });
            }
            match molds.get(a.mold_id.as_str()) {
                None => violations.push(InvariantViolation::UnknownMold {
                    order_id: a.order_id.clone(),
                    mold_id: a.mold_id.clone(),
                }),
                Some(mold) if !advertises(mold, &a.stock_model_id) => {
                    violations.push(InvariantViolation::IncompatibleAssignment {
                        order_id: a.order_id.clone(),
                        mold_id: a.mold_id.clone(),
                        stock_model_id: a.stock_model_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for v in &violations {
            error!(violation = %v, "排产结果违反内部不变量");
        }

        violations
    }
}

/// 直接对照模具声明的款式复核兼容性 (不经索引)
///
/// Mesa 系列订单要求模具声明 mesa_universal；其他订单要求归一化后严格相等
fn advertises(mold: &Mold, stock_model_id: &str) -> bool {
    let normalized = normalize_stock_model(stock_model_id);
    let wanted = if is_mesa_universal(&normalized) {
        MESA_UNIVERSAL
    } else {
        normalized.as_str()
    };

    mold.compatible_stock_models
        .iter()
        .any(|s| normalize_stock_model(s) == wanted)
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CapacitySource, UnscheduledReason};
    use crate::engine::calendar::CalendarGenerator;
    use chrono::Weekday;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn calendar() -> WorkCalendar {
        CalendarGenerator::new()
            .generate(monday(), 2, &[Weekday::Mon, Weekday::Tue])
            .unwrap()
    }

    fn alloc(order_id: &str, mold_id: &str, model: &str, date: NaiveDate) -> Allocation {
        Allocation {
            order_id: order_id.to_string(),
            mold_id: mold_id.to_string(),
            mold_name: mold_id.to_string(),
            scheduled_date: date,
            stock_model_id: model.to_string(),
            material_prefix: MaterialPrefix::from_normalized_model(model),
            heavy_fill: false,
            lop_adjustment: false,
            customer: "Unknown".to_string(),
            due_date: None,
        }
    }

    #[test]
    fn test_metrics_for_clean_run() {
        let molds = vec![
            Mold::new("M1", &["cf_classic"], 2),
            Mold::new("M2", &["fg_hunter"], 1),
        ];
        let index = CompatibilityIndex::build(&molds);
        let budget = CapacityBudget::new(3, CapacitySource::Explicit);
        let allocations = vec![
            alloc("O1", "M1", "cf_classic", monday()),
            alloc("O2", "M2", "fg_hunter", monday()),
        ];
        let unscheduled = vec![UnscheduledOrder {
            order_id: "O3".to_string(),
            stock_model_id: "cf_classic".to_string(),
            due_date: None,
            priority_score: 0,
            reason: UnscheduledReason::NoCapacityInWindow,
        }];

        let m = RunReporter::new().report(&allocations, &unscheduled, &calendar(), &index, &budget);

        assert_eq!(m.total_processed, 3);
        assert_eq!(m.total_scheduled, 2);
        assert_eq!(m.total_unscheduled, 1);
        assert!((m.success_rate - 66.666).abs() < 0.01);
        assert_eq!(m.theoretical_max, 6);
        assert_eq!(m.daily_breakdown.len(), 2);
        assert_eq!(m.daily_breakdown[0].count, 2);
        assert_eq!(m.daily_breakdown[1].count, 0);
        assert_eq!(m.material_breakdown, MaterialBreakdown { cf: 1, fg: 1, unknown: 0 });
        assert_eq!(m.mold_breakdown[0].capacity, 4);
        assert!(!m.has_violations());
    }

    #[test]
    fn test_empty_run_has_zero_success_rate() {
        let molds: Vec<Mold> = Vec::new();
        let index = CompatibilityIndex::build(&molds);
        let budget = CapacityBudget::new(3, CapacitySource::Explicit);
        let m = RunReporter::new().report(&[], &[], &calendar(), &index, &budget);
        assert_eq!(m.total_processed, 0);
        assert_eq!(m.success_rate, 0.0);
    }

    #[test]
    fn test_detects_violations() {
        let molds = vec![Mold::new("M1", &["cf_classic"], 1)];
        let index = CompatibilityIndex::build(&molds);
        let budget = CapacityBudget::new(1, CapacitySource::Explicit);
        let friday = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();
        let allocations = vec![
            alloc("O1", "M1", "cf_classic", monday()),
            alloc("O2", "M1", "cf_classic", monday()),
            alloc("O3", "M1", "fg_hunter", monday().succ_opt().unwrap()),
            alloc("O4", "GHOST", "cf_classic", friday),
        ];

        let m = RunReporter::new().report(&allocations, &[], &calendar(), &index, &budget);
        let v = &m.invariant_violations;

        assert!(v.contains(&InvariantViolation::DailyCeilingExceeded {
            date: monday(),
            count: 2,
            ceiling: 1
        }));
        assert!(v.contains(&InvariantViolation::MoldCeilingExceeded {
            date: monday(),
            mold_id: "M1".to_string(),
            count: 2,
            ceiling: 1
        }));
        assert!(v.contains(&InvariantViolation::IncompatibleAssignment {
            order_id: "O3".to_string(),
            mold_id: "M1".to_string(),
            stock_model_id: "fg_hunter".to_string()
        }));
        assert!(v.contains(&InvariantViolation::DateOutsideWindow {
            order_id: "O4".to_string(),
            date: friday
        }));
        assert!(v.contains(&InvariantViolation::ForbiddenWeekday {
            order_id: "O4".to_string(),
            date: friday
        }));
        assert!(v.contains(&InvariantViolation::UnknownMold {
            order_id: "O4".to_string(),
            mold_id: "GHOST".to_string()
        }));
        // 窗口外日期不进入每日统计
        assert_eq!(m.daily_breakdown.len(), 2);
    }

    #[test]
    fn test_compatibility_checked_against_mold_declaration() {
        println!("\n=== 测试：兼容性按模具声明款式直接复核 ===");

        let molds = vec![
            Mold::new("M1", &["CF-Classic"], 3),
            Mold::new("M2", &["Mesa Universal"], 3),
        ];
        let index = CompatibilityIndex::build(&molds);
        let budget = CapacityBudget::new(10, CapacitySource::Explicit);
        let allocations = vec![
            alloc("O1", "M1", "cf classic", monday()),
            alloc("O2", "M2", "mesa_universal_lh", monday()),
            alloc("O3", "M1", "Mesa Universal", monday()),
            alloc("O4", "M2", "cf_classic", monday()),
            alloc("O5", "M1", "cf_classic_lh", monday()),
        ];

        let m = RunReporter::new().report(&allocations, &[], &calendar(), &index, &budget);
        let flagged: Vec<&str> = m
            .invariant_violations
            .iter()
            .filter_map(|v| match v {
                InvariantViolation::IncompatibleAssignment { order_id, .. } => {
                    Some(order_id.as_str())
                }
                _ => None,
            })
            .collect();

        assert_eq!(flagged, vec!["O3", "O4", "O5"]);
        assert!(advertises(&molds[0], "CF CLASSIC"));
        assert!(advertises(&molds[1], "Mesa-Universal"));
        assert!(!advertises(&molds[0], "mesa_universal"));
    }
}
