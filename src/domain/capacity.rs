// ==========================================
// Layup 排产系统 - 产能预算领域模型
// ==========================================
// 红线: 产能预算在一次排产内不可变
// ==========================================

use crate::domain::mold::Mold;
use crate::domain::types::CapacitySource;
use serde::{Deserialize, Serialize};

/// 日产能兜底常量 (员工数据缺失或汇总为 0 时)
pub const DEFAULT_DAILY_ORDER_CEILING: u32 = 21;

// ==========================================
// CapacityBudget - 产能预算
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityBudget {
    pub daily_order_ceiling: u32,  // 每日订单上限
    pub source: CapacitySource,    // 上限来源
}

impl CapacityBudget {
    pub fn new(daily_order_ceiling: u32, source: CapacitySource) -> Self {
        Self {
            daily_order_ceiling,
            source,
        }
    }

    /// 单模具单日上限
    pub fn per_mold_daily_ceiling(&self, mold: &Mold) -> u32 {
        mold.per_day_ceiling()
    }
}

// ==========================================
// Trait: DailyCapacityCheck
// ==========================================
// 用途: Allocator 约束检查接口
pub trait DailyCapacityCheck {
    /// 当日是否已满
    fn is_day_full(&self, used: u32) -> bool;

    /// 当日剩余名额
    fn remaining_for_day(&self, used: u32) -> u32;
}

impl DailyCapacityCheck for CapacityBudget {
    fn is_day_full(&self, used: u32) -> bool {
        used >= self.daily_order_ceiling
    }

    fn remaining_for_day(&self, used: u32) -> u32 {
        self.daily_order_ceiling.saturating_sub(used)
    }
}
