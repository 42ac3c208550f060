// ==========================================
// Layup 排产系统 - 模具与员工领域模型
// ==========================================

use serde::{Deserialize, Serialize};

/// 单模具单日产能硬上限 (无论倍率配置多大)
pub const MOLD_DAILY_HARD_CAP: u32 = 3;

// ==========================================
// Mold - 模具
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mold {
    pub mold_id: String,                     // 模具ID
    pub display_name: String,                // 显示名称
    pub compatible_stock_models: Vec<String>, // 可生产款式 (原始写法)
    pub daily_multiplier: u32,               // 日倍率 (>= 1)
    pub active: bool,                        // 是否启用
}

impl Mold {
    pub fn new(
        mold_id: impl Into<String>,
        compatible_stock_models: &[&str],
        daily_multiplier: u32,
    ) -> Self {
        let mold_id = mold_id.into();
        Self {
            display_name: mold_id.clone(),
            mold_id,
            compatible_stock_models: compatible_stock_models.iter().map(|s| s.to_string()).collect(),
            daily_multiplier,
            active: true,
        }
    }

    /// 单日可接订单数: min(倍率, 3)，倍率为 0 按 1 处理
    pub fn per_day_ceiling(&self) -> u32 {
        self.daily_multiplier.max(1).min(MOLD_DAILY_HARD_CAP)
    }
}

// ==========================================
// Employee - 排产部门员工产能设置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String, // 员工编号
    pub rate: f64,           // 件/小时
    pub hours: f64,          // 小时/天
    pub department: String,  // 部门
    pub active: bool,        // 是否在岗
}

impl Employee {
    /// 日产能 (rate × hours)，原值参与汇总，仅非有限值按 0
    pub fn daily_output(&self) -> f64 {
        let v = self.rate * self.hours;
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}
