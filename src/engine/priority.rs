// ==========================================
// Layup 排产系统 - 订单优先级排序引擎
// ==========================================
// 职责: 为每个订单计算整数优先分，并给出积压订单的全序
// 输入: 订单列表 + 今天
// 输出: 排序后的 RankedOrder 列表（分高者优先）
// ==========================================
// 评分规则:
// - PO / 生产单: +1000
// - Mesa Universal 系列: +100
// - 交期紧急度 (互斥): 逾期 +500 / 0..=7天 +300 / 8..=14天 +200 / 15..=30天 +100
// - 外部基础分: +base_priority_score
// 排序: 分数降序 -> 交期升序 -> 输入顺序 (稳定排序)
// ==========================================

use crate::domain::order::Order;
use crate::engine::compatibility::{is_mesa_universal, normalize_stock_model};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

pub const PRODUCTION_SOURCE_BONUS: i64 = 1000;
pub const MESA_UNIVERSAL_BONUS: i64 = 100;

// ==========================================
// 交期紧急度 (Due Urgency)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueUrgency {
    Overdue,      // d < 0
    WithinWeek,   // 0 <= d <= 7
    WithinTwoWeeks, // 7 < d <= 14
    WithinMonth,  // 14 < d <= 30
    Later,        // d > 30 或无交期
}

impl DueUrgency {
    /// 由距交期天数判定
    pub fn from_days_until_due(days: i64) -> Self {
        if days < 0 {
            DueUrgency::Overdue
        } else if days <= 7 {
            DueUrgency::WithinWeek
        } else if days <= 14 {
            DueUrgency::WithinTwoWeeks
        } else if days <= 30 {
            DueUrgency::WithinMonth
        } else {
            DueUrgency::Later
        }
    }

    pub fn bonus(&self) -> i64 {
        match self {
            DueUrgency::Overdue => 500,
            DueUrgency::WithinWeek => 300,
            DueUrgency::WithinTwoWeeks => 200,
            DueUrgency::WithinMonth => 100,
            DueUrgency::Later => 0,
        }
    }
}

impl fmt::Display for DueUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueUrgency::Overdue => write!(f, "OVERDUE"),
            DueUrgency::WithinWeek => write!(f, "WITHIN_WEEK"),
            DueUrgency::WithinTwoWeeks => write!(f, "WITHIN_TWO_WEEKS"),
            DueUrgency::WithinMonth => write!(f, "WITHIN_MONTH"),
            DueUrgency::Later => write!(f, "LATER"),
        }
    }
}

// ==========================================
// RankedOrder - 已评分订单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedOrder {
    pub order: Order,
    pub score: i64,
    pub normalized_model: String,
    pub is_mesa_universal: bool,
    pub urgency: DueUrgency,
}

impl RankedOrder {
    /// 优先级原因（可解释性）
    pub fn reason(&self) -> String {
        let mut parts = Vec::new();
        if self.order.source.is_production_source() {
            parts.push(format!("{}(+{})", self.order.source, PRODUCTION_SOURCE_BONUS));
        }
        if self.is_mesa_universal {
            parts.push(format!("MESA_UNIVERSAL(+{})", MESA_UNIVERSAL_BONUS));
        }
        parts.push(format!("{}(+{})", self.urgency, self.urgency.bonus()));
        if let Some(base) = self.order.base_priority_score {
            parts.push(format!("BASE({:+})", base));
        }
        parts.join(", ")
    }
}

// ==========================================
// PriorityRanker - 订单优先级排序引擎
// ==========================================
pub struct PriorityRanker {
    // 无状态引擎,不需要注入依赖
}

impl PriorityRanker {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算单个订单的优先分
    ///
    /// # 返回
    /// RankedOrder（含分数、紧急度、归一化款式）
    pub fn score(&self, order: Order, today: NaiveDate) -> RankedOrder {
        let normalized_model = normalize_stock_model(order.stock_model_or_unknown());
        let is_mesa = is_mesa_universal(&normalized_model);

        let days_until_due = (order.effective_due_date() - today).num_days();
        let urgency = DueUrgency::from_days_until_due(days_until_due);

        let mut score: i64 = 0;
        if order.source.is_production_source() {
            score += PRODUCTION_SOURCE_BONUS;
        }
        if is_mesa {
            score += MESA_UNIVERSAL_BONUS;
        }
        score += urgency.bonus();
        score = score.saturating_add(order.base_priority_score.unwrap_or(0));

        RankedOrder {
            order,
            score,
            normalized_model,
            is_mesa_universal: is_mesa,
            urgency,
        }
    }

    /// 对积压订单评分并排序
    ///
    /// 排序键:
    /// 1) score 降序
    /// 2) 交期升序 (缺失视为 2099-12-31)
    /// 3) 输入顺序 (sort_by 为稳定排序)
    pub fn rank(&self, orders: Vec<Order>, today: NaiveDate) -> Vec<RankedOrder> {
        let mut ranked: Vec<RankedOrder> =
            orders.into_iter().map(|o| self.score(o, today)).collect();
        ranked.sort_by(|a, b| self.compare(a, b));

        for (i, r) in ranked.iter().take(10).enumerate() {
            debug!(
                rank = i + 1,
                order_id = %r.order.order_id,
                score = r.score,
                stock_model = %r.order.stock_model_or_unknown(),
                reason = %r.reason(),
                "优先级排序"
            );
        }

        ranked
    }

    fn compare(&self, a: &RankedOrder, b: &RankedOrder) -> Ordering {
        match b.score.cmp(&a.score) {
            Ordering::Equal => {}
            other => return other,
        }
        a.order.effective_due_date().cmp(&b.order.effective_due_date())
    }
}

impl Default for PriorityRanker {
    fn default() -> Self {
        Self::new()
    }
}
