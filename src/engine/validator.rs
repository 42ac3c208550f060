// ==========================================
// Layup 排产系统 - 兼容性预检闸门
// ==========================================
// 红线: 任一订单无兼容模具 -> 整批拒绝，不计算、不落库
// 这是系统中唯一的全有或全无闸门；
// 通过后因产能耗尽未排的订单属于正常结果。
// ==========================================

use crate::engine::compatibility::CompatibilityIndex;
use crate::engine::error::{IncompatibleOrder, ScheduleError, ScheduleResult};
use crate::engine::priority::RankedOrder;
use tracing::{error, info};

pub struct CompatibilityValidator {
    // 无状态引擎
}

impl CompatibilityValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 收集所有无兼容模具的订单（按排序顺序）
    pub fn find_incompatible(
        &self,
        ranked: &[RankedOrder],
        index: &CompatibilityIndex<'_>,
    ) -> Vec<IncompatibleOrder> {
        ranked
            .iter()
            .filter(|r| index.compatible_molds(r.order.stock_model_or_unknown()).is_empty())
            .map(|r| IncompatibleOrder {
                order_id: r.order.order_id.clone(),
                stock_model_id: r.order.stock_model_or_unknown().to_string(),
            })
            .collect()
    }

    /// 预检
    ///
    /// # 返回
    /// - Ok(()): 全部订单均有兼容模具
    /// - Err(CompatibilityValidation): 完整的问题订单清单
    pub fn validate(
        &self,
        ranked: &[RankedOrder],
        index: &CompatibilityIndex<'_>,
    ) -> ScheduleResult<()> {
        let invalid_orders = self.find_incompatible(ranked, index);

        if invalid_orders.is_empty() {
            info!(orders = ranked.len(), "兼容性预检通过");
            return Ok(());
        }

        for item in &invalid_orders {
            error!(
                order_id = %item.order_id,
                stock_model_id = %item.stock_model_id,
                "订单无兼容模具，排产被拒绝"
            );
        }
        error!(
            invalid_count = invalid_orders.len(),
            total = ranked.len(),
            "兼容性预检失败，请先修正模具配置"
        );

        Err(ScheduleError::CompatibilityValidation { invalid_orders })
    }
}

impl Default for CompatibilityValidator {
    fn default() -> Self {
        Self::new()
    }
}
