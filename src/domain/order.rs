// ==========================================
// Layup 排产系统 - 订单领域模型
// ==========================================
// 红线: 订单在一次排产中只读，排产器不修改订单
// ==========================================

use crate::domain::types::OrderSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 缺失交期时的兜底日期 (最低紧急度)
pub fn far_future_due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or(NaiveDate::MAX)
}

// ==========================================
// OrderFeatures - 订单特征
// ==========================================
// 上游特征包是不透明的，排产只读取两个布尔值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFeatures {
    pub heavy_fill: bool,     // 加重填充
    pub lop_adjustment: bool, // LOP 调整
}

impl OrderFeatures {
    /// 从上游 JSON 特征包解析
    ///
    /// 兼容布尔值与字符串 "true" 两种写法，其余字段忽略。
    pub fn from_json(value: &serde_json::Value) -> Self {
        let flag = |key: &str| match value.get(key) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        };

        Self {
            heavy_fill: flag("heavyFill"),
            lop_adjustment: flag("lopAdjustment"),
        }
    }
}

// ==========================================
// Order - 待排订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,                 // 订单ID (唯一)
    pub stock_model_id: Option<String>,   // 款式ID (可能缺失)
    pub due_date: Option<NaiveDate>,      // 交期 (缺失视为远期)
    pub order_date: Option<NaiveDate>,    // 下单日期
    pub source: OrderSource,              // 来源
    pub base_priority_score: Option<i64>, // 外部基础优先分
    pub customer: Option<String>,         // 客户名称
    pub features: OrderFeatures,          // 特征
}

impl Order {
    /// 创建最小订单 (其余字段取默认值)
    pub fn new(order_id: impl Into<String>, stock_model_id: Option<&str>) -> Self {
        Self {
            order_id: order_id.into(),
            stock_model_id: stock_model_id.map(|s| s.to_string()),
            due_date: None,
            order_date: None,
            source: OrderSource::Regular,
            base_priority_score: None,
            customer: None,
            features: OrderFeatures::default(),
        }
    }

    /// 款式ID，缺失时返回 "unknown"
    pub fn stock_model_or_unknown(&self) -> &str {
        match self.stock_model_id.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => "unknown",
        }
    }

    /// 有效交期 (缺失时为 2099-12-31)
    pub fn effective_due_date(&self) -> NaiveDate {
        self.due_date.unwrap_or_else(far_future_due_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_features_from_json() {
        let f = OrderFeatures::from_json(&json!({"heavyFill": true, "lopAdjustment": "true"}));
        assert!(f.heavy_fill);
        assert!(f.lop_adjustment);

        let f = OrderFeatures::from_json(&json!({"heavyFill": "yes", "other": 1}));
        assert!(!f.heavy_fill);
        assert!(!f.lop_adjustment);

        let f = OrderFeatures::from_json(&json!("not an object"));
        assert_eq!(f, OrderFeatures::default());
    }

    #[test]
    fn test_effective_due_date_fallback() {
        let order = Order::new("O1", Some("cf_classic"));
        assert_eq!(
            order.effective_due_date(),
            NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_stock_model_or_unknown() {
        assert_eq!(Order::new("O1", None).stock_model_or_unknown(), "unknown");
        assert_eq!(Order::new("O2", Some("  ")).stock_model_or_unknown(), "unknown");
        assert_eq!(Order::new("O3", Some("cf_classic")).stock_model_or_unknown(), "cf_classic");
    }
}
