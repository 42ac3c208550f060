// ==========================================
// Layup 排产系统 - 积压订单仓储
// ==========================================
// 职责: 读取 layup_backlog 表，归一化为严格的 Order 结构
// 红线: Repository 不含业务逻辑 (不评分、不过滤不兼容订单)
// ==========================================
// 入口归一:
// - 同一 order_id 多次出现 -> 保留首条
// - 日期取前 10 位按 YYYY-MM-DD 解析 (兼容带时间的写法)
// - source 宽松解析 (p1_purchase_order 等)
// - features JSON 无法解析 -> 视为空特征并告警
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::order::{Order, OrderFeatures};
use crate::domain::types::OrderSource;
use crate::engine::sources::BacklogSource;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// layup_backlog 原始行
struct BacklogRow {
    order_id: String,
    stock_model_id: Option<String>,
    due_date: Option<String>,
    order_date: Option<String>,
    source: String,
    priority_score: Option<i64>,
    customer: Option<String>,
    features: Option<String>,
}

// ==========================================
// BacklogRepository - 积压订单仓储
// ==========================================
pub struct BacklogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BacklogRepository {
    /// 创建新的 BacklogRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一条积压订单 (上游队列同步 / 测试造数)
    pub fn insert(&self, order: &Order) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let features = serde_json::json!({
            "heavyFill": order.features.heavy_fill,
            "lopAdjustment": order.features.lop_adjustment,
        });
        conn.execute(
            r#"
            INSERT INTO layup_backlog (
                order_id, stock_model_id, due_date, order_date,
                source, priority_score, customer, features
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                order.order_id,
                order.stock_model_id,
                order.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                order.order_date.map(|d| d.format("%Y-%m-%d").to_string()),
                order.source.to_string(),
                order.base_priority_score,
                order.customer,
                features.to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 读取积压订单 (插入顺序，按 order_id 去重)
    pub fn list_backlog(&self) -> RepositoryResult<Vec<Order>> {
        let rows = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT order_id, stock_model_id, due_date, order_date,
                       source, priority_score, customer, features
                FROM layup_backlog
                ORDER BY id ASC
                "#,
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(BacklogRow {
                        order_id: row.get(0)?,
                        stock_model_id: row.get(1)?,
                        due_date: row.get(2)?,
                        order_date: row.get(3)?,
                        source: row.get(4)?,
                        priority_score: row.get(5)?,
                        customer: row.get(6)?,
                        features: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut seen = HashSet::new();
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            if !seen.insert(row.order_id.clone()) {
                debug!(order_id = %row.order_id, "重复订单已忽略");
                continue;
            }
            orders.push(Self::map_row(row)?);
        }
        Ok(orders)
    }

    fn map_row(row: BacklogRow) -> RepositoryResult<Order> {
        let due_date = parse_date_column("due_date", row.due_date.as_deref())?;
        let order_date = parse_date_column("order_date", row.order_date.as_deref())?;

        let features = match row.features.as_deref().map(str::trim) {
            None | Some("") => OrderFeatures::default(),
            Some(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(value) => OrderFeatures::from_json(&value),
                Err(e) => {
                    warn!(
                        order_id = %row.order_id,
                        error = %e,
                        "订单特征无法解析，按空特征处理"
                    );
                    OrderFeatures::default()
                }
            },
        };

        Ok(Order {
            order_id: row.order_id,
            stock_model_id: row.stock_model_id,
            due_date,
            order_date,
            source: OrderSource::parse_lenient(&row.source),
            base_priority_score: row.priority_score,
            customer: row.customer,
            features,
        })
    }
}

impl BacklogSource for BacklogRepository {
    fn fetch_backlog(&self) -> RepositoryResult<Vec<Order>> {
        self.list_backlog()
    }
}

/// 日期列解析: 空值 -> None，取前 10 位按 YYYY-MM-DD 解析
fn parse_date_column(field: &str, raw: Option<&str>) -> RepositoryResult<Option<NaiveDate>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(s) => s,
    };
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("{}: {}", raw, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn repo() -> BacklogRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        BacklogRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn raw_insert(repo: &BacklogRepository, order_id: &str, due: Option<&str>, source: &str, features: Option<&str>) {
        let conn = repo.get_conn().unwrap();
        conn.execute(
            "INSERT INTO layup_backlog (order_id, stock_model_id, due_date, source, features) VALUES (?1, 'cf_classic', ?2, ?3, ?4)",
            params![order_id, due, source, features],
        )
        .unwrap();
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let repo = repo();
        raw_insert(&repo, "O1", Some("2026-11-01"), "p1_purchase_order", None);
        raw_insert(&repo, "O2", None, "regular", None);
        raw_insert(&repo, "O1", Some("2026-12-01"), "regular", None);

        let orders = repo.fetch_backlog().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id, "O1");
        assert_eq!(orders[0].source, OrderSource::PurchaseOrder);
        assert_eq!(orders[0].due_date, NaiveDate::from_ymd_opt(2026, 11, 1));
        assert_eq!(orders[1].due_date, None);
    }

    #[test]
    fn test_parses_timestamps_and_features() {
        let repo = repo();
        raw_insert(
            &repo,
            "O1",
            Some("2026-11-01T08:00:00.000Z"),
            "production_order",
            Some(r#"{"heavyFill": "true", "lopAdjustment": false}"#),
        );
        raw_insert(&repo, "O2", Some(""), "regular", Some("not json"));

        let orders = repo.fetch_backlog().unwrap();
        assert_eq!(orders[0].due_date, NaiveDate::from_ymd_opt(2026, 11, 1));
        assert_eq!(orders[0].source, OrderSource::ProductionOrder);
        assert!(orders[0].features.heavy_fill);
        assert!(!orders[0].features.lop_adjustment);
        assert_eq!(orders[1].due_date, None);
        assert_eq!(orders[1].features, OrderFeatures::default());
    }

    #[test]
    fn test_bad_date_is_field_error() {
        let repo = repo();
        raw_insert(&repo, "O1", Some("11/01/2026"), "regular", None);
        let err = repo.fetch_backlog().unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "due_date"));
    }

    #[test]
    fn test_insert_round_trip() {
        let repo = repo();
        let mut order = Order::new("O9", Some("FG-Hunter"));
        order.customer = Some("Acme".to_string());
        order.features.lop_adjustment = true;
        order.base_priority_score = Some(7);
        repo.insert(&order).unwrap();

        let loaded = repo.fetch_backlog().unwrap();
        assert_eq!(loaded, vec![order]);
    }
}
