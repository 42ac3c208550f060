// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use layup_scheduler::db::{init_schema, open_sqlite_connection};
use layup_scheduler::domain::{Employee, Mold, Order, OrderSource};
use layup_scheduler::logging;
use layup_scheduler::repository::{BacklogRepository, EmployeeRepository, MoldRepository};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()))
}

/// 基准日: 2026-10-19 (周一)
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

/// 创建测试订单
pub fn order(
    order_id: &str,
    stock_model: &str,
    source: OrderSource,
    due_in_days: Option<i64>,
) -> Order {
    let mut o = Order::new(order_id, Some(stock_model));
    o.source = source;
    o.due_date = due_in_days.map(days_from_today);
    o
}

pub fn employee(employee_id: &str, rate: f64, hours: f64) -> Employee {
    Employee {
        employee_id: employee_id.to_string(),
        rate,
        hours,
        department: "Layup".to_string(),
        active: true,
    }
}

/// 写入积压订单
pub fn seed_orders(conn: &Arc<Mutex<Connection>>, orders: &[Order]) {
    let repo = BacklogRepository::from_connection(conn.clone());
    for o in orders {
        repo.insert(o).unwrap();
    }
}

/// 写入模具
pub fn seed_molds(conn: &Arc<Mutex<Connection>>, molds: &[Mold]) {
    let repo = MoldRepository::from_connection(conn.clone());
    for m in molds {
        repo.insert(m).unwrap();
    }
}

/// 写入员工产能设置
pub fn seed_employees(conn: &Arc<Mutex<Connection>>, employees: &[Employee]) {
    let repo = EmployeeRepository::from_connection(conn.clone());
    for e in employees {
        repo.insert(e).unwrap();
    }
}
