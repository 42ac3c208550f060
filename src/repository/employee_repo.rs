// ==========================================
// Layup 排产系统 - 员工产能设置仓储
// ==========================================
// 职责: 管理 employee_layup_settings 表
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::mold::Employee;
use crate::engine::sources::EmployeeDirectory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct EmployeeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeRepository {
    /// 创建新的 EmployeeRepository 实例
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

    pub fn insert(&self, employee: &Employee) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO employee_layup_settings (employee_id, rate, hours, department, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                employee.employee_id,
                employee.rate,
                employee.hours,
                employee.department,
                if employee.active { 1 } else { 0 },
            ],
        )?;
        Ok(())
    }

    /// 查询在岗员工 (部门匹配忽略大小写与首尾空白)
    pub fn list_active(&self, department: &str) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT employee_id, rate, hours, department, is_active
            FROM employee_layup_settings
            WHERE is_active = 1
              AND LOWER(TRIM(department)) = LOWER(TRIM(?1))
            ORDER BY id ASC
            "#,
        )?;

        let employees = stmt
            .query_map(params![department], |row| {
                Ok(Employee {
                    employee_id: row.get(0)?,
                    rate: row.get(1)?,
                    hours: row.get(2)?,
                    department: row.get(3)?,
                    active: row.get::<_, i64>(4)? == 1,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(employees)
    }
}

impl EmployeeDirectory for EmployeeRepository {
    fn fetch_active_employees(&self, department: &str) -> RepositoryResult<Vec<Employee>> {
        self.list_active(department)
    }
}
