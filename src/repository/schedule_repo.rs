// ==========================================
// Layup 排产系统 - 排产结果仓储
// ==========================================
// 职责: 管理 layup_schedule 表
// 红线: 窗口替换必须单事务完成 (先删窗口内旧行，再插入新行)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::allocation::{EmployeeAssignment, ScheduleRow};
use crate::engine::sources::{ScheduleStore, WindowReplaceStats};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的 ScheduleRepository 实例
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

    /// 替换 [start, end] 窗口内的排产行
    ///
    /// # 返回
    /// 删除行数 + 写入行数
    pub fn replace_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        rows: &[ScheduleRow],
    ) -> RepositoryResult<WindowReplaceStats> {
        // 序列化放在事务外，失败时不触碰数据库
        let payloads = rows
            .iter()
            .map(|r| serde_json::to_string(&r.employee_assignments))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let rows_deleted = tx.execute(
            "DELETE FROM layup_schedule WHERE scheduled_date >= ?1 AND scheduled_date <= ?2",
            params![
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string()
            ],
        )?;

        let now = chrono::Utc::now().to_rfc3339();
        for (row, assignments) in rows.iter().zip(payloads.iter()) {
            tx.execute(
                r#"
                INSERT INTO layup_schedule (
                    order_id, scheduled_date, mold_id, employee_assignments,
                    is_override, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                "#,
                params![
                    row.order_id,
                    row.scheduled_date.format("%Y-%m-%d").to_string(),
                    row.mold_id,
                    assignments,
                    if row.is_override { 1 } else { 0 },
                    now,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            window_start = %start,
            window_end = %end,
            rows_deleted,
            rows_written = rows.len(),
            "排产窗口已替换"
        );

        Ok(WindowReplaceStats {
            rows_deleted,
            rows_written: rows.len(),
        })
    }

    /// 查询 [start, end] 窗口内的排产行 (按日期、写入顺序)
    pub fn find_by_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT order_id, scheduled_date, mold_id, employee_assignments, is_override
            FROM layup_schedule
            WHERE scheduled_date >= ?1 AND scheduled_date <= ?2
            ORDER BY scheduled_date ASC, id ASC
            "#,
        )?;

        let raw = stmt
            .query_map(
                params![
                    start.format("%Y-%m-%d").to_string(),
                    end.format("%Y-%m-%d").to_string()
                ],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(raw.len());
        for (order_id, date, mold_id, assignments, is_override) in raw {
            let scheduled_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "scheduled_date".to_string(),
                    message: format!("{}: {}", date, e),
                }
            })?;
            let employee_assignments: Vec<EmployeeAssignment> =
                serde_json::from_str(&assignments)?;
            rows.push(ScheduleRow {
                order_id,
                scheduled_date,
                mold_id,
                employee_assignments,
                is_override: is_override == 1,
            });
        }

        debug!(window_start = %start, window_end = %end, rows = rows.len(), "查询排产窗口");
        Ok(rows)
    }

    /// 全表行数
    pub fn count_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM layup_schedule", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl ScheduleStore for ScheduleRepository {
    fn replace_schedule_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        rows: &[ScheduleRow],
    ) -> RepositoryResult<WindowReplaceStats> {
        self.replace_window(start, end, rows)
    }
}
