// ==========================================
// Layup 排产系统 - 模具注册表仓储
// ==========================================
// 职责: 管理 molds 表
// 红线: 只返回启用模具，保持注册顺序 (兼容性索引依赖该顺序)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::mold::Mold;
use crate::engine::sources::MoldRegistry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// MoldRepository - 模具仓储
// ==========================================
pub struct MoldRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MoldRepository {
    /// 创建新的 MoldRepository 实例
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

    /// 注册模具
    pub fn insert(&self, mold: &Mold) -> RepositoryResult<()> {
        let stock_models = serde_json::to_string(&mold.compatible_stock_models)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO molds (mold_id, model_name, stock_models, multiplier, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                mold.mold_id,
                mold.display_name,
                stock_models,
                mold.daily_multiplier,
                if mold.active { 1 } else { 0 },
            ],
        )?;
        Ok(())
    }

    /// 启停模具
    pub fn set_active(&self, mold_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            "UPDATE molds SET is_active = ?1 WHERE mold_id = ?2",
            params![if active { 1 } else { 0 }, mold_id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Mold".to_string(),
                id: mold_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询启用模具 (按注册顺序)
    pub fn list_active(&self) -> RepositoryResult<Vec<Mold>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT mold_id, model_name, stock_models, multiplier, is_active
            FROM molds
            WHERE is_active = 1
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut molds = Vec::with_capacity(rows.len());
        for (mold_id, model_name, stock_models, multiplier, is_active) in rows {
            let compatible_stock_models: Vec<String> = match stock_models.as_deref() {
                None | Some("") => Vec::new(),
                Some(raw) => serde_json::from_str(raw).map_err(|e| {
                    RepositoryError::FieldValueError {
                        field: "stock_models".to_string(),
                        message: format!("mold_id={}: {}", mold_id, e),
                    }
                })?,
            };
            if compatible_stock_models.is_empty() {
                warn!(mold_id = %mold_id, "模具未声明任何款式");
            }

            molds.push(Mold {
                mold_id,
                display_name: model_name,
                compatible_stock_models,
                daily_multiplier: multiplier.clamp(1, u32::MAX as i64) as u32,
                active: is_active == 1,
            });
        }
        Ok(molds)
    }
}

impl MoldRegistry for MoldRepository {
    fn fetch_active_molds(&self) -> RepositoryResult<Vec<Mold>> {
        self.list_active()
    }
}
