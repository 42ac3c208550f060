// ==========================================
// Layup 排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::run_config::{
    ConfigError, DEFAULT_DEPARTMENT, DEFAULT_PERMITTED_WEEKDAYS, DEFAULT_RUN_LENGTH_DAYS,
};
use crate::config::schedule_config_trait::ScheduleConfigReader;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const SCHEDULE_DAYS: &str = "layup.schedule_days";
    pub const WORK_DAYS: &str = "layup.work_days";
    pub const DAILY_CAPACITY: &str = "layup.daily_capacity";
    pub const DEPARTMENT: &str = "layup.department";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    fn parse_u32(key: &str, raw: &str) -> Result<u32, ConfigError> {
        raw.parse::<u32>().map_err(|e| ConfigError::MalformedValue {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

impl ScheduleConfigReader for ConfigManager {
    fn get_run_length_days(&self) -> Result<u32, Box<dyn Error>> {
        match self.get_config_value(config_keys::SCHEDULE_DAYS)? {
            Some(v) => Ok(Self::parse_u32(config_keys::SCHEDULE_DAYS, &v)?),
            None => Ok(DEFAULT_RUN_LENGTH_DAYS),
        }
    }

    /// 配置格式为 JSON 数组: [1, 2, 3, 4]
    fn get_permitted_weekdays(&self) -> Result<Vec<u32>, Box<dyn Error>> {
        match self.get_config_value(config_keys::WORK_DAYS)? {
            Some(v) => {
                let days: Vec<u32> =
                    serde_json::from_str(&v).map_err(|e| ConfigError::MalformedValue {
                        key: config_keys::WORK_DAYS.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(days)
            }
            None => Ok(DEFAULT_PERMITTED_WEEKDAYS.to_vec()),
        }
    }

    fn get_daily_capacity(&self) -> Result<Option<u32>, Box<dyn Error>> {
        match self.get_config_value(config_keys::DAILY_CAPACITY)? {
            Some(v) => Ok(Some(Self::parse_u32(config_keys::DAILY_CAPACITY, &v)?)),
            None => Ok(None),
        }
    }

    fn get_department(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::DEPARTMENT)?
            .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_missing() {
        let cm = manager();
        let cfg = cm.load_run_config().unwrap();
        assert_eq!(cfg.run_length_days, 10);
        assert_eq!(cfg.permitted_weekdays, vec![1, 2, 3, 4]);
        assert_eq!(cfg.daily_order_ceiling, None);
        assert_eq!(cfg.department, "Layup");
    }

    #[test]
    fn test_overrides() {
        let cm = manager();
        cm.set_global_config_value(config_keys::SCHEDULE_DAYS, "5").unwrap();
        cm.set_global_config_value(config_keys::WORK_DAYS, "[1,2,3,4,5]").unwrap();
        cm.set_global_config_value(config_keys::DAILY_CAPACITY, "12").unwrap();

        let cfg = cm.load_run_config().unwrap();
        assert_eq!(cfg.run_length_days, 5);
        assert_eq!(cfg.permitted_weekdays, vec![1, 2, 3, 4, 5]);
        assert_eq!(cfg.daily_order_ceiling, Some(12));
    }

    #[test]
    fn test_malformed_value() {
        let cm = manager();
        cm.set_global_config_value(config_keys::WORK_DAYS, "mon,tue").unwrap();
        assert!(cm.get_permitted_weekdays().is_err());
    }
}
