// ==========================================
// Layup 排产系统 - 命令行入口
// ==========================================
// 用法: layup-scheduler [db_path]
// 输出: stdout 打印 JSON 结果，日志写 stderr
// ==========================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use layup_scheduler::config::{ConfigManager, ScheduleConfigReader};
use layup_scheduler::db::{init_schema, open_sqlite_connection};
use layup_scheduler::{logging, ApiError, ScheduleApi, ScheduleSources};

/// 解析数据库路径: 命令行参数 > LAYUP_SCHEDULER_DB_PATH > 用户数据目录
fn resolve_db_path() -> String {
    if let Some(arg) = std::env::args().nth(1) {
        let trimmed = arg.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Ok(path) = std::env::var("LAYUP_SCHEDULER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./layup_scheduler.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("layup-scheduler");
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("layup_scheduler.db");
    }
    path.to_string_lossy().to_string()
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let db_path = resolve_db_path();
    tracing::info!(
        app = layup_scheduler::APP_NAME,
        version = layup_scheduler::VERSION,
        db_path = %db_path,
        "使用数据库"
    );

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())?.load_run_config()?;
    tracing::info!(
        run_length_days = config.run_length_days,
        permitted_weekdays = ?config.permitted_weekdays,
        daily_order_ceiling = ?config.daily_order_ceiling,
        department = %config.department,
        "运行配置已加载"
    );

    let api = ScheduleApi::new(ScheduleSources::sqlite(conn));
    match api.run_schedule(&config) {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(true)
        }
        Err(ApiError::CompatibilityValidationFailed { invalid_orders }) => {
            let body = serde_json::json!({
                "error": "compatibility_validation_failed",
                "invalidOrders": invalid_orders,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(false)
        }
        Err(ApiError::PersistenceFailed { result, message }) => {
            let body = serde_json::json!({
                "error": "persistence_failed",
                "message": message,
                "result": result,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "排产运行失败");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
