// ==========================================
// Layup 排产系统 - 排产入口 API
// ==========================================
// 职责: 唯一入口 run_schedule
//   读取数据源 -> 引擎计算 -> 窗口替换落库
// 落库策略:
// - 零分配: 跳过落库，窗口内旧数据保持不变
// - 落库失败: 返回 PersistenceFailed，并携带已计算的 RunResult
// - 仅在落库成功 (或无需落库) 时返回 Ok
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::RunConfig;
use crate::domain::allocation::{EmployeeAssignment, ScheduleRow};
use crate::domain::mold::Employee;
use crate::engine::orchestrator::{RunResult, ScheduleOrchestrator};
use crate::engine::sources::{BacklogSource, EmployeeDirectory, MoldRegistry, ScheduleStore};
use crate::repository::{
    BacklogRepository, EmployeeRepository, MoldRepository, ScheduleRepository,
};

// ==========================================
// ScheduleSources - 协作方集合
// ==========================================

/// 排产所需的全部协作方
///
/// 聚合数据来源与落库边界，简化依赖注入；
/// 测试时可整体替换为内存实现。
#[derive(Clone)]
pub struct ScheduleSources {
    pub backlog: Arc<dyn BacklogSource>,
    pub molds: Arc<dyn MoldRegistry>,
    pub employees: Arc<dyn EmployeeDirectory>,
    pub store: Arc<dyn ScheduleStore>,
}

impl ScheduleSources {
    /// 基于同一 SQLite 连接构建全部仓储
    pub fn sqlite(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            backlog: Arc::new(BacklogRepository::from_connection(conn.clone())),
            molds: Arc::new(MoldRepository::from_connection(conn.clone())),
            employees: Arc::new(EmployeeRepository::from_connection(conn.clone())),
            store: Arc::new(ScheduleRepository::from_connection(conn)),
        }
    }
}

// ==========================================
// 返回结构
// ==========================================

/// 落库状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistenceStatus {
    Persisted {
        rows_deleted: usize,
        rows_written: usize,
    },
    Skipped, // 零分配
}

/// 一次成功运行的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub result: RunResult,
    pub persistence: PersistenceStatus,
}

// ==========================================
// ScheduleApi - 排产入口
// ==========================================
pub struct ScheduleApi {
    sources: ScheduleSources,
    orchestrator: ScheduleOrchestrator,
}

impl ScheduleApi {
    /// 创建新的 ScheduleApi 实例
    pub fn new(sources: ScheduleSources) -> Self {
        Self {
            sources,
            orchestrator: ScheduleOrchestrator::new(),
        }
    }

    /// 执行排产 (基准日 = 本地今天)
    pub fn run_schedule(&self, config: &RunConfig) -> ApiResult<ScheduleOutcome> {
        self.run_schedule_at(config, chrono::Local::now().date_naive())
    }

    /// 执行排产 (指定基准日)
    ///
    /// # 参数
    /// - `config`: 运行配置
    /// - `today`: 计算基准日 (交期紧急度与默认起始日)
    ///
    /// # 返回
    /// - Ok(ScheduleOutcome): 计算完成且已落库 (或无需落库)
    /// - Err(Configuration / CompatibilityValidationFailed): 无副作用
    /// - Err(PersistenceFailed): 计算完成但未落库，结果在错误中
    #[instrument(skip_all, fields(today = %today, run_length_days = config.run_length_days))]
    pub fn run_schedule_at(
        &self,
        config: &RunConfig,
        today: NaiveDate,
    ) -> ApiResult<ScheduleOutcome> {
        config.validate()?;

        // ==========================================
        // 读取数据快照
        // ==========================================
        let backlog = self.sources.backlog.fetch_backlog()?;
        let molds = self.sources.molds.fetch_active_molds()?;
        let employees = self.fetch_employees(&config.department);

        info!(
            backlog = backlog.len(),
            molds = molds.len(),
            employees = ?employees.as_ref().map(|e| e.len()),
            "数据快照读取完成"
        );

        // ==========================================
        // 引擎计算
        // ==========================================
        let result = self.orchestrator.execute(
            config,
            backlog,
            &molds,
            employees.as_deref(),
            today,
        )?;

        // ==========================================
        // 落库
        // ==========================================
        if result.allocations.is_empty() {
            info!(run_id = %result.run_id, "无分配结果，跳过落库");
            return Ok(ScheduleOutcome {
                result,
                persistence: PersistenceStatus::Skipped,
            });
        }

        let snapshot: Vec<EmployeeAssignment> = employees
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(EmployeeAssignment::from)
            .collect();
        let rows: Vec<ScheduleRow> = result
            .allocations
            .iter()
            .map(|a| ScheduleRow::from_allocation(a, &snapshot))
            .collect();

        match self
            .sources
            .store
            .replace_schedule_window(result.window_start, result.window_end, &rows)
        {
            Ok(stats) => Ok(ScheduleOutcome {
                result,
                persistence: PersistenceStatus::Persisted {
                    rows_deleted: stats.rows_deleted,
                    rows_written: stats.rows_written,
                },
            }),
            Err(e) => {
                error!(
                    run_id = %result.run_id,
                    window_start = %result.window_start,
                    window_end = %result.window_end,
                    error = %e,
                    "排产结果落库失败"
                );
                Err(ApiError::PersistenceFailed {
                    message: e.to_string(),
                    result: Box::new(result),
                })
            }
        }
    }

    /// 读取在岗员工；失败时返回 None (产能走兜底)
    fn fetch_employees(&self, department: &str) -> Option<Vec<Employee>> {
        match self.sources.employees.fetch_active_employees(department) {
            Ok(list) => Some(list),
            Err(e) => {
                warn!(department = department, error = %e, "员工产能数据不可用");
                None
            }
        }
    }
}
