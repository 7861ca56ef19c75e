//! 批量任务处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量设计任务的调度和统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：初始化日志、输出启动信息
//! 2. **批量加载**：扫描并加载所有待处理的任务（`Vec<DesignJob>`）
//! 3. **逐个处理**：同一时间只提交一个任务，避免给第三方服务造成压力
//! 4. **全局统计**：汇总所有任务的处理结果
//!
//! 单个任务失败不会中断后续任务。

use std::path::Path;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{load_all_toml_files, load_toml_to_design_job, DesignJob};
use crate::orchestrator::designer::Designer;
use crate::orchestrator::job_processor;
use crate::utils::logging;
use crate::workflow::JobCtx;

/// 应用主结构
pub struct App {
    config: Config,
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        logging::init(&config.log_level, config.log_file.as_deref())?;
        logging::log_startup(&config);
        Ok(Self { config })
    }

    /// 运行应用主逻辑
    ///
    /// `job_path` 为单个任务文件；为空时扫描 `config.job_folder`
    pub async fn run(&self, job_path: Option<&Path>) -> Result<ProcessingStats> {
        let jobs = self.load_jobs(job_path).await?;

        if jobs.is_empty() {
            warn!("⚠️ 没有找到待处理的任务文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_jobs_loaded(jobs.len());

        let stats = self.process_all_jobs(&jobs).await;

        logging::print_final_stats(stats.success, stats.failed, stats.total);
        if let Some(log_file) = &self.config.log_file {
            info!("\n日志已保存至: {}", log_file);
        }

        Ok(stats)
    }

    /// 加载任务
    async fn load_jobs(&self, job_path: Option<&Path>) -> Result<Vec<DesignJob>> {
        match job_path {
            Some(path) => {
                info!("\n📄 正在加载任务文件: {}", path.display());
                Ok(vec![load_toml_to_design_job(path).await?])
            }
            None => {
                info!("\n📁 正在扫描待处理的任务: {}", self.config.job_folder);
                load_all_toml_files(&self.config.job_folder).await
            }
        }
    }

    /// 逐个处理所有任务
    async fn process_all_jobs(&self, jobs: &[DesignJob]) -> ProcessingStats {
        let designer = Designer::new(&self.config);
        let mut stats = ProcessingStats {
            total: jobs.len(),
            ..Default::default()
        };

        for (idx, job) in jobs.iter().enumerate() {
            let ctx = JobCtx::new(idx + 1, jobs.len(), &job.name);
            match job_processor::process_job(&self.config, &designer, job, &ctx).await {
                Ok(_) => stats.success += 1,
                Err(e) => {
                    error!("{} ❌ 处理失败: {:#}", ctx, e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}
