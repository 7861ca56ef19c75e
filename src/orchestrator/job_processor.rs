//! 单个设计任务处理器 - 编排层
//!
//! 一个任务的完整流程：
//! 1. 获取站点会话数据（headers / cookies / token）
//! 2. 组装并校验请求数据
//! 3. 提交并等待结果
//! 4. 下载结果文件

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::DesignJob;
use crate::orchestrator::designer::Designer;
use crate::services::{RequestBuilder, ResultDownloader, SiteFetcher};
use crate::utils::logging::truncate_text;
use crate::workflow::JobCtx;

/// 处理单个设计任务，返回结果文件路径
pub async fn process_job(
    config: &Config,
    designer: &Designer<'_>,
    job: &DesignJob,
    ctx: &JobCtx,
) -> Result<PathBuf> {
    info!("\n{}", "─".repeat(60));
    info!("{} 🧬 开始处理", ctx);

    let bed_text = job
        .bed_input
        .as_deref()
        .with_context(|| format!("{} 缺少 BED 区间", ctx))?;
    debug!("{} BED: {}", ctx, truncate_text(bed_text, 80));

    // 每个任务重新获取会话数据
    let session = SiteFetcher::new(config)?
        .fetch()
        .await
        .with_context(|| format!("{} 获取站点数据失败", ctx))?;

    let payload = RequestBuilder::new(config)
        .prepare(&session.token, bed_text, job.params.as_ref())
        .with_context(|| format!("{} 请求数据校验失败", ctx))?;

    let result = designer
        .design(
            &payload,
            &job.method,
            Some(&session.headers),
            Some(&session.cookies),
        )
        .await
        .with_context(|| format!("{} 引物设计失败", ctx))?;

    let output = PathBuf::from(job.output_path());
    ResultDownloader::new(config, &session.headers, &session.cookies)?
        .download(&result, &output)
        .await
        .with_context(|| format!("{} 下载结果失败", ctx))?;

    info!("{} ✅ 完成，结果已保存至 {}", ctx, output.display());
    Ok(output)
}
