//! 提交流程 - 流程层
//!
//! 定义"一次设计请求"在任意提交方式上的完整流程：
//! 1. submit → 拿到任务句柄
//! 2. track → 拿到结果地址
//! 3. release → 无论成功失败都释放资源

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{RequestPayload, TaskResult};
use crate::transport::PrimerTransport;

/// 用指定的提交方式完成一次设计请求
///
/// 提交和跟踪的错误优先返回；释放失败只在前面都成功时才作为错误返回
pub async fn run_transport(
    transport: &mut dyn PrimerTransport,
    payload: &RequestPayload,
) -> AppResult<TaskResult> {
    info!("🧬 使用 {} 方式提交引物设计任务", transport.name());

    let outcome = match transport.submit(payload).await {
        Ok(handle) => {
            info!("📌 任务句柄: {}", handle);
            transport.track(&handle).await
        }
        Err(e) => Err(e),
    };

    let released = transport.release().await;

    match (outcome, released) {
        (Ok(result), Ok(())) => Ok(result),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_err)) => {
            warn!("释放资源失败: {}", release_err);
            Err(e)
        }
    }
}
