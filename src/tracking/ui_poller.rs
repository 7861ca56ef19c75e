//! 在浏览器页面上轮询完成状态（浏览器方式）

use tokio::time::{sleep, Instant};
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, TrackingError};
use crate::models::TaskResult;
use crate::transport::driver::{BrowserDriver, Locator};

/// 完成状态徽标
pub const DONE_BADGE_XPATH: &str =
    r#"//span[contains(@class, "badge badge-success") and contains(text(), "Done")]"#;

/// 完成徽标后面的下载链接
pub const DOWNLOAD_LINK_CSS: &str = r#"span[class="badge badge-success"]+a"#;

/// 等待页面出现完成徽标，读取其后链接的地址
///
/// 超过 `waiting_timeout` 仍未完成时返回 `TrackingError::Timeout`，不重试。
pub async fn poll_ui(driver: &dyn BrowserDriver, config: &Config) -> AppResult<TaskResult> {
    info!("⏳ 等待引物设计完成...");
    let done_badge = Locator::xpath(DONE_BADGE_XPATH);
    let download_link = Locator::css(DOWNLOAD_LINK_CSS);
    let started = Instant::now();

    loop {
        if driver.is_present(&done_badge).await? {
            let href = driver
                .attribute(&download_link, "href")
                .await?
                .filter(|href| !href.is_empty())
                .ok_or_else(|| AppError::element_not_found(&download_link))?;
            let result = TaskResult::new(config.resolve(&href));
            info!("✅ 引物设计完成，结果地址: {}", result);
            return Ok(result);
        }

        if started.elapsed() >= config.waiting_timeout {
            error!("❌ 等待超时: {:?} 内未完成", config.waiting_timeout);
            return Err(TrackingError::Timeout {
                secs: config.waiting_timeout.as_secs(),
            }
            .into());
        }

        sleep(config.check_interval).await;
    }
}
