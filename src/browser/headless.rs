use std::path::Path;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;

/// 启动浏览器进程并打开指定 URL
///
/// `config.headless` 决定是否显示窗口，`config.chrome_executable` 为空时由 chromiumoxide 自动查找
pub async fn launch_browser(config: &Config, url: &str) -> Result<(Browser, Page)> {
    info!(
        "🚀 启动{}浏览器...",
        if config.headless { "无头" } else { "有界面" }
    );
    debug!("目标 URL: {}", url);

    let mut builder = BrowserConfig::builder()
        .window_size(1920, 1080)
        .request_timeout(config.element_timeout)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--ignore-certificate-errors",
            "--remote-debugging-port=0",
        ]);
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(executable));
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        anyhow::anyhow!("配置浏览器失败: {}", e)
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow::anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page(url)
        .await
        .with_context(|| format!("打开页面失败: {}", url))?;

    info!("✅ 浏览器已打开: {}", url);
    Ok((browser, page))
}
