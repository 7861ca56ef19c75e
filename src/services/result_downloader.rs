//! 结果下载服务 - 业务能力层
//!
//! 把 `TaskResult` 指向的结果文件流式保存到本地

use std::path::Path;

use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, TransportError};
use crate::models::TaskResult;
use crate::utils::http::build_header_map;
use crate::utils::{CookieJar, HeaderTable};

/// 结果下载器
pub struct ResultDownloader<'a> {
    config: &'a Config,
    client: reqwest::Client,
    headers: HeaderMap,
}

impl<'a> ResultDownloader<'a> {
    /// 使用与提交时相同的请求头和 cookie
    pub fn new(config: &'a Config, headers: &HeaderTable, cookies: &CookieJar) -> AppResult<Self> {
        // 只限制连接时间，读取超时按数据块计算，大文件不会因为总时长被中断
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AppError::request_failed(&config.root_url, e))?;
        Ok(Self {
            config,
            client,
            headers: build_header_map(headers, cookies)?,
        })
    }

    /// 下载结果文件
    ///
    /// # 参数
    /// - `result`: 结果下载地址
    /// - `save_path`: 保存路径，父目录不存在时自动创建
    ///
    /// # 返回
    /// 写入的字节数
    pub async fn download(&self, result: &TaskResult, save_path: &Path) -> AppResult<u64> {
        let url = result.as_str();
        let path_str = save_path.display().to_string();
        info!("📥 正在下载结果: {}", url);

        let mut response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| {
                error!("下载请求失败: {}", e);
                AppError::request_failed(url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("下载失败，HTTP 状态码: {}", status);
            return Err(AppError::bad_status(url, status.as_u16()));
        }

        match response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        {
            Some(size) => debug!("文件大小: {:.1} KB", size as f64 / 1024.0),
            None => warn!("⚠️ 无法获取文件大小"),
        }

        if let Some(parent) = save_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }
        let mut file = tokio::fs::File::create(save_path)
            .await
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;

        let read_timeout = self.config.read_timeout;
        let mut written = 0u64;
        loop {
            let chunk = timeout(read_timeout, response.chunk())
                .await
                .map_err(|_| TransportError::ReadTimeout {
                    url: url.to_string(),
                    secs: read_timeout.as_secs(),
                })?
                .map_err(|e| AppError::request_failed(url, e))?;

            let Some(chunk) = chunk else { break };
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::file_write_failed(&path_str, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;

        info!("✅ 下载完成: {} ({} 字节)", path_str, written);
        Ok(written)
    }
}
