//! 直连提交方式
//!
//! 以表单 POST 提交任务，从响应页面中找到任务链接，再按链接轮询状态。

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ServiceError, TrackingError};
use crate::models::{RequestPayload, TaskHandle, TaskResult};
use crate::tracking::HandlePoller;
use crate::transport::PrimerTransport;
use crate::utils::html;
use crate::utils::http::{build_client, build_header_map};
use crate::utils::{CookieJar, HeaderTable};

/// 直连提交方式
pub struct DirectTransport<'a> {
    config: &'a Config,
    client: reqwest::Client,
    headers: HeaderMap,
    task_pattern: Regex,
}

impl<'a> DirectTransport<'a> {
    /// 使用调用方提供的请求头和 cookie 创建
    pub fn new(config: &'a Config, headers: &HeaderTable, cookies: &CookieJar) -> AppResult<Self> {
        Ok(Self {
            config,
            client: build_client(config)?,
            headers: build_header_map(headers, cookies)?,
            task_pattern: html::task_link_pattern(&config.primer_path),
        })
    }

    /// 发送一次提交请求，返回响应页面
    async fn post_form(&self, url: &str, payload: &RequestPayload) -> AppResult<String> {
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .form(payload.fields())
            .send()
            .await
            .map_err(|e| {
                error!("提交请求发送失败: {}", e);
                AppError::request_failed(url, e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("提交请求失败，HTTP 状态码: {}", status);
            return Err(AppError::bad_status(url, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::request_failed(url, e))
    }
}

#[async_trait]
impl PrimerTransport for DirectTransport<'_> {
    fn name(&self) -> &'static str {
        "requests"
    }

    async fn submit(&mut self, payload: &RequestPayload) -> AppResult<TaskHandle> {
        let url = self.config.primer_url();
        let attempts = self.config.max_retries + 1;

        for attempt in 1..=attempts {
            info!("📤 正在提交引物设计任务 ({}/{})...", attempt, attempts);
            debug!("提交地址: {}, 字段数: {}", url, payload.len());

            let body = self.post_form(&url, payload).await?;

            if let Some(href) = html::find_link(&body, &self.task_pattern) {
                let task_url = self.config.resolve(&href);
                info!("✓ 任务已提交: {}", task_url);
                return Ok(TaskHandle::Url(task_url));
            }

            warn!("⚠️ 响应中未找到任务链接 ({}/{})", attempt, attempts);
            if attempt < attempts {
                sleep(self.config.retry_interval).await;
            }
        }

        error!("❌ 重试 {} 次后仍未找到任务链接", self.config.max_retries);
        Err(ServiceError::TaskLinkNotFound { attempts }.into())
    }

    async fn track(&mut self, handle: &TaskHandle) -> AppResult<TaskResult> {
        match handle {
            TaskHandle::Url(task_url) => {
                HandlePoller::new(self.config, self.client.clone(), self.headers.clone())
                    .poll(task_url)
                    .await
            }
            TaskHandle::CurrentPage => Err(TrackingError::HandleMismatch(
                "直连方式需要任务链接，而不是浏览器页面".to_string(),
            )
            .into()),
        }
    }
}
