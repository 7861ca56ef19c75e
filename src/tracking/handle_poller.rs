//! 按任务链接轮询状态（直连方式）

use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, TrackingError};
use crate::models::TaskResult;
use crate::utils::html::{self, TaskStatus};

/// 单次查询失败的原因
enum PollFault {
    /// 网络异常，计入重试次数
    Network(reqwest::Error),
    /// 非 200 响应，直接失败
    Status(u16),
}

/// 任务链接轮询器
pub struct HandlePoller<'a> {
    config: &'a Config,
    client: reqwest::Client,
    headers: HeaderMap,
    download_pattern: Regex,
}

impl<'a> HandlePoller<'a> {
    pub fn new(config: &'a Config, client: reqwest::Client, headers: HeaderMap) -> Self {
        Self {
            config,
            client,
            headers,
            download_pattern: html::download_link_pattern(&config.primer_path),
        }
    }

    async fn fetch_status(&self, task_url: &str) -> Result<TaskStatus, PollFault> {
        let response = self
            .client
            .get(task_url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(PollFault::Network)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PollFault::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(PollFault::Network)?;
        Ok(html::parse_task_status(&body, &self.download_pattern))
    }

    /// 轮询任务直到完成
    ///
    /// - 页面显示 `Done` 且有下载链接时立即返回
    /// - `Running...` 或无法识别的状态继续等待
    /// - 网络异常累计超过 `max_retries` 次后失败，非 200 响应立即失败
    /// - 配置了 `poll_deadline` 时，超过总时长也会失败
    pub async fn poll(&self, task_url: &str) -> AppResult<TaskResult> {
        info!("⏳ 开始查询任务状态: {}", task_url);
        let started = Instant::now();
        let mut faults = 0usize;

        loop {
            if let Some(deadline) = self.config.poll_deadline {
                if started.elapsed() >= deadline {
                    error!("❌ 超过最长等待时间 {:?}", deadline);
                    return Err(TrackingError::DeadlineExceeded {
                        url: task_url.to_string(),
                        secs: deadline.as_secs(),
                    }
                    .into());
                }
            }

            match self.fetch_status(task_url).await {
                Ok(TaskStatus::Done(Some(href))) => {
                    let result = TaskResult::new(self.config.resolve(&href));
                    info!("✅ 引物设计完成，结果地址: {}", result);
                    return Ok(result);
                }
                Ok(TaskStatus::Done(None)) => {
                    warn!("⚠️ 任务已完成，但页面中暂未找到下载链接");
                }
                Ok(TaskStatus::Running) => {
                    info!("🔄 任务运行中...");
                }
                Ok(TaskStatus::Unknown) => {
                    warn!("⚠️ 未知的任务状态，继续等待");
                }
                Err(PollFault::Status(status)) => {
                    error!("❌ 查询任务状态失败，HTTP 状态码: {}", status);
                    return Err(AppError::bad_status(task_url, status));
                }
                Err(PollFault::Network(e)) => {
                    faults += 1;
                    warn!(
                        "⚠️ 查询任务状态时网络异常 ({}/{}): {}",
                        faults, self.config.max_retries, e
                    );
                    if faults > self.config.max_retries {
                        error!("❌ 网络异常次数超过上限");
                        return Err(TrackingError::RetriesExhausted {
                            max_retries: self.config.max_retries,
                            last_error: e.to_string(),
                        }
                        .into());
                    }
                }
            }

            debug!("{:?} 后再次查询", self.config.check_interval);
            sleep(self.config.check_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RUNNING: &str = r#"<span class="badge badge-danger">Running...</span>"#;
    const DONE: &str = r#"
        <span id="shuaxin">Done</span>
        <span class="badge badge-success">Done</span><a href="/muld/t42/download">download</a>
    "#;

    fn test_config(root: &str) -> Config {
        Config {
            root_url: root.to_string(),
            max_retries: 2,
            check_interval: Duration::from_millis(50),
            ..Config::default()
        }
    }

    fn poller(config: &Config) -> HandlePoller<'_> {
        HandlePoller::new(config, reqwest::Client::new(), HeaderMap::new())
    }

    #[tokio::test]
    async fn test_running_running_done() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/muld/t42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RUNNING))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/muld/t42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DONE))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let started = std::time::Instant::now();
        let result = poller(&config)
            .poll(&format!("{}/muld/t42", server.uri()))
            .await
            .unwrap();

        assert_eq!(
            result.as_str(),
            format!("{}/muld/t42/download", server.uri())
        );
        // 两次等待
        let elapsed = started.elapsed();
        assert!(elapsed >= config.check_interval * 2);
        assert!(elapsed < config.check_interval * 3 + Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_done_on_first_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DONE))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let result = poller(&config)
            .poll(&format!("{}/muld/t42", server.uri()))
            .await
            .unwrap();
        assert!(result.as_str().ends_with("/muld/t42/download"));
    }

    #[tokio::test]
    async fn test_non_200_fails_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let err = poller(&config)
            .poll(&format!("{}/muld/t42", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Transport(crate::error::TransportError::BadStatus { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>queued</p>"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DONE))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        assert!(poller(&config)
            .poll(&format!("{}/muld/t42", server.uri()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_network_faults_are_bounded() {
        // 没有服务监听的端口
        let config = Config {
            max_retries: 1,
            check_interval: Duration::from_millis(10),
            ..Config::default()
        };
        let err = poller(&config)
            .poll("http://127.0.0.1:9/muld/t42")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Tracking(TrackingError::RetriesExhausted { max_retries: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_network_faults_accumulate_across_normal_pages() {
        let server = MockServer::start().await;
        let slow = || ResponseTemplate::new(200).set_delay(Duration::from_millis(500));
        Mock::given(method("GET"))
            .respond_with(slow())
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RUNNING))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        // 计数不清零时只需再失败两次
        Mock::given(method("GET"))
            .respond_with(slow())
            .expect(2)
            .mount(&server)
            .await;

        let config = Config {
            check_interval: Duration::from_millis(10),
            ..test_config(&server.uri())
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let err = HandlePoller::new(&config, client, HeaderMap::new())
            .poll(&format!("{}/muld/t42", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Tracking(TrackingError::RetriesExhausted { max_retries: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_deadline_stops_endless_running() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RUNNING))
            .mount(&server)
            .await;

        let config = Config {
            poll_deadline: Some(Duration::from_millis(120)),
            ..test_config(&server.uri())
        };
        let err = poller(&config)
            .poll(&format!("{}/muld/t42", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Tracking(TrackingError::DeadlineExceeded { .. })
        ));
    }
}
