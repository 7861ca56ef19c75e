//! 引物设计入口 - 编排层
//!
//! 根据设计方式选择提交方式，交给 `workflow::run_transport` 完成提交、跟踪和释放

use std::fmt;
use std::str::FromStr;

use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::infrastructure::ChromeDriverFactory;
use crate::models::{RequestPayload, TaskResult};
use crate::transport::{BrowserTransport, DirectTransport, DriverFactory};
use crate::utils::{CookieJar, HeaderTable};
use crate::workflow::run_transport;

/// 设计方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignMethod {
    /// 直接发送 HTTP 请求
    Direct,
    /// 驱动浏览器
    Browser,
}

impl FromStr for DesignMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "requests" | "direct" => Ok(DesignMethod::Direct),
            "selenium" | "browser" => Ok(DesignMethod::Browser),
            _ => Err(ValidationError::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DesignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignMethod::Direct => f.write_str("requests"),
            DesignMethod::Browser => f.write_str("selenium"),
        }
    }
}

/// 引物设计入口
///
/// 每次调用 `design` 都是独立的，不在调用之间保留会话状态。
pub struct Designer<'a> {
    config: &'a Config,
    driver_factory: Option<&'a dyn DriverFactory>,
}

impl<'a> Designer<'a> {
    /// 浏览器方式按配置启动或连接 Chromium
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            driver_factory: None,
        }
    }

    /// 使用指定的浏览器会话工厂
    pub fn with_driver_factory(config: &'a Config, factory: &'a dyn DriverFactory) -> Self {
        Self {
            config,
            driver_factory: Some(factory),
        }
    }

    /// 提交设计任务并等待结果
    ///
    /// # 参数
    /// - `payload`: 已校验的请求数据
    /// - `method`: `requests` / `direct` 或 `selenium` / `browser`
    /// - `headers`, `cookies`: 直连方式必须同时提供，浏览器方式忽略
    ///
    /// # 返回
    /// 结果文件的下载地址
    pub async fn design(
        &self,
        payload: &RequestPayload,
        method: &str,
        headers: Option<&HeaderTable>,
        cookies: Option<&CookieJar>,
    ) -> AppResult<TaskResult> {
        let method: DesignMethod = method.parse().map_err(|e| {
            error!("{}", e);
            e
        })?;
        info!("🧪 开始引物设计 (方式: {})", method);

        match method {
            DesignMethod::Direct => {
                let (Some(headers), Some(cookies)) = (headers, cookies) else {
                    error!("requests 方式缺少 headers 或 cookies");
                    return Err(ValidationError::MissingSessionData.into());
                };
                let mut transport = DirectTransport::new(self.config, headers, cookies)?;
                run_transport(&mut transport, payload).await
            }
            DesignMethod::Browser => match self.driver_factory {
                Some(factory) => {
                    let mut transport = BrowserTransport::new(self.config, factory);
                    run_transport(&mut transport, payload).await
                }
                None => {
                    let factory = ChromeDriverFactory::new(self.config);
                    let mut transport = BrowserTransport::new(self.config, &factory);
                    run_transport(&mut transport, payload).await
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::RequestBuilder;
    use crate::testing::{FakeDriver, FakeFactory};
    use crate::tracking::ui_poller::DOWNLOAD_LINK_CSS;
    use crate::transport::Locator;
    use std::time::Duration;

    fn payload(config: &Config) -> RequestPayload {
        RequestBuilder::new(config)
            .prepare("tok", "chr1\t1000\t2000", None)
            .unwrap()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("requests".parse::<DesignMethod>().unwrap(), DesignMethod::Direct);
        assert_eq!("Selenium".parse::<DesignMethod>().unwrap(), DesignMethod::Browser);
        assert_eq!("browser".parse::<DesignMethod>().unwrap(), DesignMethod::Browser);
        assert!(matches!(
            "curl".parse::<DesignMethod>(),
            Err(ValidationError::InvalidMethod { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_method_is_rejected() {
        let config = Config::default();
        let err = Designer::new(&config)
            .design(&payload(&config), "ftp", None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidMethod { .. })
        ));
    }

    #[tokio::test]
    async fn test_direct_requires_headers_and_cookies() {
        let config = Config::default();
        let designer = Designer::new(&config);
        let headers = HeaderTable::new();

        for (h, c) in [(Some(&headers), None), (None, Some(&CookieJar::new()))] {
            let err = designer
                .design(&payload(&config), "requests", h, c)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AppError::Validation(ValidationError::MissingSessionData)
            ));
        }
    }

    #[tokio::test]
    async fn test_browser_design_releases_session() {
        let config = Config {
            check_interval: Duration::from_millis(5),
            element_timeout: Duration::from_millis(20),
            keystroke_delay: Duration::ZERO,
            ..Config::default()
        };
        let driver = FakeDriver::new();
        driver.set_attribute(Locator::css(DOWNLOAD_LINK_CSS), "href", "/muld/b7/download");
        let factory = FakeFactory::new(vec![driver.clone()]);

        let result = Designer::with_driver_factory(&config, &factory)
            .design(&payload(&config), "selenium", None, None)
            .await
            .unwrap();

        assert_eq!(result.as_str(), config.resolve("/muld/b7/download"));
        assert_eq!(driver.close_count(), 1);
    }
}
