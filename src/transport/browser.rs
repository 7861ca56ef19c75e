//! 浏览器提交方式
//!
//! 打开任务页面，逐格输入 BED 区间、选择下拉框、填写数值参数后提交，
//! 然后在同一个页面上等待完成状态。整个提交过程作为一次尝试重试。

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError, TrackingError, ValidationError};
use crate::models::params::{DROPDOWN_FIELDS, NUMERIC_FIELDS};
use crate::models::{RequestPayload, TaskHandle, TaskResult};
use crate::tracking::poll_ui;
use crate::transport::driver::{bed_keystrokes, BrowserDriver, DriverFactory, KeyStroke, Locator};
use crate::transport::PrimerTransport;

/// BED 输入框
pub const BED_INPUT_CSS: &str = "#BedInput";

/// 提交按钮
pub const SUBMIT_BUTTON_CSS: &str = r#"button[type="submit"]"#;

/// 运行中状态徽标
pub const RUNNING_BADGE_XPATH: &str =
    r#"//span[contains(@class, "badge badge-danger") and contains(text(), "Running...")]"#;

/// 表单中要填写的一项：定位 + 值
struct FormField<'p> {
    locator: Locator,
    value: &'p str,
}

/// 浏览器需要填写的全部表单项
struct FormValues<'p> {
    bed_input: &'p str,
    dropdowns: Vec<FormField<'p>>,
    numbers: Vec<FormField<'p>>,
}

impl<'p> FormValues<'p> {
    fn from_payload(payload: &'p RequestPayload) -> AppResult<Self> {
        let require = |name: &str| {
            payload.get(name).ok_or_else(|| {
                AppError::from(ValidationError::MissingParameter {
                    name: name.to_string(),
                })
            })
        };

        let dropdowns = DROPDOWN_FIELDS
            .iter()
            .map(|name| {
                Ok(FormField {
                    locator: Locator::css(format!(r#"select[name="{}"]"#, name)),
                    value: require(*name)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let numbers = NUMERIC_FIELDS
            .iter()
            .map(|(selector, name)| {
                Ok(FormField {
                    locator: Locator::css(*selector),
                    value: require(*name)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            bed_input: payload.bed_input(),
            dropdowns,
            numbers,
        })
    }
}

/// 浏览器提交方式
///
/// 提交成功后持有浏览器会话，直到 `release` 被调用。
pub struct BrowserTransport<'a> {
    config: &'a Config,
    factory: &'a dyn DriverFactory,
    session: Option<Box<dyn BrowserDriver>>,
}

impl<'a> BrowserTransport<'a> {
    pub fn new(config: &'a Config, factory: &'a dyn DriverFactory) -> Self {
        Self {
            config,
            factory,
            session: None,
        }
    }

    /// 等待元素可见，超时视为元素不存在
    async fn require(&self, driver: &dyn BrowserDriver, locator: &Locator) -> AppResult<()> {
        if driver.wait_for(locator, self.config.element_timeout).await? {
            Ok(())
        } else {
            Err(AppError::element_not_found(locator))
        }
    }

    /// 在已打开的会话中完成一次填表和提交
    async fn fill_and_submit(
        &self,
        driver: &dyn BrowserDriver,
        form: &FormValues<'_>,
    ) -> AppResult<()> {
        let url = self.config.primer_url();
        debug!("打开页面: {}", url);
        driver.load(&url).await?;

        let bed = Locator::css(BED_INPUT_CSS);
        self.require(driver, &bed).await?;
        driver.click(&bed).await?;
        for key in bed_keystrokes(form.bed_input) {
            driver.press(&bed, &key).await?;
            if matches!(key, KeyStroke::Text(_)) {
                sleep(self.config.keystroke_delay).await;
            }
        }
        debug!("BED 区间输入完成");

        for field in &form.dropdowns {
            driver.select_option(&field.locator, field.value).await?;
        }
        for field in &form.numbers {
            driver.fill(&field.locator, field.value).await?;
        }
        debug!("参数填写完成");

        let submit = Locator::css(SUBMIT_BUTTON_CSS);
        self.require(driver, &submit).await?;
        driver.click(&submit).await?;

        driver.wait_until_loaded(self.config.element_timeout).await?;
        driver.refresh().await?;
        driver.wait_until_loaded(self.config.element_timeout).await?;

        let running = Locator::xpath(RUNNING_BADGE_XPATH);
        if !driver.wait_for(&running, self.config.element_timeout).await? {
            return Err(BrowserError::SubmissionNotStarted.into());
        }
        Ok(())
    }

    /// 一次完整的提交尝试，失败时关闭本次打开的会话
    async fn attempt(&self, form: &FormValues<'_>) -> AppResult<Box<dyn BrowserDriver>> {
        let driver = self.factory.open().await?;
        match self.fill_and_submit(driver.as_ref(), form).await {
            Ok(()) => Ok(driver),
            Err(e) => {
                if let Err(close_err) = driver.close().await {
                    warn!("关闭浏览器会话失败: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl PrimerTransport for BrowserTransport<'_> {
    fn name(&self) -> &'static str {
        "selenium"
    }

    async fn submit(&mut self, payload: &RequestPayload) -> AppResult<TaskHandle> {
        let form = FormValues::from_payload(payload)?;
        self.release().await?;

        let attempts = self.config.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            info!("🌐 正在通过浏览器提交任务 ({}/{})...", attempt, attempts);
            match self.attempt(&form).await {
                Ok(driver) => {
                    self.session = Some(driver);
                    info!("✓ 任务已提交，页面显示运行中");
                    return Ok(TaskHandle::CurrentPage);
                }
                Err(e) => {
                    warn!("⚠️ 第 {} 次提交失败: {}", attempt, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        sleep(self.config.retry_interval).await;
                    }
                }
            }
        }

        Err(BrowserError::RetriesExhausted {
            max_retries: self.config.max_retries,
            last_error,
        }
        .into())
    }

    async fn track(&mut self, handle: &TaskHandle) -> AppResult<TaskResult> {
        match handle {
            TaskHandle::CurrentPage => {
                let driver = self.session.as_deref().ok_or(BrowserError::NoSession)?;
                poll_ui(driver, self.config).await
            }
            TaskHandle::Url(url) => Err(TrackingError::HandleMismatch(format!(
                "浏览器方式只能跟踪当前页面，收到链接 {}",
                url
            ))
            .into()),
        }
    }

    async fn release(&mut self) -> AppResult<()> {
        if let Some(driver) = self.session.take() {
            driver.close().await?;
            info!("🧹 浏览器会话已关闭");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RequestBuilder;
    use crate::testing::{FakeDriver, FakeFactory};
    use crate::tracking::ui_poller::{DONE_BADGE_XPATH, DOWNLOAD_LINK_CSS};
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            max_retries: 2,
            retry_interval: Duration::from_millis(5),
            check_interval: Duration::from_millis(5),
            element_timeout: Duration::from_millis(30),
            keystroke_delay: Duration::ZERO,
            waiting_timeout: Duration::from_millis(100),
            ..Config::default()
        }
    }

    fn payload(config: &Config) -> RequestPayload {
        RequestBuilder::new(config)
            .prepare("tok", "chr1\t1000\t2000\nchr2 5 9", None)
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_fills_form_in_order() {
        let config = test_config();
        let driver = FakeDriver::new();
        let factory = FakeFactory::new(vec![driver.clone()]);
        let mut transport = BrowserTransport::new(&config, &factory);

        let handle = transport.submit(&payload(&config)).await.unwrap();
        assert_eq!(handle, TaskHandle::CurrentPage);

        let calls = driver.calls();
        assert_eq!(calls[0], format!("load {}", config.primer_url()));
        assert_eq!(calls[1], "click css=#BedInput");
        assert_eq!(calls[2], "press css=#BedInput Text(\"chr1\")");
        assert_eq!(calls[3], "press css=#BedInput ShiftSpace");
        assert!(calls.contains(&r#"select css=select[name="DB"] hg19.fa"#.to_string()));
        assert!(calls.contains(&"fill css=#TmID 47".to_string()));
        let submit_at = calls
            .iter()
            .position(|c| c == r#"click css=button[type="submit"]"#)
            .unwrap();
        let refresh_at = calls.iter().position(|c| c == "refresh").unwrap();
        assert!(submit_at < refresh_at);
        assert_eq!(calls.iter().filter(|c| c.starts_with("fill ")).count(), 13);
        assert_eq!(driver.close_count(), 0);

        transport.release().await.unwrap();
        assert_eq!(driver.close_count(), 1);
        // 重复释放无副作用
        transport.release().await.unwrap();
        assert_eq!(driver.close_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_attempt_closes_session_and_retries() {
        let config = test_config();
        let broken = FakeDriver::new();
        broken.remove(Locator::css(BED_INPUT_CSS));
        let healthy = FakeDriver::new();
        let factory = FakeFactory::new(vec![broken.clone(), healthy.clone()]);
        let mut transport = BrowserTransport::new(&config, &factory);

        transport.submit(&payload(&config)).await.unwrap();

        assert_eq!(factory.opened(), 2);
        assert_eq!(broken.close_count(), 1);
        assert_eq!(healthy.close_count(), 0);
        transport.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_running_badge_exhausts_retries() {
        let config = test_config();
        let drivers: Vec<FakeDriver> = (0..3)
            .map(|_| {
                let d = FakeDriver::new();
                d.remove(Locator::xpath(RUNNING_BADGE_XPATH));
                d
            })
            .collect();
        let factory = FakeFactory::new(drivers.clone());
        let mut transport = BrowserTransport::new(&config, &factory);

        let err = transport.submit(&payload(&config)).await.unwrap_err();

        match err {
            AppError::Browser(BrowserError::RetriesExhausted {
                max_retries,
                last_error,
            }) => {
                assert_eq!(max_retries, 2);
                assert!(last_error.contains("Running"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(factory.opened(), 3);
        assert!(drivers.iter().all(|d| d.close_count() == 1));
    }

    #[tokio::test]
    async fn test_missing_parameter_fails_before_opening_browser() {
        let config = test_config();
        let mut defaults = config.primer_params.clone();
        defaults.remove("Tm");
        let payload = RequestBuilder::with_tables(
            &defaults,
            &config.params_constraints,
            &config.xsrf_name,
            config.primer_set_count,
        )
        .prepare("tok", "chr1 1 2", None)
        .unwrap();

        let factory = FakeFactory::new(vec![FakeDriver::new()]);
        let mut transport = BrowserTransport::new(&config, &factory);
        let err = transport.submit(&payload).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(factory.opened(), 0);
    }

    #[tokio::test]
    async fn test_track_reads_download_link() {
        let config = test_config();
        let driver = FakeDriver::new();
        driver.appear_after(Locator::xpath(DONE_BADGE_XPATH), 1);
        driver.set_attribute(Locator::css(DOWNLOAD_LINK_CSS), "href", "/muld/t42/download");
        let factory = FakeFactory::new(vec![driver.clone()]);
        let mut transport = BrowserTransport::new(&config, &factory);

        let handle = transport.submit(&payload(&config)).await.unwrap();
        let result = transport.track(&handle).await.unwrap();
        assert_eq!(result.as_str(), config.resolve("/muld/t42/download"));
    }

    #[tokio::test]
    async fn test_track_without_session() {
        let config = test_config();
        let factory = FakeFactory::new(vec![]);
        let mut transport = BrowserTransport::new(&config, &factory);
        let err = transport.track(&TaskHandle::CurrentPage).await.unwrap_err();
        assert!(matches!(err, AppError::Browser(BrowserError::NoSession)));
    }
}
