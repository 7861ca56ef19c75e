//! 基于 chromiumoxide 的浏览器会话

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::element::Element;
use chromiumoxide::Browser;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::JsExecutor;
use crate::transport::driver::{BrowserDriver, DriverFactory, KeyStroke, Locator};

/// Shift 修饰键
const MODIFIER_SHIFT: i64 = 8;

/// 一个独占的浏览器会话
///
/// 自己启动的浏览器在 `close` 时整体退出；连接到已有浏览器时只关闭本会话新建的页面。
pub struct ChromeSession {
    browser: Mutex<Option<Browser>>,
    executor: JsExecutor,
    owns_browser: bool,
}

impl ChromeSession {
    pub fn new(browser: Browser, executor: JsExecutor, owns_browser: bool) -> Self {
        Self {
            browser: Mutex::new(Some(browser)),
            executor,
            owns_browser,
        }
    }

    async fn element(&self, locator: &Locator) -> AppResult<Element> {
        let page = self.executor.page();
        let found = match locator {
            Locator::Css(selector) => page.find_element(selector.as_str()).await,
            Locator::XPath(expr) => page.find_xpath(expr.as_str()).await,
        };
        found.map_err(|e| {
            debug!("查找元素 {} 失败: {}", locator, e);
            AppError::element_not_found(locator)
        })
    }

    async fn shift_space(&self) -> AppResult<()> {
        let events = [
            (DispatchKeyEventType::KeyDown, Some(" ")),
            (DispatchKeyEventType::KeyUp, None),
        ];
        for (event_type, text) in events {
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(event_type)
                .modifiers(MODIFIER_SHIFT)
                .key(" ")
                .code("Space")
                .windows_virtual_key_code(32);
            if let Some(text) = text {
                builder = builder.text(text);
            }
            let params = builder.build().map_err(BrowserError::ScriptFailed)?;
            self.executor.page().execute(params).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for ChromeSession {
    async fn load(&self, url: &str) -> AppResult<()> {
        self.executor.page().goto(url).await?;
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> AppResult<bool> {
        self.executor.exists(locator).await
    }

    async fn is_visible(&self, locator: &Locator) -> AppResult<bool> {
        self.executor.visible(locator).await
    }

    async fn click(&self, locator: &Locator) -> AppResult<()> {
        self.element(locator).await?.click().await?;
        Ok(())
    }

    async fn press(&self, locator: &Locator, key: &KeyStroke) -> AppResult<()> {
        match key {
            KeyStroke::Text(text) => {
                self.element(locator).await?.type_str(text).await?;
            }
            KeyStroke::Enter => {
                self.element(locator).await?.press_key("Enter").await?;
            }
            KeyStroke::ShiftSpace => self.shift_space().await?,
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()> {
        if !self.executor.clear(locator).await? {
            return Err(AppError::element_not_found(locator));
        }
        self.element(locator)
            .await?
            .click()
            .await?
            .type_str(value)
            .await?;
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> AppResult<()> {
        if self.executor.select_value(locator, value).await? {
            Ok(())
        } else {
            Err(AppError::element_not_found(format!("{} option={}", locator, value)))
        }
    }

    async fn wait_until_loaded(&self, timeout: Duration) -> AppResult<()> {
        let started = Instant::now();
        while started.elapsed() < timeout {
            if self.executor.ready_state().await? == "complete" {
                return Ok(());
            }
            sleep(Duration::from_millis(200)).await;
        }
        debug!("页面在 {:?} 内未加载完成，继续执行", timeout);
        Ok(())
    }

    async fn refresh(&self) -> AppResult<()> {
        self.executor.page().reload().await?;
        Ok(())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> AppResult<Option<String>> {
        self.executor.attribute(locator, name).await
    }

    async fn close(&self) -> AppResult<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        if self.owns_browser {
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        } else {
            self.executor.page().clone().close().await?;
        }
        debug!("浏览器会话已关闭");
        Ok(())
    }
}

/// 按配置打开浏览器会话
///
/// 配置了调试端口时连接已打开的浏览器，否则启动新的浏览器进程
pub struct ChromeDriverFactory<'a> {
    config: &'a Config,
}

impl<'a> ChromeDriverFactory<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for ChromeDriverFactory<'_> {
    async fn open(&self) -> AppResult<Box<dyn BrowserDriver>> {
        let url = self.config.primer_url();
        let (browser, page, owns_browser) = match self.config.browser_debug_port {
            Some(port) => {
                let (browser, page) = browser::connect_to_browser_and_page(port, &url)
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
                (browser, page, false)
            }
            None => {
                let (browser, page) = browser::launch_browser(self.config, &url)
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
                (browser, page, true)
            }
        };
        info!("🌐 浏览器会话已就绪");
        Ok(Box::new(ChromeSession::new(
            browser,
            JsExecutor::new(page),
            owns_browser,
        )))
    }
}
