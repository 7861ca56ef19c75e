//! 单元测试用的假浏览器

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, AppResult, BrowserError};
use crate::transport::driver::{BrowserDriver, DriverFactory, KeyStroke, Locator};

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    missing: HashSet<Locator>,
    countdown: HashMap<Locator, usize>,
    attributes: HashMap<(Locator, String), String>,
    closed: usize,
}

/// 记录所有操作的假浏览器
///
/// 默认所有元素都存在；`remove` 让元素消失，`appear_after` 让元素在若干次查询后出现。
/// 克隆出的实例共享状态，便于交给工厂后继续检查。
#[derive(Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, locator: Locator) {
        self.state.lock().unwrap().missing.insert(locator);
    }

    pub fn appear_after(&self, locator: Locator, checks: usize) {
        self.state.lock().unwrap().countdown.insert(locator, checks);
    }

    pub fn set_attribute(&self, locator: Locator, name: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .attributes
            .insert((locator, name.to_string()), value.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check(&self, locator: &Locator) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.missing.contains(locator) {
            return false;
        }
        match state.countdown.get_mut(locator) {
            Some(0) | None => true,
            Some(n) => {
                *n -= 1;
                false
            }
        }
    }

    fn act(&self, locator: &Locator, call: String) -> AppResult<()> {
        if self.state.lock().unwrap().missing.contains(locator) {
            return Err(AppError::element_not_found(locator));
        }
        self.record(call);
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn load(&self, url: &str) -> AppResult<()> {
        self.record(format!("load {}", url));
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> AppResult<bool> {
        Ok(self.check(locator))
    }

    async fn is_visible(&self, locator: &Locator) -> AppResult<bool> {
        Ok(self.check(locator))
    }

    async fn click(&self, locator: &Locator) -> AppResult<()> {
        self.act(locator, format!("click {}", locator))
    }

    async fn press(&self, locator: &Locator, key: &KeyStroke) -> AppResult<()> {
        self.act(locator, format!("press {} {:?}", locator, key))
    }

    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()> {
        self.act(locator, format!("fill {} {}", locator, value))
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> AppResult<()> {
        self.act(locator, format!("select {} {}", locator, value))
    }

    async fn wait_until_loaded(&self, _timeout: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn refresh(&self) -> AppResult<()> {
        self.record("refresh".to_string());
        Ok(())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> AppResult<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .attributes
            .get(&(locator.clone(), name.to_string()))
            .cloned())
    }

    async fn close(&self) -> AppResult<()> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// 依次交出预先准备好的假浏览器
pub struct FakeFactory {
    drivers: Mutex<VecDeque<FakeDriver>>,
    opened: AtomicUsize,
}

impl FakeFactory {
    pub fn new(drivers: Vec<FakeDriver>) -> Self {
        Self {
            drivers: Mutex::new(drivers.into()),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverFactory for FakeFactory {
    async fn open(&self) -> AppResult<Box<dyn BrowserDriver>> {
        let driver = self
            .drivers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BrowserError::LaunchFailed("没有可用的浏览器".to_string()))?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(driver))
    }
}
