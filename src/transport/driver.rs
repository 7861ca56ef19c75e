//! 浏览器驱动抽象
//!
//! 浏览器方式的提交和轮询逻辑只依赖这里的 trait，
//! 真实实现见 `infrastructure::ChromeSession`，测试中使用假的实现。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::AppResult;

/// 页面元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// 一次按键输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStroke {
    /// 输入一段文本
    Text(String),
    /// Shift + 空格（在表格输入框中跳到下一格）
    ShiftSpace,
    /// 回车（换到下一行）
    Enter,
}

/// 浏览器会话能力
///
/// 一个实例对应一个独占的浏览器会话，用完必须调用 `close`。
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// 打开页面并等待导航完成
    async fn load(&self, url: &str) -> AppResult<()>;

    /// 元素是否存在
    async fn is_present(&self, locator: &Locator) -> AppResult<bool>;

    /// 元素是否存在且可见
    async fn is_visible(&self, locator: &Locator) -> AppResult<bool>;

    /// 点击元素
    async fn click(&self, locator: &Locator) -> AppResult<()>;

    /// 向元素发送一次按键
    async fn press(&self, locator: &Locator, key: &KeyStroke) -> AppResult<()>;

    /// 清空输入框并填入新值
    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()>;

    /// 选择下拉框中 value 对应的选项
    async fn select_option(&self, locator: &Locator, value: &str) -> AppResult<()>;

    /// 等待 `document.readyState == "complete"`，超时不报错
    async fn wait_until_loaded(&self, timeout: Duration) -> AppResult<()>;

    /// 刷新当前页面
    async fn refresh(&self) -> AppResult<()>;

    /// 读取元素属性，元素不存在时返回 `None`
    async fn attribute(&self, locator: &Locator, name: &str) -> AppResult<Option<String>>;

    /// 关闭会话，释放浏览器进程
    async fn close(&self) -> AppResult<()>;

    /// 等待元素出现并可见
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> AppResult<bool> {
        let started = Instant::now();
        loop {
            if self.is_visible(locator).await? {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                return Ok(false);
            }
            sleep(Duration::from_millis(250).min(timeout)).await;
        }
    }
}

/// 浏览器会话工厂，每次提交尝试打开一个新会话
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn open(&self) -> AppResult<Box<dyn BrowserDriver>>;
}

/// BED 文本对应的按键序列
///
/// 每格内容后接 Shift+空格，每行结束后回车，模拟人工粘贴多列数据。
pub fn bed_keystrokes(bed_text: &str) -> Vec<KeyStroke> {
    let mut keys = Vec::new();
    for line in bed_text.lines() {
        for cell in line.split_whitespace() {
            keys.push(KeyStroke::Text(cell.to_string()));
            keys.push(KeyStroke::ShiftSpace);
        }
        keys.push(KeyStroke::Enter);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bed_keystrokes() {
        let keys = bed_keystrokes("chr1\t100\t200\nchrX 5 9");
        assert_eq!(keys.len(), 14);
        assert_eq!(keys[0], KeyStroke::Text("chr1".into()));
        assert_eq!(keys[1], KeyStroke::ShiftSpace);
        assert_eq!(keys[6], KeyStroke::Enter);
        assert_eq!(keys[7], KeyStroke::Text("chrX".into()));
        assert_eq!(keys[13], KeyStroke::Enter);
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::css("#BedInput").to_string(), "css=#BedInput");
        assert_eq!(Locator::xpath("//a").to_string(), "xpath=//a");
    }
}
