//! 基础设施层
//!
//! 持有浏览器和页面这类稀缺资源，只向上暴露能力：
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 与 DOM 查询
//! - `ChromeSession` - `BrowserDriver` 的 chromiumoxide 实现
//! - `ChromeDriverFactory` - 按配置启动或连接浏览器

pub mod chrome_driver;
pub mod js_executor;

pub use chrome_driver::{ChromeDriverFactory, ChromeSession};
pub use js_executor::JsExecutor;
