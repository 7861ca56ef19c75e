//! 提交方式（Transport）
//!
//! ## 职责
//!
//! 把已校验的 `RequestPayload` 提交给引物设计服务，并跟踪任务直到拿到结果地址。
//!
//! ## 两种实现
//!
//! - `DirectTransport` - 直接发送表单请求，按任务链接轮询（需要 headers + cookies）
//! - `BrowserTransport` - 驱动浏览器填写表单，在页面上轮询完成状态
//!
//! 编排层只依赖 `PrimerTransport` trait，不关心具体实现。

pub mod browser;
pub mod direct;
pub mod driver;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{RequestPayload, TaskHandle, TaskResult};

pub use browser::BrowserTransport;
pub use direct::DirectTransport;
pub use driver::{BrowserDriver, DriverFactory, KeyStroke, Locator};

/// 引物设计任务的提交方式
#[async_trait]
pub trait PrimerTransport: Send {
    /// 日志中使用的名称
    fn name(&self) -> &'static str;

    /// 提交任务，返回任务句柄
    async fn submit(&mut self, payload: &RequestPayload) -> AppResult<TaskHandle>;

    /// 轮询任务直到完成，返回结果下载地址
    async fn track(&mut self, handle: &TaskHandle) -> AppResult<TaskResult>;

    /// 释放持有的资源（浏览器会话等），可重复调用
    async fn release(&mut self) -> AppResult<()> {
        Ok(())
    }
}
