//! # Primer Submit
//!
//! 把基因组坐标区间提交给 MFEprimer-3 多重引物设计服务（`/muld`），
//! 轮询任务状态并取得结果文件的下载地址
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Browser / Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 与 DOM 查询
//! - `ChromeSession` - 基于 chromiumoxide 的 `BrowserDriver` 实现
//!
//! ### ② 业务能力层（Services / Transport / Tracking）
//! - `services/` - 参数校验、请求组装、会话数据获取、结果下载
//! - `transport/` - `PrimerTransport` 的直连与浏览器两种实现
//! - `tracking/` - 按任务链接轮询 / 在页面上轮询
//!
//! ### ③ 流程层（Workflow）
//! - `run_transport` - submit → track → release
//! - `JobCtx` - 任务上下文（序号 + 名称）
//!
//! ### ④ 编排层（Orchestration）
//! - `Designer` - 对外的设计入口 `design(payload, method, headers, cookies)`
//! - `App` - 批量加载任务文件并逐个处理
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod tracking;
pub mod transport;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod testing;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromeDriverFactory, JsExecutor};
pub use models::{DesignJob, RequestPayload, TaskHandle, TaskResult};
pub use orchestrator::{App, DesignMethod, Designer};
pub use services::{RequestBuilder, ResultDownloader, SiteFetcher, SiteSession};
pub use transport::{BrowserDriver, DriverFactory, PrimerTransport};
pub use utils::{CookieJar, HeaderTable};
