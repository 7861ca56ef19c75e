//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责选择提交方式和批量调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `designer` - 引物设计入口
//! - `design(payload, method, headers, cookies)` 是对外的唯一设计入口
//! - 根据 method 选择直连或浏览器方式
//!
//! ### `job_processor` - 单个任务处理器
//! - 获取会话数据 → 组装请求 → 设计 → 下载
//!
//! ### `app` - 批量任务处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载任务（Vec<DesignJob>），逐个处理并输出统计
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<DesignJob>)
//!     ↓
//! job_processor (处理单个 DesignJob)
//!     ↓
//! designer (选择 PrimerTransport)
//!     ↓
//! workflow::run_transport (submit → track → release)
//!     ↓
//! transport / tracking (直连 / 浏览器)
//!     ↓
//! infrastructure (JsExecutor / ChromeSession)
//! ```

pub mod app;
pub mod designer;
pub mod job_processor;

pub use app::{App, ProcessingStats};
pub use designer::{DesignMethod, Designer};
pub use job_processor::process_job;
