//! 任务跟踪
//!
//! - `HandlePoller` - 按任务链接反复请求状态页面（配合直连方式）
//! - `poll_ui` - 在浏览器当前页面上等待完成徽标（配合浏览器方式）

pub mod handle_poller;
pub mod ui_poller;

pub use handle_poller::HandlePoller;
pub use ui_poller::poll_ui;
