use std::fmt;

/// 服务端任务句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskHandle {
    /// 任务页面的绝对 URL（直连方式）
    Url(String),
    /// 任务在当前浏览器页面中（浏览器方式）
    CurrentPage,
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskHandle::Url(url) => f.write_str(url),
            TaskHandle::CurrentPage => f.write_str("<当前页面>"),
        }
    }
}

/// 任务完成后的结果下载地址
///
/// 服务端会在一段时间后清理结果，调用方应尽快下载。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult(String);

impl TaskResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
