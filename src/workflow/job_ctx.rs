//! 任务处理上下文
//!
//! 封装"我正在处理第几个任务、叫什么"这一信息，只用于日志

use std::fmt::Display;

/// 任务处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 任务序号（从1开始）
    pub job_index: usize,

    /// 任务总数
    pub total: usize,

    /// 任务名
    pub name: String,
}

impl JobCtx {
    pub fn new(job_index: usize, total: usize, name: impl Into<String>) -> Self {
        Self {
            job_index,
            total,
            name: name.into(),
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[任务 {}/{} {}]", self.job_index, self.total, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(JobCtx::new(2, 5, "BRCA1").to_string(), "[任务 2/5 BRCA1]");
    }
}
