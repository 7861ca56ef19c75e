//! 服务端 HTML 页面解析
//!
//! `scraper::Html` 不是 `Send`，这里的函数都是同步的，只返回拥有所有权的结果，
//! 不要在 `.await` 期间持有解析后的文档。

use regex::Regex;
use scraper::{Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("无效的 CSS 选择器 {}: {:?}", css, e))
}

/// 任务页面链接: `{primer_path}/<id>`
pub fn task_link_pattern(primer_path: &str) -> Regex {
    Regex::new(&format!(r"{}/[^/?#\s]+/?$", regex::escape(primer_path)))
        .expect("任务链接正则表达式无效")
}

/// 结果下载链接: `{primer_path}/<id>/download`
pub fn download_link_pattern(primer_path: &str) -> Regex {
    Regex::new(&format!(r"{}/.+?/download", regex::escape(primer_path)))
        .expect("下载链接正则表达式无效")
}

/// 查找第一个 href 匹配 `pattern` 的链接
pub fn find_link(html: &str, pattern: &Regex) -> Option<String> {
    let document = Html::parse_document(html);
    let anchors = selector("a[href]");
    let href = document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| pattern.is_match(href))
        .map(str::to_string);
    href
}

/// 查询任务页面解析出的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// 已完成，附带下载链接（可能缺失）
    Done(Option<String>),
    /// 仍在运行
    Running,
    /// 无法识别
    Unknown,
}

/// 解析任务状态页面
///
/// - `<span id="shuaxin">Done</span>` 表示完成
/// - `<span class="badge badge-danger">Running...</span>` 表示运行中
pub fn parse_task_status(html: &str, download_pattern: &Regex) -> TaskStatus {
    let document = Html::parse_document(html);

    let done = document
        .select(&selector("span#shuaxin"))
        .next()
        .map(|span| span.text().collect::<String>().trim() == "Done")
        .unwrap_or(false);

    if done {
        let anchors = selector("a[href]");
        let link = document
            .select(&anchors)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| download_pattern.is_match(href))
            .map(str::to_string);
        return TaskStatus::Done(link);
    }

    let running = document
        .select(&selector("span.badge.badge-danger"))
        .any(|span| span.text().collect::<String>().trim() == "Running...");

    if running {
        TaskStatus::Running
    } else {
        TaskStatus::Unknown
    }
}

/// 读取 `<input name="...">` 的 value
pub fn find_input_value(html: &str, name: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let inputs = selector("input[name]");
    let value = document
        .select(&inputs)
        .find(|input| input.value().attr("name") == Some(name))
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_link_ignores_other_links() {
        let pattern = task_link_pattern("/muld");
        let html = r#"
            <a href="/">home</a>
            <a href="/muld">new task</a>
            <a href="/muld/abc123">your task</a>
        "#;
        assert_eq!(find_link(html, &pattern).as_deref(), Some("/muld/abc123"));
    }

    #[test]
    fn test_task_link_missing() {
        let pattern = task_link_pattern("/muld");
        assert_eq!(find_link("<p>busy</p><a href='/muld/'>x</a>", &pattern), None);
    }

    #[test]
    fn test_task_link_does_not_match_download() {
        let pattern = task_link_pattern("/muld");
        assert_eq!(find_link(r#"<a href="/muld/abc/download">d</a>"#, &pattern), None);
    }

    #[test]
    fn test_status_done_with_download_link() {
        let pattern = download_link_pattern("/muld");
        let html = r#"
            <span id="shuaxin"> Done </span>
            <a href="/muld/abc123">task</a>
            <a href="/muld/abc123/download">download</a>
        "#;
        assert_eq!(
            parse_task_status(html, &pattern),
            TaskStatus::Done(Some("/muld/abc123/download".to_string()))
        );
    }

    #[test]
    fn test_status_running() {
        let pattern = download_link_pattern("/muld");
        let html = r#"<span class="badge badge-danger">Running...</span>"#;
        assert_eq!(parse_task_status(html, &pattern), TaskStatus::Running);
    }

    #[test]
    fn test_status_unknown() {
        let pattern = download_link_pattern("/muld");
        assert_eq!(
            parse_task_status(r#"<span id="shuaxin">Failed</span>"#, &pattern),
            TaskStatus::Unknown
        );
        assert_eq!(parse_task_status("", &pattern), TaskStatus::Unknown);
    }

    #[test]
    fn test_find_input_value() {
        let html = r#"<form><input type="hidden" name="_xsrf" value="2|abcd"></form>"#;
        assert_eq!(find_input_value(html, "_xsrf").as_deref(), Some("2|abcd"));
        assert_eq!(find_input_value(html, "other"), None);
    }
}
