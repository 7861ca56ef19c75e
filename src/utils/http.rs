//! 请求头与 cookie 的编码

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};

use crate::config::Config;
use crate::error::{AppResult, TransportError};

/// 请求头名 → 值
pub type HeaderTable = BTreeMap<String, String>;

/// cookie 名 → 值
pub type CookieJar = BTreeMap<String, String>;

/// 把请求头和 cookie 编码为 `HeaderMap`
///
/// cookie 合并为一个 `Cookie: a=1; b=2` 请求头
pub fn build_header_map(headers: &HeaderTable, cookies: &CookieJar) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::new();

    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }

    if !cookies.is_empty() {
        let cookie = cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        let value = HeaderValue::from_str(&cookie).map_err(|e| TransportError::InvalidHeader {
            name: "Cookie".to_string(),
            reason: e.to_string(),
        })?;
        map.insert(COOKIE, value);
    }

    Ok(map)
}

/// 解析单个 `Set-Cookie` 头，只取名称和值
pub fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// 模拟浏览器的默认请求头
pub fn browser_headers(config: &Config) -> HeaderTable {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
        ("Accept-Language", "zh-CN,zh;q=0.9"),
        ("Cache-Control", "max-age=0"),
        ("Referer", config.root_url.as_str()),
        (
            "User-Agent",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// 构建带超时设置的 HTTP 客户端
pub fn build_client(config: &Config) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.read_timeout)
        .build()
        .map_err(|e| crate::error::AppError::request_failed(config.root_url.clone(), e))
}
