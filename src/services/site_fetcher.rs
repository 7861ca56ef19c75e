//! 站点会话数据获取 - 业务能力层
//!
//! 打开任务提交页面，拿到后续请求需要的请求头、cookie 和 CSRF token

use reqwest::header::SET_COOKIE;
use reqwest::StatusCode;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, ServiceError};
use crate::utils::html;
use crate::utils::http::{browser_headers, build_client, build_header_map, parse_set_cookie};
use crate::utils::{CookieJar, HeaderTable};

/// 一次设计请求使用的会话数据，每次请求都要重新获取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSession {
    pub headers: HeaderTable,
    pub cookies: CookieJar,
    pub token: String,
}

/// 站点会话数据获取器
pub struct SiteFetcher<'a> {
    config: &'a Config,
    client: reqwest::Client,
}

impl<'a> SiteFetcher<'a> {
    pub fn new(config: &'a Config) -> AppResult<Self> {
        Ok(Self {
            config,
            client: build_client(config)?,
        })
    }

    /// 获取请求头、cookie 和 token
    ///
    /// token 优先取页面中 `<input name="_xsrf">` 的值，页面中没有时使用同名 cookie
    pub async fn fetch(&self) -> AppResult<SiteSession> {
        let url = self.config.primer_url();
        info!("🔑 正在获取站点会话数据: {}", url);

        let mut headers = browser_headers(self.config);
        let response = self
            .client
            .get(&url)
            .headers(build_header_map(&headers, &CookieJar::new())?)
            .send()
            .await
            .map_err(|e| {
                error!("获取站点数据失败: {}", e);
                AppError::request_failed(&url, e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("获取站点数据失败，HTTP 状态码: {}", status);
            return Err(AppError::bad_status(&url, status.as_u16()));
        }

        let cookies: CookieJar = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();
        debug!("收到 {} 个 cookie", cookies.len());

        let body = response
            .text()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        let token = html::find_input_value(&body, &self.config.xsrf_name)
            .or_else(|| cookies.get(&self.config.xsrf_name).cloned())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                error!("页面中未找到 {} token", self.config.xsrf_name);
                ServiceError::TokenNotFound {
                    url: url.clone(),
                    name: self.config.xsrf_name.clone(),
                }
            })?;

        headers.insert("Origin".to_string(), self.config.root_url.clone());
        headers.insert("Referer".to_string(), url);

        info!("✓ 会话数据获取成功");
        Ok(SiteSession {
            headers,
            cookies,
            token,
        })
    }
}
