//! 业务能力层（Services）
//!
//! 每个服务描述"我能做什么"，只处理单次设计请求，不关心批量调度：
//! - `validator` - 参数与 BED 区间校验
//! - `RequestBuilder` - 组装请求数据
//! - `SiteFetcher` - 获取请求头、cookie 和 token
//! - `ResultDownloader` - 下载结果文件

pub mod request_builder;
pub mod result_downloader;
pub mod site_fetcher;
pub mod validator;

pub use request_builder::RequestBuilder;
pub use result_downloader::ResultDownloader;
pub use site_fetcher::{SiteFetcher, SiteSession};
