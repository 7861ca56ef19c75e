pub mod html;
pub mod http;
pub mod logging;

pub use http::{CookieJar, HeaderTable};
