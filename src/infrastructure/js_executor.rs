//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"以及基于 JS 的 DOM 查询能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{AppResult, BrowserError};
use crate::transport::driver::Locator;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识 RequestPayload / 表单字段
/// - 不处理提交流程
pub struct JsExecutor {
    page: Page,
}

/// 定位元素的 JS 表达式，结果为元素或 null
fn element_expr(locator: &Locator) -> AppResult<String> {
    Ok(match locator {
        Locator::Css(selector) => {
            format!("document.querySelector({})", serde_json::to_string(selector)?)
        }
        Locator::XPath(expr) => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            serde_json::to_string(expr)?
        ),
    })
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// # 参数
    /// - `js_code`: 要执行的 JavaScript 代码
    ///
    /// # 返回
    /// 返回 JSON 值，脚本没有返回值时为 `Null`
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value)
            .map_err(|e| BrowserError::ScriptFailed(format!("脚本返回值无法解析: {}", e)).into())
    }

    /// 元素是否存在
    pub async fn exists(&self, locator: &Locator) -> AppResult<bool> {
        let js = format!("(() => {} !== null)()", element_expr(locator)?);
        self.eval_as(js).await
    }

    /// 元素是否存在且可见
    pub async fn visible(&self, locator: &Locator) -> AppResult<bool> {
        let js = format!(
            r#"(() => {{
                const el = {};
                if (!el) return false;
                const style = window.getComputedStyle(el);
                if (style.display === 'none' || style.visibility === 'hidden') return false;
                const rect = el.getBoundingClientRect();
                return rect.width > 0 && rect.height > 0;
            }})()"#,
            element_expr(locator)?
        );
        self.eval_as(js).await
    }

    /// 读取元素属性
    ///
    /// 优先读取 DOM 属性（`href` 会得到绝对地址），没有时回退到 HTML 属性
    pub async fn attribute(&self, locator: &Locator, name: &str) -> AppResult<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = {};
                if (!el) return null;
                const name = {};
                const value = el[name];
                if (typeof value === 'string') return value;
                return el.getAttribute(name);
            }})()"#,
            element_expr(locator)?,
            serde_json::to_string(name)?
        );
        self.eval_as(js).await
    }

    /// 清空输入框，元素不存在时返回 false
    pub async fn clear(&self, locator: &Locator) -> AppResult<bool> {
        let js = format!(
            r#"(() => {{
                const el = {};
                if (!el) return false;
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()"#,
            element_expr(locator)?
        );
        self.eval_as(js).await
    }

    /// 选择下拉框中 value 对应的选项，选项不存在时返回 false
    pub async fn select_value(&self, locator: &Locator, value: &str) -> AppResult<bool> {
        let js = format!(
            r#"(() => {{
                const el = {};
                if (!el) return false;
                const value = {};
                if (!Array.from(el.options).some(o => o.value === value)) return false;
                el.value = value;
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            element_expr(locator)?,
            serde_json::to_string(value)?
        );
        self.eval_as(js).await
    }

    /// 当前文档的 readyState
    pub async fn ready_state(&self) -> AppResult<String> {
        self.eval_as("document.readyState").await
    }
}
