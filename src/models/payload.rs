//! 提交给引物设计服务的请求数据

use serde::Serialize;

use crate::models::params::ParameterSet;

/// BED 输入字段名
pub const BED_INPUT_FIELD: &str = "BedInput";

/// 已校验的请求数据
///
/// 由 `RequestBuilder::prepare` 创建，创建后不可修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestPayload {
    fields: ParameterSet,
}

impl RequestPayload {
    pub(crate) fn new(fields: ParameterSet) -> Self {
        Self { fields }
    }

    /// 读取单个字段
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// 规范化后的 BED 文本
    pub fn bed_input(&self) -> &str {
        self.get(BED_INPUT_FIELD).unwrap_or_default()
    }

    pub fn fields(&self) -> &ParameterSet {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
