//! 参数校验服务 - 业务能力层
//!
//! 只负责"判断输入是否合法"，不拼装请求

use tracing::{debug, error, warn};

use crate::error::ValidationError;
use crate::models::bed::CoordinateSet;
use crate::models::params::Constraint;

/// 校验单个参数
///
/// - 枚举约束：值必须在集合中
/// - 区间约束：值转换为整数后必须落在闭区间内，无法转换视为不合法
/// - 没有约束（`constraint` 为 `None`）的参数直接通过
///
/// 注意：约束表之外的名字（`_xsrf`、`BedInput`，以及拼错的参数名）都会通过，
/// 未知的覆盖参数由 `RequestBuilder` 在合并前拦截。
pub fn validate(name: &str, value: &str, constraint: Option<&Constraint>) -> bool {
    debug!("校验参数 {} = {}", name, value);
    let Some(constraint) = constraint else {
        return true;
    };

    let ok = match constraint {
        Constraint::OneOf(allowed) => allowed.iter().any(|a| a == value),
        Constraint::Range(min, max) => value
            .trim()
            .parse::<i64>()
            .map(|v| *min <= v && v <= *max)
            .unwrap_or(false),
    };

    if !ok {
        error!("参数 {} 的值 '{}' 不满足约束 {}", name, value, constraint);
    }
    ok
}

/// 校验多行 BED 文本
///
/// # 返回
/// `(是否合法, 文本)`：合法时返回截断并规范化后的文本，
/// 不合法时原样返回输入，便于排查。
pub fn validate_range_set(text: &str, max_count: usize) -> (bool, String) {
    match parse_range_set(text, max_count) {
        Ok(set) => (true, set.to_bed_text()),
        Err(_) => (false, text.to_string()),
    }
}

/// 解析并校验多行 BED 文本，失败时给出具体行号和原因
pub fn parse_range_set(text: &str, max_count: usize) -> Result<CoordinateSet, ValidationError> {
    debug!("校验 BedInput 格式");
    let set = CoordinateSet::parse(text, max_count).map_err(|e| {
        error!("{}", e);
        e
    })?;

    if set.truncated() > 0 {
        warn!(
            "⚠️ BedInput 共 {} 条，超过上限 {}，只处理前 {} 条",
            set.len() + set.truncated(),
            max_count,
            max_count
        );
    }

    Ok(set)
}
