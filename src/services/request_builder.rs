//! 请求构建服务 - 业务能力层
//!
//! 合并默认参数、自定义参数、token 和 BED 文本，产出 `RequestPayload`

use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::models::params::{ConstraintTable, ParameterSet};
use crate::models::payload::{RequestPayload, BED_INPUT_FIELD};
use crate::services::validator;

/// 请求构建器
///
/// 不访问网络，相同输入总是得到相同的 `RequestPayload`。
pub struct RequestBuilder<'a> {
    defaults: &'a ParameterSet,
    constraints: &'a ConstraintTable,
    xsrf_name: &'a str,
    max_count: usize,
}

impl<'a> RequestBuilder<'a> {
    /// 使用配置中的默认参数和约束表
    pub fn new(config: &'a Config) -> Self {
        Self {
            defaults: &config.primer_params,
            constraints: &config.params_constraints,
            xsrf_name: &config.xsrf_name,
            max_count: config.primer_set_count,
        }
    }

    /// 使用自定义的默认参数和约束表
    pub fn with_tables(
        defaults: &'a ParameterSet,
        constraints: &'a ConstraintTable,
        xsrf_name: &'a str,
        max_count: usize,
    ) -> Self {
        Self {
            defaults,
            constraints,
            xsrf_name,
            max_count,
        }
    }

    /// 构建请求数据
    ///
    /// # 参数
    /// - `token`: CSRF token
    /// - `range_text`: 多行 BED 文本
    /// - `overrides`: 覆盖默认值的参数，必须是扁平的 JSON 对象
    ///
    /// # 返回
    /// 全部校验通过后的请求数据；任何一项不合法都直接返回错误，不做修正
    pub fn prepare(
        &self,
        token: &str,
        range_text: &str,
        overrides: Option<&JsonValue>,
    ) -> AppResult<RequestPayload> {
        info!("📝 正在准备请求数据...");

        if token.is_empty() {
            error!("token 不能为空");
            return Err(ValidationError::EmptyToken.into());
        }

        let ranges = validator::parse_range_set(range_text, self.max_count)?;

        let overrides = match overrides {
            Some(value) => flatten_overrides(value)?,
            None => ParameterSet::new(),
        };

        if let Some(key) = overrides
            .keys()
            .find(|key| !self.constraints.contains_key(key.as_str()))
        {
            let valid_keys = self
                .constraints
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            error!("无效参数: {}. 有效参数为: {}", key, valid_keys);
            return Err(ValidationError::UnknownParameter {
                key: key.clone(),
                valid_keys,
            }
            .into());
        }

        let mut fields = self.defaults.clone();
        fields.extend(overrides);
        fields.insert(self.xsrf_name.to_string(), token.to_string());
        fields.insert(BED_INPUT_FIELD.to_string(), ranges.to_bed_text());

        for (name, value) in &fields {
            if !validator::validate(name, value, self.constraints.get(name)) {
                return Err(ValidationError::OutOfConstraint {
                    name: name.clone(),
                    value: value.clone(),
                }
                .into());
            }
        }

        info!("✓ 请求数据准备完成，共 {} 个区间", ranges.len());
        Ok(RequestPayload::new(fields))
    }
}

/// 把 JSON 对象展开为字符串键值对
///
/// 只接受字符串、数字和布尔值；数组、嵌套对象和 null 都视为非扁平
fn flatten_overrides(value: &JsonValue) -> Result<ParameterSet, ValidationError> {
    let object = value.as_object().ok_or_else(|| {
        error!("自定义参数必须是键值映射");
        ValidationError::NotFlatMapping {
            found: value.to_string(),
        }
    })?;

    object
        .iter()
        .map(|(key, v)| {
            let text = match v {
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                other => {
                    return Err(ValidationError::NotFlatMapping {
                        found: format!("{}: {}", key, other),
                    })
                }
            };
            Ok((key.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    fn prepare(
        config: &Config,
        token: &str,
        bed: &str,
        overrides: Option<&JsonValue>,
    ) -> AppResult<RequestPayload> {
        RequestBuilder::new(config).prepare(token, bed, overrides)
    }

    fn validation_error(result: AppResult<RequestPayload>) -> ValidationError {
        match result {
            Err(AppError::Validation(e)) => e,
            other => panic!("期望校验错误, 实际: {:?}", other),
        }
    }

    #[test]
    fn test_single_range_with_defaults() {
        let config = Config::default();
        let payload = prepare(&config, "tok", "chr1\t1000\t2000\n", None).unwrap();

        assert_eq!(payload.bed_input(), "chr1\t1000\t2000");
        assert_eq!(payload.get("_xsrf"), Some("tok"));
        for key in config.primer_params.keys() {
            assert!(payload.get(key).is_some(), "缺少默认参数 {}", key);
        }
        assert_eq!(payload.len(), 17);
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let config = Config::default();
        let err = validation_error(prepare(&config, "", "chr1 1 2", None));
        assert!(matches!(err, ValidationError::EmptyToken));
    }

    #[test]
    fn test_out_of_range_chromosome_is_rejected() {
        let config = Config::default();
        let err = validation_error(prepare(&config, "tok", "chr23\t1\t2\n", None));
        assert!(matches!(err, ValidationError::MalformedRange { .. }));
    }

    #[test]
    fn test_override_exceeding_range_is_rejected() {
        let config = Config::default();
        let overrides = json!({"PrimerMinTm": "200"});
        let err = validation_error(prepare(&config, "tok", "chr1 1 2", Some(&overrides)));
        match err {
            ValidationError::OutOfConstraint { name, value } => {
                assert_eq!(name, "PrimerMinTm");
                assert_eq!(value, "200");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_override_key_lists_valid_keys() {
        let config = Config::default();
        let overrides = json!({"PrimerMinTM": "60"});
        let err = validation_error(prepare(&config, "tok", "chr1 1 2", Some(&overrides)));
        match err {
            ValidationError::UnknownParameter { key, valid_keys } => {
                assert_eq!(key, "PrimerMinTM");
                assert!(valid_keys.contains("PrimerMinTm"));
                assert!(valid_keys.contains("SnpFilter"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_non_mapping_overrides_are_rejected() {
        let config = Config::default();
        for bad in [json!(["DB", "hg19.fa"]), json!("DB=hg19.fa"), json!({"DB": {"v": 1}})] {
            let err = validation_error(prepare(&config, "tok", "chr1 1 2", Some(&bad)));
            assert!(matches!(err, ValidationError::NotFlatMapping { .. }));
        }
    }

    #[test]
    fn test_numeric_overrides_are_stringified() {
        let config = Config::default();
        let overrides = json!({"PrimerOptTm": 61, "SnpFilter": "no"});
        let payload = prepare(&config, "tok", "chr1 1 2", Some(&overrides)).unwrap();
        assert_eq!(payload.get("PrimerOptTm"), Some("61"));
        assert_eq!(payload.get("SnpFilter"), Some("no"));
        assert_eq!(payload.get("PrimerMinTm"), Some("58"));
    }

    #[test]
    fn test_bad_default_is_caught_by_revalidation() {
        let mut config = Config::default();
        config
            .primer_params
            .insert("DB".to_string(), "hg38.fa".to_string());
        let err = validation_error(prepare(&config, "tok", "chr1 1 2", None));
        assert!(matches!(err, ValidationError::OutOfConstraint { .. }));
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let config = Config::default();
        let overrides = json!({"Tm": "50", "DB": "mm10.fa"});
        let bed = "chrX 10 20\nchr2\t300\t400\n";

        let a = prepare(&config, "tok", bed, Some(&overrides)).unwrap();
        let b = prepare(&config, "tok", bed, Some(&overrides)).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_truncates_to_primer_set_count() {
        let config = Config::default();
        let bed: String = (0..30).map(|i| format!("chr1 {} {}\n", i, i + 10)).collect();
        let payload = prepare(&config, "tok", &bed, None).unwrap();
        assert_eq!(payload.bed_input().lines().count(), 20);
    }
}
