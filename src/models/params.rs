//! 引物设计参数与约束表

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 参数名 → 参数值（按名称排序，保证编码结果稳定）
pub type ParameterSet = BTreeMap<String, String>;

/// 参数名 → 约束
pub type ConstraintTable = BTreeMap<String, Constraint>;

/// 单个参数的约束
///
/// TOML 中的写法与默认表一致：
/// ```toml
/// DB = ["hg19.fa", "mm10.fa"]
/// PrimerMinSize = [15, 35]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint {
    /// 枚举值
    OneOf(Vec<String>),
    /// 闭区间 [min, max]
    Range(i64, i64),
}

impl Constraint {
    pub fn one_of(values: &[&str]) -> Self {
        Constraint::OneOf(values.iter().map(|v| v.to_string()).collect())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::OneOf(values) => write!(f, "{{{}}}", values.join(", ")),
            Constraint::Range(min, max) => write!(f, "[{}, {}]", min, max),
        }
    }
}

/// 浏览器表单中的下拉框（参数名）
pub const DROPDOWN_FIELDS: [&str; 2] = ["DB", "SnpFilter"];

/// 浏览器表单中的数值输入框（CSS 选择器, 参数名）
pub const NUMERIC_FIELDS: [(&str, &str); 13] = [
    ("#PrimerMinSize", "PrimerMinSize"),
    ("#PrimerOptSize", "PrimerOptSize"),
    ("#PrimerMaxSize", "PrimerMaxSize"),
    ("#PrimerMinTm", "PrimerMinTm"),
    ("#PrimerOptTm", "PrimerOptTm"),
    ("#PrimerMaxTm", "PrimerMaxTm"),
    ("#ProdMinSize", "ProdMinSize"),
    ("#ProdMaxSize", "ProdMaxSize"),
    ("#DimerScoreID", "DimerScore"),
    ("#HairpinScoreID", "HairpinScore"),
    ("#TmID", "Tm"),
    ("#SpecMinSize", "SpecMinSize"),
    ("#SpecMaxSize", "SpecMaxSize"),
];

/// 默认引物参数
pub fn default_primer_params() -> ParameterSet {
    [
        ("DB", "hg19.fa"),
        ("SnpFilter", "yes"),
        ("PrimerMinSize", "17"),
        ("PrimerOptSize", "22"),
        ("PrimerMaxSize", "25"),
        ("PrimerMinTm", "58"),
        ("PrimerOptTm", "60"),
        ("PrimerMaxTm", "62"),
        ("ProdMinSize", "80"),
        ("ProdMaxSize", "120"),
        ("DimerScore", "5"),
        ("HairpinScore", "5"),
        ("Tm", "47"),
        ("SpecMinSize", "0"),
        ("SpecMaxSize", "500"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// 默认参数约束
pub fn default_constraints() -> ConstraintTable {
    [
        ("DB", Constraint::one_of(&["hg19.fa", "mm10.fa"])),
        ("SnpFilter", Constraint::one_of(&["yes", "no"])),
        ("PrimerMinSize", Constraint::Range(15, 35)),
        ("PrimerOptSize", Constraint::Range(15, 35)),
        ("PrimerMaxSize", Constraint::Range(15, 35)),
        ("PrimerMinTm", Constraint::Range(0, 100)),
        ("PrimerOptTm", Constraint::Range(0, 100)),
        ("PrimerMaxTm", Constraint::Range(0, 100)),
        ("ProdMinSize", Constraint::Range(0, 1_000_000)),
        ("ProdMaxSize", Constraint::Range(0, 1_000_000)),
        ("DimerScore", Constraint::Range(3, 20)),
        ("HairpinScore", Constraint::Range(3, 20)),
        ("Tm", Constraint::Range(0, 100)),
        ("SpecMinSize", Constraint::Range(0, 1_000_000)),
        ("SpecMaxSize", Constraint::Range(0, 1_000_000)),
    ]
    .into_iter()
    .map(|(k, c)| (k.to_string(), c))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_constraints_cover_same_keys() {
        let params = default_primer_params();
        let constraints = default_constraints();
        assert_eq!(params.len(), 15);
        assert!(params.keys().eq(constraints.keys()));
    }

    #[test]
    fn test_form_fields_are_known_parameters() {
        let params = default_primer_params();
        for name in DROPDOWN_FIELDS {
            assert!(params.contains_key(name));
        }
        for (_, name) in NUMERIC_FIELDS {
            assert!(params.contains_key(name));
        }
    }

    #[test]
    fn test_constraint_from_toml() {
        #[derive(Deserialize)]
        struct Table {
            constraints: ConstraintTable,
        }

        let table: Table = toml::from_str(
            r#"
            [constraints]
            DB = ["hg19.fa", "mm10.fa"]
            PrimerMinSize = [15, 35]
            "#,
        )
        .unwrap();

        assert_eq!(
            table.constraints["DB"],
            Constraint::one_of(&["hg19.fa", "mm10.fa"])
        );
        assert_eq!(table.constraints["PrimerMinSize"], Constraint::Range(15, 35));
    }
}
