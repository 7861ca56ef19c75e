use serde::Deserialize;
use serde_json::Value as JsonValue;

/// 一个引物设计任务（来自 TOML 任务文件）
///
/// ```toml
/// name = "BRCA1 exons"
/// method = "requests"
/// bed_input = """
/// chr17	41196311	41196411
/// chr17	41197694	41197819
/// """
/// output = "brca1_primers.csv"
///
/// [params]
/// PrimerOptTm = 61
/// SnpFilter = "no"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DesignJob {
    pub name: String,
    /// 内联的 BED 文本
    #[serde(default)]
    pub bed_input: Option<String>,
    /// BED 文件路径（相对于任务文件所在目录）
    #[serde(default)]
    pub bed_file: Option<String>,
    /// 设计方式: requests / selenium
    #[serde(default = "default_method")]
    pub method: String,
    /// 覆盖默认值的参数
    #[serde(default)]
    pub params: Option<JsonValue>,
    /// 结果保存路径，缺省时根据任务名生成
    #[serde(default)]
    pub output: Option<String>,
    #[serde(skip)]
    pub file_path: Option<String>,
}

fn default_method() -> String {
    "requests".to_string()
}

impl DesignJob {
    /// 结果文件保存路径
    pub fn output_path(&self) -> String {
        self.output.clone().unwrap_or_else(|| {
            let stem: String = self
                .name
                .chars()
                .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
                .collect();
            format!("{}.csv", stem)
        })
    }
}
