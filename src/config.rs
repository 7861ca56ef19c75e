use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::params::{default_constraints, default_primer_params, ConstraintTable, ParameterSet};

/// 程序配置
///
/// 启动时构造一次，以引用传入 `RequestBuilder` 和 `Designer`。
#[derive(Clone, Debug)]
pub struct Config {
    /// 引物设计服务根地址
    pub root_url: String,
    /// 任务提交路径
    pub primer_path: String,
    /// 页面中 CSRF token 的字段名
    pub xsrf_name: String,
    /// 最大重试次数
    pub max_retries: usize,
    /// 提交重试间隔
    pub retry_interval: Duration,
    /// 任务状态查询间隔
    pub check_interval: Duration,
    /// 浏览器方式等待任务完成的超时时间
    pub waiting_timeout: Duration,
    /// 直连方式轮询的最长时间，None 表示不限制
    pub poll_deadline: Option<Duration>,
    /// 等待页面元素出现的超时时间
    pub element_timeout: Duration,
    /// 浏览器逐格输入时每格之后的停顿
    pub keystroke_delay: Duration,
    /// 单次提交最多的区间数
    pub primer_set_count: usize,
    /// 下载连接超时
    pub connect_timeout: Duration,
    /// 下载读取超时
    pub read_timeout: Duration,
    /// 已打开浏览器的调试端口，None 时启动新的无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 是否以无头模式启动
    pub headless: bool,
    /// 任务文件目录
    pub job_folder: String,
    /// 日志级别
    pub log_level: String,
    /// 日志文件，None 时输出到控制台
    pub log_file: Option<String>,
    // --- 引物参数 ---
    pub primer_params: ParameterSet,
    pub params_constraints: ConstraintTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_url: "https://mfeprimer3.igenetech.com".to_string(),
            primer_path: "/muld".to_string(),
            xsrf_name: "_xsrf".to_string(),
            max_retries: 3,
            retry_interval: Duration::from_secs(2),
            check_interval: Duration::from_secs(3),
            waiting_timeout: Duration::from_secs(300),
            poll_deadline: None,
            element_timeout: Duration::from_secs(30),
            keystroke_delay: Duration::from_millis(100),
            primer_set_count: 20,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            browser_debug_port: None,
            chrome_executable: None,
            headless: true,
            job_folder: "jobs".to_string(),
            log_level: "info".to_string(),
            log_file: None,
            primer_params: default_primer_params(),
            params_constraints: default_constraints(),
        }
    }
}

/// TOML 配置文件，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    root_url: Option<String>,
    primer_path: Option<String>,
    xsrf_name: Option<String>,
    max_retries: Option<usize>,
    retry_interval_secs: Option<u64>,
    check_interval_secs: Option<u64>,
    waiting_timeout_secs: Option<u64>,
    poll_deadline_secs: Option<u64>,
    element_timeout_secs: Option<u64>,
    keystroke_delay_ms: Option<u64>,
    primer_set_count: Option<usize>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    browser_debug_port: Option<u16>,
    chrome_executable: Option<String>,
    headless: Option<bool>,
    job_folder: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    primer_params: Option<ParameterSet>,
    params_constraints: Option<ConstraintTable>,
}

/// 环境变量读取器：按名字取值，方便测试时替换为固定的表
type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_parse<T: std::str::FromStr>(
    lookup: EnvLookup<'_>,
    name: &str,
    expected_type: &str,
) -> AppResult<Option<T>> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match raw.trim().parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(ConfigError::EnvVarParseFailed {
            var_name: name.to_string(),
            value: raw,
            expected_type: expected_type.to_string(),
        }
        .into()),
    }
}

fn env_secs(lookup: EnvLookup<'_>, name: &str) -> AppResult<Option<Duration>> {
    Ok(env_parse::<u64>(lookup, name, "秒数")?.map(Duration::from_secs))
}

fn env_bool(lookup: EnvLookup<'_>, name: &str) -> Option<bool> {
    lookup(name).map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "t"))
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().apply_env(&|name| std::env::var(name).ok())
    }

    /// 默认值 + 可选的 TOML 文件 + 环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            let file: ConfigFile = toml::from_str(&content).map_err(|e| {
                AppError::File(FileError::TomlParseFailed {
                    path: path.display().to_string(),
                    source: e,
                })
            })?;
            config = config.apply_file(file);
        }
        let config = config.apply_env(&|name| std::env::var(name).ok())?;
        config.check()?;
        Ok(config)
    }

    fn apply_file(self, file: ConfigFile) -> Self {
        let secs = |v: Option<u64>, d: Duration| v.map(Duration::from_secs).unwrap_or(d);
        Self {
            root_url: file.root_url.unwrap_or(self.root_url),
            primer_path: file.primer_path.unwrap_or(self.primer_path),
            xsrf_name: file.xsrf_name.unwrap_or(self.xsrf_name),
            max_retries: file.max_retries.unwrap_or(self.max_retries),
            retry_interval: secs(file.retry_interval_secs, self.retry_interval),
            check_interval: secs(file.check_interval_secs, self.check_interval),
            waiting_timeout: secs(file.waiting_timeout_secs, self.waiting_timeout),
            poll_deadline: file
                .poll_deadline_secs
                .map(Duration::from_secs)
                .or(self.poll_deadline),
            element_timeout: secs(file.element_timeout_secs, self.element_timeout),
            keystroke_delay: file
                .keystroke_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(self.keystroke_delay),
            primer_set_count: file.primer_set_count.unwrap_or(self.primer_set_count),
            connect_timeout: secs(file.connect_timeout_secs, self.connect_timeout),
            read_timeout: secs(file.read_timeout_secs, self.read_timeout),
            browser_debug_port: file.browser_debug_port.or(self.browser_debug_port),
            chrome_executable: file.chrome_executable.or(self.chrome_executable),
            headless: file.headless.unwrap_or(self.headless),
            job_folder: file.job_folder.unwrap_or(self.job_folder),
            log_level: file.log_level.unwrap_or(self.log_level),
            log_file: file.log_file.or(self.log_file),
            primer_params: file.primer_params.unwrap_or(self.primer_params),
            params_constraints: file.params_constraints.unwrap_or(self.params_constraints),
        }
    }

    /// 用环境变量覆盖配置，数值无法解析时报错而不是静默使用默认值
    fn apply_env(self, lookup: EnvLookup<'_>) -> AppResult<Self> {
        let text = |name: &str, d: String| lookup(name).unwrap_or(d);
        Ok(Self {
            root_url: text("MFE_PRIMER", self.root_url),
            primer_path: text("PRIMER_PATH", self.primer_path),
            xsrf_name: text("XSRF_NAME", self.xsrf_name),
            max_retries: env_parse(lookup, "MAX_RETRIES", "非负整数")?
                .unwrap_or(self.max_retries),
            retry_interval: env_secs(lookup, "RETRY_INTERVAL")?.unwrap_or(self.retry_interval),
            check_interval: env_secs(lookup, "CHECK_INTERVAL")?.unwrap_or(self.check_interval),
            waiting_timeout: env_secs(lookup, "WAITING_TIMEOUT")?.unwrap_or(self.waiting_timeout),
            poll_deadline: env_secs(lookup, "POLL_DEADLINE")?.or(self.poll_deadline),
            element_timeout: env_secs(lookup, "DEFAULT_TIMEOUT")?.unwrap_or(self.element_timeout),
            keystroke_delay: env_parse::<u64>(lookup, "KEYSTROKE_DELAY_MS", "毫秒数")?
                .map(Duration::from_millis)
                .unwrap_or(self.keystroke_delay),
            primer_set_count: env_parse(lookup, "PRIMER_SET_COUNT", "正整数")?
                .unwrap_or(self.primer_set_count),
            connect_timeout: env_secs(lookup, "CONNECT_TIMEOUT")?.unwrap_or(self.connect_timeout),
            read_timeout: env_secs(lookup, "READ_TIMEOUT")?.unwrap_or(self.read_timeout),
            browser_debug_port: env_parse(lookup, "REMOTE_DEBUGGING_PORT", "端口号")?
                .or(self.browser_debug_port),
            chrome_executable: lookup("CHROME_PATH").or(self.chrome_executable),
            headless: env_bool(lookup, "DEFAULT_HEADLESS").unwrap_or(self.headless),
            job_folder: text("JOB_FOLDER", self.job_folder),
            log_level: text("LOG_LEVEL", self.log_level),
            log_file: lookup("LOG_FILE").or(self.log_file),
            primer_params: self.primer_params,
            params_constraints: self.params_constraints,
        })
    }

    /// 基本合法性检查
    fn check(&self) -> AppResult<()> {
        if !self.root_url.starts_with("http://") && !self.root_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "root_url".to_string(),
                reason: format!("'{}' 不是 http(s) 地址", self.root_url),
            }
            .into());
        }
        if self.primer_set_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "primer_set_count".to_string(),
                reason: "必须大于 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// 任务提交页面地址
    pub fn primer_url(&self) -> String {
        format!("{}{}", self.root_url.trim_end_matches('/'), self.primer_path)
    }

    /// 把服务端返回的相对路径拼成绝对地址
    pub fn resolve(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}{}", self.root_url.trim_end_matches('/'), href)
        }
    }
}
