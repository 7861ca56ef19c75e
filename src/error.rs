use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误（永不重试，调用方必须修正输入）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 网络层错误
    #[error("传输错误: {0}")]
    Transport(#[from] TransportError),
    /// 服务端状态错误（响应成功但缺少预期内容）
    #[error("服务错误: {0}")]
    Service(#[from] ServiceError),
    /// 任务轮询错误
    #[error("任务跟踪错误: {0}")]
    Tracking(#[from] TrackingError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// token 为空
    #[error("token 不能为空")]
    EmptyToken,
    /// BED 行格式错误
    #[error("BedInput 格式错误: 第 {line_no} 行 '{line}' 不符合 'chr<1-22|X|Y> <start> <end>'")]
    MalformedRange { line_no: usize, line: String },
    /// 起始位置不小于终止位置
    #[error("BedInput 区间错误: 第 {line_no} 行 '{line}' 的终止位置必须至少比起始位置大 1bp")]
    InvertedRange { line_no: usize, line: String },
    /// 坐标数值过大
    #[error("BedInput 坐标超出范围: 第 {line_no} 行 '{line}' 的坐标大于 {max}")]
    CoordinateOverflow {
        line_no: usize,
        line: String,
        max: u64,
    },
    /// 自定义参数不是扁平的键值映射
    #[error("自定义参数必须是扁平的键值映射: {found}")]
    NotFlatMapping { found: String },
    /// 未知参数名
    #[error("无效参数: {key}. 有效参数为: {valid_keys}")]
    UnknownParameter { key: String, valid_keys: String },
    /// 参数值超出约束
    #[error("参数 {name} 的值 '{value}' 超出约束范围")]
    OutOfConstraint { name: String, value: String },
    /// 浏览器表单需要的参数缺失
    #[error("请求数据缺少参数: {name}")]
    MissingParameter { name: String },
    /// 未知的设计方式
    #[error("无效的设计方式 '{method}'，请选择 'requests' 或 'selenium'")]
    InvalidMethod { method: String },
    /// 直连方式缺少 headers / cookies
    #[error("requests 方式需要同时提供 headers 和 cookies")]
    MissingSessionData,
}

/// 网络层错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 请求发送失败
    #[error("请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 非 200 响应
    #[error("请求 {url} 返回 HTTP 状态码 {status}")]
    BadStatus { url: String, status: u16 },
    /// 读取响应超时
    #[error("读取 {url} 超时 ({secs} 秒内没有收到数据)")]
    ReadTimeout { url: String, secs: u64 },
    /// 请求头无法编码
    #[error("无效的请求头 {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// 服务端状态错误
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 多次重试后仍未找到任务链接
    #[error("重试 {attempts} 次后仍未找到任务链接")]
    TaskLinkNotFound { attempts: usize },
    /// 页面中没有 token
    #[error("在 {url} 中未找到 {name} token")]
    TokenNotFound { url: String, name: String },
}

/// 任务轮询错误
#[derive(Debug, Error)]
pub enum TrackingError {
    /// 浏览器轮询超时
    #[error("等待超时: 引物设计在 {secs} 秒内未完成")]
    Timeout { secs: u64 },
    /// 网络异常次数超过上限
    #[error("查询任务状态时网络异常次数超过上限 ({max_retries}): {last_error}")]
    RetriesExhausted {
        max_retries: usize,
        last_error: String,
    },
    /// 超出轮询总时长
    #[error("轮询 {url} 超过最长等待时间 {secs} 秒")]
    DeadlineExceeded { url: String, secs: u64 },
    /// 句柄与跟踪方式不匹配
    #[error("任务句柄与跟踪方式不匹配: {0}")]
    HandleMismatch(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动或连接浏览器失败
    #[error("无法启动或连接浏览器: {0}")]
    LaunchFailed(String),
    /// CDP 调用失败
    #[error("浏览器指令执行失败: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    ScriptFailed(String),
    /// 页面元素不存在
    #[error("页面中未找到元素: {locator}")]
    ElementNotFound { locator: String },
    /// 提交后没有出现 Running 状态
    #[error("提交未成功启动，未找到 'Running...' 状态")]
    SubmissionNotStarted,
    /// 没有可用的浏览器会话
    #[error("当前没有打开的浏览器会话")]
    NoSession,
    /// 超过最大重试次数
    #[error("已达到最大重试次数 ({max_retries})，最后一次错误: {last_error}")]
    RetriesExhausted {
        max_retries: usize,
        last_error: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值无效
    #[error("配置项 {key} 无效: {reason}")]
    InvalidValue { key: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Cdp(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ScriptFailed(err.to_string()))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求失败错误
    pub fn request_failed(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Transport(TransportError::RequestFailed {
            url: url.into(),
            source,
        })
    }

    /// 创建非 200 响应错误
    pub fn bad_status(url: impl Into<String>, status: u16) -> Self {
        AppError::Transport(TransportError::BadStatus {
            url: url.into(),
            status,
        })
    }

    /// 创建元素缺失错误
    pub fn element_not_found(locator: impl ToString) -> Self {
        AppError::Browser(BrowserError::ElementNotFound {
            locator: locator.to_string(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为输入校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
