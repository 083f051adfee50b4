use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// API 调用错误
    Api(ApiError),
    /// 考试流程错误
    Flow(FlowError),
    /// 文件操作错误
    File(FileError),
    /// 证书生成错误
    Certificate(CertificateError),
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::Flow(e) => write!(f, "流程错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Certificate(e) => write!(f, "证书错误: {}", e),
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Flow(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Certificate(e) => Some(e),
            AppError::Browser(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// API 调用错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应（非 2xx），body 为服务端返回原文
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 管理端凭证失效（401），调用方需要强制登出
    SessionExpired {
        endpoint: String,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { endpoint, source } => {
                write!(f, "API请求失败 ({}): {}", endpoint, source)
            }
            ApiError::BadResponse {
                endpoint,
                status,
                body,
            } => {
                write!(
                    f,
                    "API返回错误响应 ({}): status={}, body={}",
                    endpoint, status, body
                )
            }
            ApiError::SessionExpired { endpoint } => {
                write!(f, "Session expired ({})", endpoint)
            }
            ApiError::JsonParseFailed { source } => {
                write!(f, "JSON解析失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 考试流程错误
///
/// 状态机的守卫条件被违反时抛出
#[derive(Debug, PartialEq, Eq)]
pub enum FlowError {
    /// 呼号为空
    EmptyCallsign,
    /// 未选择考试
    NoTestSelected,
    /// 考试ID不存在
    TestNotFound {
        test_id: String,
    },
    /// 缺少确认（开始/放弃都需要确认弹窗）
    ConfirmationMissing,
    /// 提交后答案已锁定
    AnswersLocked,
    /// 当前段落未开放答题区
    QuestionsHidden,
    /// 当前段落未开放抄收区
    CopyHidden,
    /// 题目ID不存在
    UnknownQuestion {
        question_id: String,
    },
    /// 提交条件不满足
    NotReadyToSubmit {
        audio_played: bool,
        answered: usize,
        total: usize,
    },
    /// 当前视图不允许该操作
    WrongView {
        action: &'static str,
        view: &'static str,
    },
    /// 证书不可用（未通过，或服务端尚未签发）
    CertificateUnavailable,
    /// 编辑器索引超出范围
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::EmptyCallsign => write!(f, "呼号不能为空"),
            FlowError::NoTestSelected => write!(f, "尚未选择考试"),
            FlowError::TestNotFound { test_id } => write!(f, "考试不存在: {}", test_id),
            FlowError::ConfirmationMissing => write!(f, "操作需要先确认"),
            FlowError::AnswersLocked => write!(f, "已提交，答案不可再修改"),
            FlowError::QuestionsHidden => write!(f, "当前段落未开放答题区"),
            FlowError::CopyHidden => write!(f, "当前段落未开放抄收区"),
            FlowError::UnknownQuestion { question_id } => {
                write!(f, "题目不存在: {}", question_id)
            }
            FlowError::NotReadyToSubmit {
                audio_played,
                answered,
                total,
            } => {
                write!(
                    f,
                    "提交条件不满足: 音频播完={}, 已答 {}/{}",
                    audio_played, answered, total
                )
            }
            FlowError::WrongView { action, view } => {
                write!(f, "当前视图 {} 不允许操作: {}", view, action)
            }
            FlowError::CertificateUnavailable => write!(f, "证书不可用"),
            FlowError::IndexOutOfRange { index, len } => {
                write!(f, "索引 {} 超出范围 [0, {})", index, len)
            }
        }
    }
}

impl std::error::Error for FlowError {}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound {
        path: String,
    },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    DirectoryNotFound {
        path: String,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 证书生成错误
#[derive(Debug)]
pub enum CertificateError {
    /// 替换后仍有残留占位符
    UnresolvedPlaceholders {
        tokens: Vec<String>,
    },
    /// PDF 渲染失败
    PdfRenderFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for CertificateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateError::UnresolvedPlaceholders { tokens } => {
                write!(f, "模板占位符未全部替换: {}", tokens.join(", "))
            }
            CertificateError::PdfRenderFailed { source } => {
                write!(f, "PDF渲染失败: {}", source)
            }
        }
    }
}

impl std::error::Error for CertificateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CertificateError::PdfRenderFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 启动无头浏览器失败
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CDP 协议错误
    Protocol {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::LaunchFailed { source } => {
                write!(f, "启动无头浏览器失败: {}", source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::Protocol { source } => {
                write!(f, "浏览器协议错误: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::LaunchFailed { source }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::Protocol { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError::Flow(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err.url().map(|u| u.to_string()).unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Protocol {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建API错误响应错误
    pub fn bad_response(
        endpoint: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        })
    }

    /// 创建管理端凭证失效错误
    pub fn session_expired(endpoint: impl Into<String>) -> Self {
        AppError::Api(ApiError::SessionExpired {
            endpoint: endpoint.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
