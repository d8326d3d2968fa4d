pub mod logger;

use thiserror::Error;

/// 外部服务（补全 / 短句翻译）调用失败的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// 按 HTTP 状态码归类非成功响应
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            429 => ServiceError::RateLimited(body),
            500..=599 => ServiceError::Unavailable(format!("{}: {}", status, body)),
            code => ServiceError::Rejected { status: code, body },
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::MalformedResponse(e.to_string())
        } else if let Some(status) = e.status() {
            ServiceError::from_status(status, e.to_string())
        } else {
            ServiceError::Unavailable(e.to_string())
        }
    }
}

/// 文档无法进入后续阶段的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("could not read PDF: {0}")]
    Unreadable(String),

    #[error("no extractable text")]
    NoExtractableText,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OpenAI API key not found. Please add it to your secrets.")]
    MissingCredential,

    #[error("配置加载失败: {0}")]
    Load(#[from] config::ConfigError),

    #[error("secrets 文件解析失败: {0}")]
    Secrets(#[from] toml::de::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("event `{event}` is not accepted in state `{state}`")]
    InvalidTransition { state: String, event: &'static str },
}
