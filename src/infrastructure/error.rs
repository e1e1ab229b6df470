use serde::{Deserialize, Serialize};
use thiserror::Error;

/// cherry-pick 流程中的错误类型
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PickError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("network error: {message}")]
    Network { message: String, url: Option<String> },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("failed to parse {content_type}: {message}")]
    Parsing { message: String, content_type: String },

    #[error("classifier {provider} failed: {message}")]
    Classifier { provider: String, message: String },

    #[error("local simulation failed: {message}")]
    Simulation { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// 网络、超时、非 2xx：总能通过降级链恢复
    Transport,
    /// 远端返回了无法使用的内容
    MalformedResponse,
    Configuration,
    /// 本地模拟或内部错误
    Critical,
}

impl PickError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PickError::Network { .. }
            | PickError::Timeout { .. }
            | PickError::HttpStatus { .. }
            | PickError::Classifier { .. } => ErrorCategory::Transport,
            PickError::Parsing { .. } => ErrorCategory::MalformedResponse,
            PickError::Configuration { .. } => ErrorCategory::Configuration,
            PickError::Simulation { .. } | PickError::Internal { .. } => ErrorCategory::Critical,
        }
    }

    /// 是否可以交给下一级降级策略处理
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::Transport
            | ErrorCategory::MalformedResponse
            | ErrorCategory::Configuration => true,
            ErrorCategory::Critical => false,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PickError::Configuration {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        PickError::Network {
            message: message.into(),
            url,
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        PickError::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn parsing(message: impl Into<String>, content_type: impl Into<String>) -> Self {
        PickError::Parsing {
            message: message.into(),
            content_type: content_type.into(),
        }
    }

    pub fn classifier(provider: impl Into<String>, message: impl Into<String>) -> Self {
        PickError::Classifier {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn simulation(message: impl Into<String>) -> Self {
        PickError::Simulation {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PickError {
    fn from(error: serde_json::Error) -> Self {
        PickError::Parsing {
            message: error.to_string(),
            content_type: "JSON".to_string(),
        }
    }
}

impl From<reqwest::Error> for PickError {
    fn from(error: reqwest::Error) -> Self {
        let url = error.url().map(|u| u.to_string());
        if error.is_timeout() {
            return PickError::Timeout {
                operation: url.unwrap_or_else(|| "request".to_string()),
                timeout_ms: 0,
            };
        }
        if error.is_decode() {
            return PickError::Parsing {
                message: error.to_string(),
                content_type: "JSON".to_string(),
            };
        }
        PickError::Network {
            message: error.to_string(),
            url,
        }
    }
}

impl From<anyhow::Error> for PickError {
    fn from(error: anyhow::Error) -> Self {
        PickError::Internal {
            message: error.to_string(),
        }
    }
}

pub type PickResult<T> = Result<T, PickError>;
