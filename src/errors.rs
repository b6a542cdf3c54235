use std::fmt;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStoreError {
    /// The collaborator call failed (network, non-2xx, or a server-side
    /// validation rejection, which look the same from here).
    Transport {
        status: Option<u16>,
        message: String,
    },
    Serialization(String),
    Config(String),
}

impl LinkStoreError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkStoreError::Transport { .. } => "E101",
            LinkStoreError::Serialization(_) => "E102",
            LinkStoreError::Config(_) => "E103",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkStoreError::Transport { .. } => "Transport Error",
            LinkStoreError::Serialization(_) => "Serialization Error",
            LinkStoreError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkStoreError::Transport { message, .. } => message,
            LinkStoreError::Serialization(msg) => msg,
            LinkStoreError::Config(msg) => msg,
        }
    }

    /// HTTP status reported by the collaborator, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LinkStoreError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkStoreError {}

// 便捷的构造函数
impl LinkStoreError {
    pub fn transport<T: Into<String>>(status: Option<u16>, msg: T) -> Self {
        LinkStoreError::Transport {
            status,
            message: msg.into(),
        }
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkStoreError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkStoreError::Config(msg.into())
    }

    /// Build a transport error from a collaborator failure.
    ///
    /// Uses the failure's own message when it has a non-blank one, otherwise
    /// `fallback`. The resulting message is exactly what the store records as
    /// its last error.
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        LinkStoreError::Transport {
            status: err.status,
            message: err.display_message(fallback),
        }
    }
}

impl From<serde_json::Error> for LinkStoreError {
    fn from(err: serde_json::Error) -> Self {
        LinkStoreError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for LinkStoreError {
    fn from(err: config::ConfigError) -> Self {
        LinkStoreError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkStoreError>;
