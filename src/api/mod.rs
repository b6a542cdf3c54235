//! Remote API collaborator contract
//!
//! The store never talks HTTP itself. Whatever owns the transport (base URL,
//! auth headers, retries, timeouts) implements [`ApiClient`] and is injected
//! into [`crate::store::LinkStore`].
//!
//! ```text
//! UI → LinkStore ──→ ApiClient ──→ remote link service
//!          │
//!          └→ watch::Receiver<StoreState> → UI
//! ```

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

/// Successful collaborator response.
///
/// `data` is the decoded response body; an empty body is `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub data: Value,
}

impl ApiResponse {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Response without a body (e.g. `201 Created` with nothing attached)
    pub fn empty() -> Self {
        Self { data: Value::Null }
    }
}

/// Failed collaborator call.
///
/// Any non-2xx outcome, network failure or upstream timeout surfaces as this.
/// `message` is optional: callers fall back to a generic text when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Failure carrying only a message (no HTTP status, e.g. connection refused)
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self {
            status: None,
            message: Some(msg.into()),
        }
    }

    /// Failure carrying an HTTP status and a server-supplied message
    pub fn with_status<T: Into<String>>(status: u16, msg: T) -> Self {
        Self {
            status: Some(status),
            message: Some(msg.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Human-readable text for this failure, or `fallback` when the
    /// collaborator supplied no usable message.
    pub fn display_message(&self, fallback: &str) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.message.as_deref()) {
            (Some(status), Some(msg)) => write!(f, "{} ({})", msg, status),
            (Some(status), None) => write!(f, "request failed with status {}", status),
            (None, Some(msg)) => write!(f, "{}", msg),
            (None, None) => write!(f, "request failed"),
        }
    }
}

impl std::error::Error for ApiError {}

/// HTTP-verb collaborator consumed by the store.
///
/// Paths are relative to the service root (e.g. `/links`, `/links/promo`).
/// Query pairs are passed through verbatim.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<ApiResponse, ApiError>;

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError>;

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError>;

    async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError>;

    /// 获取 client 名称（用于日志）
    fn name(&self) -> &'static str {
        "ApiClient"
    }
}
