//! AbuseIPDB API access.

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{AbuseIpdbClient, Credential};

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Maximum number of characters of a raw error body kept in messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Successful upstream response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Raw body text.
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Error from the upstream API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("AbuseIPDB rate limit exceeded (HTTP 429): {message}")]
    RateLimited { message: String },

    #[error("AbuseIPDB API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(e)
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
}

/// Extract a readable message from an upstream error body.
///
/// AbuseIPDB answers errors with `{"errors": [{"detail": ..., "status": ...}]}`;
/// anything else is returned raw, truncated.
pub fn upstream_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let details: Vec<String> = parsed
            .errors
            .into_iter()
            .filter_map(|e| e.detail)
            .filter(|d| !d.is_empty())
            .collect();
        if !details.is_empty() {
            return details.join("; ");
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".to_string();
    }

    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}

/// Request capability the operation handlers depend on.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Issue a request against `path` (relative to the base URL) with query `params`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError>;

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<ApiResponse, ApiError> {
        self.request(Method::GET, path, params).await
    }
}
