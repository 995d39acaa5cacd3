//! reqwest-backed AbuseIPDB client.

use super::{upstream_error_message, ApiError, ApiResponse, UpstreamApi};
use crate::config::AbuseIpdbConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upstream credential, resolved once per client.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Caller's own API key, sent as `Key`.
    NativeKey(String),
    /// Token for a proxy that injects the real key, sent as `Authorization: Bearer`.
    ProxyToken(String),
    Unauthenticated,
}

impl Credential {
    /// Pick the credential: an API key wins over an auth token. Empty values count as absent.
    pub fn resolve(api_key: Option<&str>, auth_token: Option<&str>) -> Self {
        let api_key = api_key.filter(|k| !k.is_empty());
        let auth_token = auth_token.filter(|t| !t.is_empty());

        match (api_key, auth_token) {
            (Some(key), _) => Credential::NativeKey(key.to_string()),
            (None, Some(token)) => Credential::ProxyToken(token.to_string()),
            (None, None) => Credential::Unauthenticated,
        }
    }

    /// Short label for logging.
    pub fn mode(&self) -> &'static str {
        match self {
            Credential::NativeKey(_) => "native-key",
            Credential::ProxyToken(_) => "proxy-token",
            Credential::Unauthenticated => "unauthenticated",
        }
    }

    /// Header carrying this credential, if any.
    fn header(&self) -> Result<Option<(HeaderName, HeaderValue)>, ApiError> {
        let (name, value) = match self {
            Credential::NativeKey(key) => (HeaderName::from_static("key"), key.clone()),
            Credential::ProxyToken(token) => (AUTHORIZATION, format!("Bearer {}", token)),
            Credential::Unauthenticated => return Ok(None),
        };

        let mut value = HeaderValue::from_str(&value).map_err(|_| {
            ApiError::InvalidConfig(format!(
                "{} credential contains characters not allowed in an HTTP header",
                self.mode()
            ))
        })?;
        value.set_sensitive(true);
        Ok(Some((name, value)))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::NativeKey(_) => f.write_str("NativeKey(<redacted>)"),
            Credential::ProxyToken(_) => f.write_str("ProxyToken(<redacted>)"),
            Credential::Unauthenticated => f.write_str("Unauthenticated"),
        }
    }
}

/// HTTP client bound to a base URL and a credential.
pub struct AbuseIpdbClient {
    client: Client,
    base_url: String,
    credential: Credential,
}

impl AbuseIpdbClient {
    /// Create a new client from configuration.
    pub fn new(config: &AbuseIpdbConfig) -> Result<Self, ApiError> {
        let credential =
            Credential::resolve(config.api_key.as_deref(), config.auth_token.as_deref());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some((name, value)) = credential.header()? {
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let base_url = config.effective_base_url().trim_end_matches('/').to_string();

        if credential == Credential::Unauthenticated {
            warn!(
                base_url = %base_url,
                "No AbuseIPDB credential configured; requests will be sent unauthenticated"
            );
        }
        info!(
            base_url = %base_url,
            auth_mode = credential.mode(),
            timeout_ms = config.timeout_ms,
            "AbuseIPDB client initialized"
        );

        Ok(Self {
            client,
            base_url,
            credential,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl UpstreamApi for AbuseIpdbClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(path);

        debug!(method = %method, path = path, "Querying AbuseIPDB");

        let response = self
            .client
            .request(method, &url)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(path = path, status = status.as_u16(), "AbuseIPDB response received");

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(path = path, "AbuseIPDB rate limit exceeded");
            return Err(ApiError::RateLimited {
                message: upstream_error_message(&body),
            });
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        Ok(ApiResponse::new(status.as_u16(), body))
    }
}
