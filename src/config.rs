//! Configuration types for the AbuseIPDB MCP server.

use serde::{Deserialize, Serialize};

/// Default upstream API root.
pub const DEFAULT_BASE_URL: &str = "https://api.abuseipdb.com/api/v2";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Upstream API access.
    #[serde(default)]
    pub abuseipdb: AbuseIpdbConfig,

    /// Output size limits.
    #[serde(default)]
    pub limits: Limits,

    /// Identity reported to the MCP host.
    #[serde(default)]
    pub server: ServerSettings,
}

/// AbuseIPDB API access configuration.
#[derive(Clone, Deserialize, Serialize)]
pub struct AbuseIpdbConfig {
    /// API key sent as the `Key` header (supports ${ENV_VAR} syntax).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Bearer token for a proxy base URL. Ignored when `api_key` is set.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Override of the API base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

impl Default for AbuseIpdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            auth_token: None,
            base_url: None,
            timeout_ms: default_timeout(),
        }
    }
}

// Hand-written so credentials never end up in logs.
impl std::fmt::Debug for AbuseIpdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbuseIpdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl AbuseIpdbConfig {
    /// Base URL to use, falling back to the public API root.
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }
}

fn default_timeout() -> u64 {
    30_000
}

/// Output size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Limits {
    /// Maximum estimated tokens a guarded operation may return.
    #[serde(default = "default_max_token_call")]
    pub max_token_call: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_token_call: default_max_token_call(),
        }
    }
}

fn default_max_token_call() -> usize {
    20_000
}

/// MCP server identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Server name.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Instructions sent to the host on initialize.
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            instructions: default_instructions(),
        }
    }
}

fn default_server_name() -> String {
    "abuseipdb-mcp-server".to_string()
}

fn default_instructions() -> String {
    "AbuseIPDB MCP Server - IP reputation, abuse confidence scoring, and threat blacklist"
        .to_string()
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from environment variables only.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields with the `ABUSEIPDB_*` and `MAX_TOKEN_CALL` variables when set.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Some(key) = env_non_empty("ABUSEIPDB_API_KEY") {
            self.abuseipdb.api_key = Some(key);
        }
        if let Some(token) = env_non_empty("ABUSEIPDB_AUTH_TOKEN") {
            self.abuseipdb.auth_token = Some(token);
        }
        if let Some(url) = env_non_empty("ABUSEIPDB_BASE_URL") {
            self.abuseipdb.base_url = Some(url);
        }
        if let Some(timeout) = env_non_empty("ABUSEIPDB_TIMEOUT") {
            self.abuseipdb.timeout_ms = timeout
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid ABUSEIPDB_TIMEOUT '{}': {}", timeout, e))?;
        }
        if let Some(max) = env_non_empty("MAX_TOKEN_CALL") {
            self.limits.max_token_call = max
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_TOKEN_CALL '{}': {}", max, e))?;
        }
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.abuseipdb.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than 0");
        }

        if self.limits.max_token_call == 0 {
            anyhow::bail!("max_token_call must be greater than 0");
        }

        if let Some(ref url) = self.abuseipdb.base_url {
            if !url.is_empty() {
                let parsed = reqwest::Url::parse(url)
                    .map_err(|e| anyhow::anyhow!("Invalid base_url '{}': {}", url, e))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    anyhow::bail!("base_url must use http or https: {}", url);
                }
            }
        }

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# AbuseIPDB MCP Server Configuration

abuseipdb:
  # BYOK mode: sent as the `Key` header
  api_key: "${ABUSEIPDB_API_KEY}"
  # Proxy mode: sent as `Authorization: Bearer <token>` when api_key is empty
  # auth_token: "${ABUSEIPDB_AUTH_TOKEN}"
  # base_url: "https://api.abuseipdb.com/api/v2"
  timeout_ms: 30000

# Token budget for check_block and get_blacklist output
limits:
  max_token_call: 20000

server:
  name: "abuseipdb-mcp-server"
"#
        .to_string()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}
