//! AbuseIPDB MCP server.
//!
//! Exposes AbuseIPDB IP reputation lookups as MCP tools and condenses the
//! upstream JSON into bounded, plain-text summaries an LLM can read.
//!
//! # Features
//!
//! - **Single-IP checks** - Abuse confidence, risk level, ISP and country, with optional report details
//! - **Bulk checks** - Up to 100 addresses, deduplicated and checked sequentially
//! - **CIDR block checks** - Top reported addresses in a network block
//! - **Blacklist retrieval** - Confidence histogram, top countries and sample entries
//! - **Token budget** - Oversized block and blacklist output is refused unless overridden
//! - **Two auth modes** - Native API key or a proxy bearer token
//!
//! # Example Configuration
//!
//! ```yaml
//! abuseipdb:
//!   api_key: "${ABUSEIPDB_API_KEY}"
//!   timeout_ms: 30000
//!
//! limits:
//!   max_token_call: 20000
//! ```

pub mod api;
pub mod budget;
pub mod config;
pub mod server;
pub mod summary;
pub mod tools;

pub use api::{AbuseIpdbClient, ApiError, Credential, UpstreamApi};
pub use budget::TokenBudgetGuard;
pub use config::Config;
pub use server::AbuseIpdbServer;
pub use tools::{Dispatcher, ToolRegistry};
