//! AbuseIPDB response payloads and derived classifications.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Standard `{"data": ...}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `GET /check` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpCheckData {
    pub ip_address: String,

    #[serde(default, deserialize_with = "null_as_false")]
    pub is_public: bool,

    #[serde(default)]
    pub ip_version: Option<u8>,

    /// Upstream sends `null` when whitelist status is unknown.
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_whitelisted: bool,

    /// Abuse confidence score (0-100).
    pub abuse_confidence_score: u8,

    #[serde(default)]
    pub country_code: Option<String>,

    #[serde(default)]
    pub country_name: Option<String>,

    /// Usage type (e.g., "Data Center/Web Hosting/Transit").
    #[serde(default)]
    pub usage_type: Option<String>,

    #[serde(default)]
    pub isp: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub hostnames: Vec<String>,

    #[serde(default, deserialize_with = "null_as_false")]
    pub is_tor: bool,

    #[serde(default)]
    pub total_reports: u32,

    #[serde(default)]
    pub num_distinct_users: u32,

    #[serde(default)]
    pub last_reported_at: Option<String>,

    /// Only present when the lookup was made with `verbose`.
    #[serde(default)]
    pub reports: Vec<ReportEntry>,
}

impl IpCheckData {
    /// Country name, falling back to the country code.
    pub fn country(&self) -> Option<&str> {
        self.country_name
            .as_deref()
            .or(self.country_code.as_deref())
    }
}

/// Individual abuse report attached to a verbose lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub reported_at: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub categories: Vec<u8>,

    #[serde(default)]
    pub reporter_id: Option<u64>,

    #[serde(default)]
    pub reporter_country_code: Option<String>,

    #[serde(default)]
    pub reporter_country_name: Option<String>,
}

/// `GET /check-block` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCheckData {
    pub network_address: String,
    pub netmask: String,
    pub min_address: String,
    pub max_address: String,

    /// IPv6 blocks report counts of 2^64 and above.
    #[serde(default, deserialize_with = "lenient_host_count")]
    pub num_possible_hosts: u128,

    #[serde(default)]
    pub address_space_desc: String,

    #[serde(default)]
    pub reported_address: Vec<BlockAddressEntry>,
}

/// Reported address inside a checked block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAddressEntry {
    pub ip_address: String,

    #[serde(default)]
    pub num_reports: u32,

    #[serde(default)]
    pub most_recent_report: Option<String>,

    pub abuse_confidence_percentage: u8,

    #[serde(default)]
    pub country_code: Option<String>,
}

/// `GET /blacklist` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlacklistResponse {
    #[serde(default)]
    pub meta: Option<BlacklistMeta>,

    #[serde(default)]
    pub data: Vec<BlacklistEntry>,
}

impl BlacklistResponse {
    /// Snapshot generation time as reported upstream.
    pub fn generated_at(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.generated_at.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistMeta {
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Blacklist entry. The upstream omits most optional fields on the basic plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistEntry {
    pub ip_address: String,
    pub abuse_confidence_score: u8,

    #[serde(default)]
    pub country_code: Option<String>,

    #[serde(default)]
    pub usage_type: Option<String>,

    #[serde(default)]
    pub isp: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub total_reports: Option<u32>,

    #[serde(default)]
    pub num_distinct_users: Option<u32>,

    #[serde(default)]
    pub last_reported_at: Option<String>,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Host counts past `u64::MAX` arrive as JSON floats.
fn lenient_host_count<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    let count = Option::<serde_json::Number>::deserialize(deserializer)?.and_then(|n| {
        n.as_u64().map(u128::from).or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u128)
        })
    });
    Ok(count.unwrap_or(0))
}

/// Five-band classification of an abuse confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Clean,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classify a score. Bands are inclusive at their lower bound.
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            RiskLevel::Critical
        } else if score >= 75 {
            RiskLevel::High
        } else if score >= 25 {
            RiskLevel::Medium
        } else if score >= 1 {
            RiskLevel::Low
        } else {
            RiskLevel::Clean
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::Clean => "CLEAN",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AbuseIPDB report categories, indexed by `code - 1`.
const ABUSE_CATEGORIES: [&str; 23] = [
    "DNS Compromise",
    "DNS Poisoning",
    "Fraud Orders",
    "DDoS Attack",
    "FTP Brute-Force",
    "Ping of Death",
    "Phishing",
    "Fraud VoIP",
    "Open Proxy",
    "Web Spam",
    "Email Spam",
    "Blog Spam",
    "VPN IP",
    "Port Scan",
    "Hacking",
    "SQL Injection",
    "Spoofing",
    "Brute-Force",
    "Bad Web Bot",
    "Exploited Host",
    "Web App Attack",
    "SSH",
    "IoT Targeted",
];

/// Human-readable name for a report category code.
pub fn category_name(code: u8) -> String {
    usize::from(code)
        .checked_sub(1)
        .and_then(|idx| ABUSE_CATEGORIES.get(idx))
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Category {}", code))
}
