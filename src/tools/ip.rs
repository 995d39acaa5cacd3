//! `check_ip` and `bulk_check`.

use super::schema::{ArgSchema, FieldSpec, StringFormat};
use super::{parse_args, OperationSpec, ToolError, ToolHandler};
use crate::api::types::{Envelope, IpCheckData};
use crate::api::{ApiError, UpstreamApi};
use crate::summary::{summarize_bulk, summarize_ip, BulkOutcome, BulkResult, IpSummaryOptions};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on addresses per bulk check.
pub const MAX_BULK_ADDRESSES: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CheckIpArgs {
    pub ip_address: String,
    pub max_age_days: u16,
    pub verbose: bool,
    pub threshold: u8,
}

#[derive(Debug, Deserialize)]
pub struct BulkCheckArgs {
    pub ip_addresses: Vec<String>,
    pub max_age_days: u16,
    pub threshold: u8,
}

fn max_age_field(description: &'static str) -> FieldSpec {
    FieldSpec::integer("max_age_days", description, 1, 365).default_value(30)
}

pub fn check_ip_operation() -> OperationSpec {
    OperationSpec::new(
        "check_ip",
        "Check the reputation of a single IP address using AbuseIPDB. Returns abuse confidence \
         score (0–100%), risk level, ISP, country, total reports, and optional verbose report details.",
        ArgSchema::new(vec![
            FieldSpec::string("ip_address", "IPv4 or IPv6 address to check")
                .required()
                .format(StringFormat::IpAddress),
            max_age_field("Look-back window in days for abuse reports (1–365, default: 30)"),
            FieldSpec::boolean(
                "verbose",
                "Include individual report details in the response (default: false)",
            )
            .default_value(false),
            FieldSpec::integer(
                "threshold",
                "Abuse confidence % threshold for flagging the IP (0–100, default: 75)",
                0,
                100,
            )
            .default_value(75),
        ]),
        Arc::new(CheckIpHandler),
    )
}

pub fn bulk_check_operation() -> OperationSpec {
    OperationSpec::new(
        "bulk_check",
        "Check the reputation of multiple IP addresses in batch (up to 100). Returns a summary of \
         flagged IPs with confidence scores, risk levels, and country/ISP information.",
        ArgSchema::new(vec![
            FieldSpec::string_list(
                "ip_addresses",
                "List of IPv4/IPv6 addresses to check (up to 100)",
                1,
                MAX_BULK_ADDRESSES,
            )
            .required(),
            max_age_field("Look-back window in days (1–365, default: 30)"),
            FieldSpec::integer(
                "threshold",
                "Abuse confidence % threshold for flagging (0–100, default: 75)",
                0,
                100,
            )
            .default_value(75),
        ]),
        Arc::new(BulkCheckHandler),
    )
}

/// Look up one address via `GET /check`.
pub async fn lookup_ip(
    api: &dyn UpstreamApi,
    ip: &str,
    max_age_days: u16,
    verbose: bool,
) -> Result<IpCheckData, ApiError> {
    let params = [
        ("ipAddress", ip.to_string()),
        ("maxAgeInDays", max_age_days.to_string()),
        ("verbose", verbose.to_string()),
    ];
    let envelope: Envelope<IpCheckData> = api.get("/check", &params).await?.json()?;
    Ok(envelope.data)
}

struct CheckIpHandler;

#[async_trait]
impl ToolHandler for CheckIpHandler {
    async fn call(
        &self,
        api: &dyn UpstreamApi,
        args: JsonMap<String, Value>,
    ) -> Result<String, ToolError> {
        let args: CheckIpArgs = parse_args(args)?;
        let data = lookup_ip(api, &args.ip_address, args.max_age_days, args.verbose).await?;

        debug!(
            ip = %args.ip_address,
            score = data.abuse_confidence_score,
            reports = data.total_reports,
            "IP lookup complete"
        );

        Ok(summarize_ip(
            &data,
            IpSummaryOptions {
                threshold: args.threshold,
                verbose: args.verbose,
            },
        ))
    }
}

struct BulkCheckHandler;

#[async_trait]
impl ToolHandler for BulkCheckHandler {
    async fn call(
        &self,
        api: &dyn UpstreamApi,
        args: JsonMap<String, Value>,
    ) -> Result<String, ToolError> {
        let args: BulkCheckArgs = parse_args(args)?;
        bulk_check(api, &args.ip_addresses, args.max_age_days, args.threshold).await
    }
}

/// Trim, drop empties and deduplicate, keeping first-seen order.
pub fn dedup_addresses(addresses: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    addresses
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .filter(|a| seen.insert(*a))
        .map(str::to_string)
        .collect()
}

/// Check every address, one request at a time.
///
/// Requests are strictly sequential to stay within upstream rate limits. A
/// failed lookup is recorded against its address and never aborts the batch.
pub async fn bulk_check(
    api: &dyn UpstreamApi,
    addresses: &[String],
    max_age_days: u16,
    threshold: u8,
) -> Result<String, ToolError> {
    if addresses.is_empty() {
        return Err(ToolError::InvalidArgument(
            "ip_addresses list is required".to_string(),
        ));
    }
    if addresses.len() > MAX_BULK_ADDRESSES {
        return Err(ToolError::InvalidArgument(format!(
            "Maximum {} IP addresses per bulk check (got {})",
            MAX_BULK_ADDRESSES,
            addresses.len()
        )));
    }

    let unique = dedup_addresses(addresses);
    let mut results = Vec::with_capacity(unique.len());

    for ip in unique {
        let outcome = match lookup_ip(api, &ip, max_age_days, false).await {
            Ok(data) => BulkOutcome::Success {
                score: data.abuse_confidence_score,
                country: data.country().map(str::to_string),
                isp: data.isp,
                reports: data.total_reports,
            },
            Err(e) => {
                warn!(ip = %ip, error = %e, "Bulk lookup failed");
                BulkOutcome::Failure {
                    error: e.to_string(),
                }
            }
        };
        results.push(BulkResult { ip, outcome });
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    debug!(
        addresses = results.len(),
        failed = failed,
        "Bulk check complete"
    );

    Ok(summarize_bulk(&results, threshold))
}
