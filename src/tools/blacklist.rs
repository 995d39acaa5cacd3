//! `get_blacklist`.

use super::schema::{ArgSchema, FieldSpec};
use super::{parse_args, OperationSpec, ToolError, ToolHandler};
use crate::api::types::BlacklistResponse;
use crate::api::UpstreamApi;
use crate::summary::{summarize_blacklist, summarize_plain_blacklist, BlacklistSummaryOptions};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct GetBlacklistArgs {
    pub confidence_minimum: u8,
    #[serde(default)]
    pub limit: Option<u32>,
    pub plain_text: bool,
}

pub fn get_blacklist_operation() -> OperationSpec {
    OperationSpec::new(
        "get_blacklist",
        "Retrieve the AbuseIPDB blacklist of most-reported malicious IP addresses. Returns \
         confidence distribution, top countries, and sample entries. Requires AbuseIPDB \
         subscription plan.",
        ArgSchema::new(vec![
            FieldSpec::integer(
                "confidence_minimum",
                "Minimum abuse confidence score to include in blacklist (25–100, default: 90)",
                25,
                100,
            )
            .default_value(90),
            FieldSpec::integer(
                "limit",
                "Maximum number of entries to return (default: all entries up to plan limit)",
                1,
                500_000,
            ),
            FieldSpec::boolean(
                "plain_text",
                "Return plain text IP list instead of JSON (default: false)",
            )
            .default_value(false),
        ]),
        Arc::new(GetBlacklistHandler),
    )
    .with_budget_guard()
}

struct GetBlacklistHandler;

#[async_trait]
impl ToolHandler for GetBlacklistHandler {
    async fn call(
        &self,
        api: &dyn UpstreamApi,
        args: JsonMap<String, Value>,
    ) -> Result<String, ToolError> {
        let args: GetBlacklistArgs = parse_args(args)?;

        let mut params = vec![("confidenceMinimum", args.confidence_minimum.to_string())];
        if let Some(limit) = args.limit {
            params.push(("limit", limit.to_string()));
        }
        if args.plain_text {
            params.push(("plaintext", "true".to_string()));
        }

        let response = api.get("/blacklist", &params).await?;
        let options = BlacklistSummaryOptions {
            confidence_minimum: args.confidence_minimum,
            limit: args.limit,
        };

        if args.plain_text {
            return Ok(summarize_plain_blacklist(response.text(), options));
        }

        let snapshot: BlacklistResponse = response.json()?;
        debug!(
            entries = snapshot.data.len(),
            confidence_minimum = args.confidence_minimum,
            "Blacklist retrieved"
        );

        Ok(summarize_blacklist(&snapshot, options))
    }
}
