//! `check_block`.

use super::schema::{ArgSchema, FieldSpec, StringFormat};
use super::{parse_args, OperationSpec, ToolError, ToolHandler};
use crate::api::types::{BlockCheckData, Envelope};
use crate::api::UpstreamApi;
use crate::summary::summarize_block;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct CheckBlockArgs {
    pub network: String,
    pub max_age_days: u16,
    pub confidence_threshold: u8,
}

pub fn check_block_operation() -> OperationSpec {
    OperationSpec::new(
        "check_block",
        "Check all reported IP addresses within a CIDR network block against AbuseIPDB. Returns \
         network summary, total reported addresses, and top threats sorted by confidence score. \
         Requires AbuseIPDB subscription plan.",
        ArgSchema::new(vec![
            FieldSpec::string(
                "network",
                "CIDR network block to check, e.g. \"198.51.100.0/24\"",
            )
            .required()
            .format(StringFormat::Cidr),
            FieldSpec::integer(
                "max_age_days",
                "Look-back window in days for abuse reports (1–365, default: 30)",
                1,
                365,
            )
            .default_value(30),
            FieldSpec::integer(
                "confidence_threshold",
                "Confidence % to classify addresses as high-confidence threats (default: 75)",
                0,
                100,
            )
            .default_value(75),
        ]),
        Arc::new(CheckBlockHandler),
    )
    .with_budget_guard()
}

struct CheckBlockHandler;

#[async_trait]
impl ToolHandler for CheckBlockHandler {
    async fn call(
        &self,
        api: &dyn UpstreamApi,
        args: JsonMap<String, Value>,
    ) -> Result<String, ToolError> {
        let args: CheckBlockArgs = parse_args(args)?;

        let params = [
            ("network", args.network.clone()),
            ("maxAgeInDays", args.max_age_days.to_string()),
        ];
        let envelope: Envelope<BlockCheckData> = api.get("/check-block", &params).await?.json()?;
        let data = envelope.data;

        debug!(
            network = %args.network,
            reported = data.reported_address.len(),
            "Block check complete"
        );

        Ok(summarize_block(&data, args.confidence_threshold))
    }
}
