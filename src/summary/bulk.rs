use crate::api::types::RiskLevel;

const MAX_FLAGGED: usize = 20;
const MAX_FAILED: usize = 5;

/// Outcome of one address in a bulk check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Success {
        score: u8,
        country: Option<String>,
        isp: Option<String>,
        reports: u32,
    },
    Failure {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResult {
    pub ip: String,
    pub outcome: BulkOutcome,
}

impl BulkResult {
    pub fn failure(ip: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            outcome: BulkOutcome::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BulkOutcome::Success { .. })
    }

    /// Score of a successful lookup.
    pub fn score(&self) -> Option<u8> {
        match self.outcome {
            BulkOutcome::Success { score, .. } => Some(score),
            BulkOutcome::Failure { .. } => None,
        }
    }
}

/// Summarize bulk results, given in deduplicated input order.
pub fn summarize_bulk(results: &[BulkResult], threshold: u8) -> String {
    let successful = results.iter().filter(|r| r.is_success()).count();
    let failed: Vec<(&str, &str)> = results
        .iter()
        .filter_map(|r| match &r.outcome {
            BulkOutcome::Failure { error } => Some((r.ip.as_str(), error.as_str())),
            BulkOutcome::Success { .. } => None,
        })
        .collect();
    let flagged: Vec<&BulkResult> = results
        .iter()
        .filter(|r| r.score().is_some_and(|s| s >= threshold))
        .collect();

    let mut lines = vec![
        "Bulk Check Results:".to_string(),
        format!("  Unique IPs processed: {}", results.len()),
        format!("  Successful:           {}", successful),
        format!("  Failed:               {}", failed.len()),
        format!("  Flagged (≥{}%):       {}", threshold, flagged.len()),
    ];

    if !flagged.is_empty() {
        lines.push("\n⚠️  Flagged IPs:".to_string());
        for result in flagged.iter().take(MAX_FLAGGED) {
            if let BulkOutcome::Success {
                score,
                country,
                reports,
                ..
            } = &result.outcome
            {
                lines.push(format!(
                    "  • {} – {}% ({}, {} reports)",
                    result.ip,
                    score,
                    country.as_deref().unwrap_or("Unknown"),
                    reports
                ));
            }
        }
        if flagged.len() > MAX_FLAGGED {
            lines.push(format!("  ... and {} more", flagged.len() - MAX_FLAGGED));
        }
    }

    if !failed.is_empty() {
        lines.push("\n❌ Failed IPs:".to_string());
        for (ip, error) in failed.iter().take(MAX_FAILED) {
            lines.push(format!("  • {}: {}", ip, error));
        }
        if failed.len() > MAX_FAILED {
            lines.push(format!("  ... and {} more", failed.len() - MAX_FAILED));
        }
    }

    // Unbounded on purpose: callers cap the input at 100 addresses.
    lines.push("\nAll Results:".to_string());
    for result in results {
        match &result.outcome {
            BulkOutcome::Success {
                score, country, isp, ..
            } => lines.push(format!(
                "  {} – {} ({}%) – {} – {}",
                result.ip,
                RiskLevel::from_score(*score),
                score,
                country.as_deref().unwrap_or("Unknown"),
                isp.as_deref().unwrap_or("Unknown ISP")
            )),
            BulkOutcome::Failure { error } => {
                lines.push(format!("  {} – ERROR: {}", result.ip, error))
            }
        }
    }

    lines.join("\n")
}
