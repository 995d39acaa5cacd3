use super::{or_unknown, DEFAULT_THRESHOLD};
use crate::api::types::{category_name, IpCheckData, RiskLevel};

/// Reports shown in verbose mode. Extra reports are dropped without a trailer.
const MAX_VERBOSE_REPORTS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct IpSummaryOptions {
    /// Flag the address when its score is >= this value.
    pub threshold: u8,
    pub verbose: bool,
}

impl Default for IpSummaryOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            verbose: false,
        }
    }
}

/// Summarize a single-address lookup.
pub fn summarize_ip(data: &IpCheckData, options: IpSummaryOptions) -> String {
    let score = data.abuse_confidence_score;
    let risk = RiskLevel::from_score(score);

    let mut lines = vec![
        format!("IP Address:         {}", data.ip_address),
        format!("Risk Level:         {}", risk),
        format!("Abuse Confidence:   {}%", score),
        format!("Total Reports:      {}", data.total_reports),
        format!("Distinct Reporters: {}", data.num_distinct_users),
        format!(
            "Last Reported:      {}",
            data.last_reported_at.as_deref().unwrap_or("Never")
        ),
        format!("Country:            {}", or_unknown(data.country())),
        format!("ISP:                {}", or_unknown(data.isp.as_deref())),
        format!("Domain:             {}", or_unknown(data.domain.as_deref())),
        format!("Usage Type:         {}", or_unknown(data.usage_type.as_deref())),
        format!("Is Public:          {}", data.is_public),
        format!("Is Whitelisted:     {}", data.is_whitelisted),
        format!("Is Tor:             {}", data.is_tor),
    ];

    if score >= options.threshold {
        lines.push(format!(
            "\n⚠️  FLAGGED: Abuse confidence {}% meets or exceeds threshold of {}%",
            score, options.threshold
        ));
    }

    if data.is_whitelisted {
        lines.push("✅ Whitelisted".to_string());
    }

    if options.verbose && !data.reports.is_empty() {
        lines.push(format!("\nRecent Reports (up to {}):", MAX_VERBOSE_REPORTS));
        for report in data.reports.iter().take(MAX_VERBOSE_REPORTS) {
            let categories = report
                .categories
                .iter()
                .map(|&c| category_name(c))
                .collect::<Vec<_>>()
                .join(", ");
            let comment = report
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or("(no comment)");
            lines.push(format!(
                "  • {} [{}] – {}",
                report.reported_at, categories, comment
            ));
        }
    }

    lines.join("\n")
}
