use super::thousands;
use crate::api::types::{BlockAddressEntry, BlockCheckData};

const MAX_TOP_ADDRESSES: usize = 10;

/// Summarize a CIDR block check.
///
/// Addresses with confidence >= `confidence_threshold` count as high-confidence.
pub fn summarize_block(data: &BlockCheckData, confidence_threshold: u8) -> String {
    let reported = &data.reported_address;
    let high_confidence = reported
        .iter()
        .filter(|a| a.abuse_confidence_percentage >= confidence_threshold)
        .count();

    let mut lines = vec![
        format!("Network:           {}/{}", data.network_address, data.netmask),
        format!(
            "Address Range:     {} – {}",
            data.min_address, data.max_address
        ),
        format!("Possible Hosts:    {}", thousands(data.num_possible_hosts)),
        format!("Address Space:     {}", data.address_space_desc),
        format!("Reported IPs:      {}", reported.len()),
        format!(
            "High Confidence:   {} (≥{}%)",
            high_confidence, confidence_threshold
        ),
    ];

    if high_confidence > 0 {
        lines.push(format!(
            "\n⚠️  {} high-confidence threats detected in this block",
            high_confidence
        ));
    }

    if reported.is_empty() {
        lines.push("\n✅ No reported IP addresses found in this block".to_string());
        return lines.join("\n");
    }

    // Stable sort keeps upstream order among equal scores.
    let mut sorted: Vec<&BlockAddressEntry> = reported.iter().collect();
    sorted.sort_by(|a, b| b.abuse_confidence_percentage.cmp(&a.abuse_confidence_percentage));

    lines.push("\nTop Reported Addresses:".to_string());
    for entry in sorted.iter().take(MAX_TOP_ADDRESSES) {
        lines.push(format!(
            "  • {} – {}% confidence ({} reports, last: {})",
            entry.ip_address,
            entry.abuse_confidence_percentage,
            entry.num_reports,
            entry.most_recent_report.as_deref().unwrap_or("Unknown")
        ));
    }
    if sorted.len() > MAX_TOP_ADDRESSES {
        lines.push(format!(
            "  ... and {} more",
            sorted.len() - MAX_TOP_ADDRESSES
        ));
    }

    lines.join("\n")
}
