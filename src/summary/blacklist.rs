use super::thousands;
use crate::api::types::{BlacklistEntry, BlacklistResponse, RiskLevel};

const MAX_COUNTRIES: usize = 10;
const MAX_SAMPLE_ENTRIES: usize = 20;

/// Values echoed in the blacklist header. Filtering itself happens upstream.
#[derive(Debug, Clone, Copy)]
pub struct BlacklistSummaryOptions {
    pub confidence_minimum: u8,
    pub limit: Option<u32>,
}

impl Default for BlacklistSummaryOptions {
    fn default() -> Self {
        Self {
            confidence_minimum: 90,
            limit: None,
        }
    }
}

/// Four-band score histogram.
///
/// The 50 boundary makes this deliberately coarser than `RiskLevel`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfidenceHistogram {
    pub critical: u64,
    pub high: u64,
    pub elevated: u64,
    pub low: u64,
}

impl ConfidenceHistogram {
    pub fn from_entries(entries: &[BlacklistEntry]) -> Self {
        let mut histogram = Self::default();
        for entry in entries {
            match entry.abuse_confidence_score {
                90..=u8::MAX => histogram.critical += 1,
                75..=89 => histogram.high += 1,
                50..=74 => histogram.elevated += 1,
                _ => histogram.low += 1,
            }
        }
        histogram
    }
}

/// Count entries per country code in first-seen order.
fn country_counts(entries: &[BlacklistEntry]) -> Vec<(&str, u64)> {
    let mut counts: Vec<(&str, u64)> = Vec::new();
    for entry in entries {
        let country = entry.country_code.as_deref().unwrap_or("Unknown");
        match counts.iter_mut().find(|(cc, _)| *cc == country) {
            Some((_, count)) => *count += 1,
            None => counts.push((country, 1)),
        }
    }
    // Stable: ties keep first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Summarize a JSON blacklist snapshot.
pub fn summarize_blacklist(snapshot: &BlacklistResponse, options: BlacklistSummaryOptions) -> String {
    let entries = &snapshot.data;
    let histogram = ConfidenceHistogram::from_entries(entries);

    let mut lines = vec![
        format!(
            "Blacklist Retrieved: {} entries",
            thousands(entries.len() as u64)
        ),
        format!(
            "Generated:           {}",
            snapshot.generated_at().unwrap_or("Unknown")
        ),
        format!("Minimum Confidence:  {}%", options.confidence_minimum),
    ];

    if let Some(limit) = options.limit {
        lines.push(format!("Limit Applied:       {}", thousands(u64::from(limit))));
    }

    lines.push("\nConfidence Distribution:".to_string());
    lines.push(format!("  • 90-100%: {}", thousands(histogram.critical)));
    lines.push(format!("  • 75-89%:  {}", thousands(histogram.high)));
    lines.push(format!("  • 50-74%:  {}", thousands(histogram.elevated)));
    lines.push(format!("  • 0-49%:   {}", thousands(histogram.low)));

    let countries = country_counts(entries);
    if !countries.is_empty() {
        lines.push("\nTop Countries:".to_string());
        for (country, count) in countries.iter().take(MAX_COUNTRIES) {
            lines.push(format!("  • {}: {}", country, thousands(*count)));
        }
    }

    if !entries.is_empty() {
        let mut sorted: Vec<&BlacklistEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| b.abuse_confidence_score.cmp(&a.abuse_confidence_score));

        lines.push(format!(
            "\nSample Entries (top {} by confidence):",
            MAX_SAMPLE_ENTRIES
        ));
        for entry in sorted.iter().take(MAX_SAMPLE_ENTRIES) {
            let last = entry
                .last_reported_at
                .as_deref()
                .map(|ts| ts.get(..10).unwrap_or(ts))
                .unwrap_or("Unknown");
            lines.push(format!(
                "  • {} ({}) – {}% [{}] – last: {}",
                entry.ip_address,
                entry.country_code.as_deref().unwrap_or("?"),
                entry.abuse_confidence_score,
                RiskLevel::from_score(entry.abuse_confidence_score),
                last
            ));
        }
        if entries.len() > MAX_SAMPLE_ENTRIES {
            lines.push(format!(
                "  ... and {} more entries",
                thousands((entries.len() - MAX_SAMPLE_ENTRIES) as u64)
            ));
        }
    }

    lines.join("\n")
}

/// Summarize a `plaintext` blacklist body (one address per line).
pub fn summarize_plain_blacklist(body: &str, options: BlacklistSummaryOptions) -> String {
    let addresses: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut lines = vec![
        format!(
            "Blacklist Retrieved: {} entries (plain text)",
            thousands(addresses.len() as u64)
        ),
        format!("Minimum Confidence:  {}%", options.confidence_minimum),
    ];

    if let Some(limit) = options.limit {
        lines.push(format!("Limit Applied:       {}", thousands(u64::from(limit))));
    }

    if !addresses.is_empty() {
        lines.push(format!("\nFirst {} Addresses:", MAX_SAMPLE_ENTRIES));
        for address in addresses.iter().take(MAX_SAMPLE_ENTRIES) {
            lines.push(format!("  • {}", address));
        }
        if addresses.len() > MAX_SAMPLE_ENTRIES {
            lines.push(format!(
                "  ... and {} more entries",
                thousands((addresses.len() - MAX_SAMPLE_ENTRIES) as u64)
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(entries: serde_json::Value) -> BlacklistResponse {
        serde_json::from_value(json!({
            "meta": { "generatedAt": "2024-05-01T12:00:00+00:00" },
            "data": entries,
        }))
        .unwrap()
    }

    #[test]
    fn test_histogram_four_bands() {
        let data = snapshot(json!([
            { "ipAddress": "1.1.1.1", "abuseConfidenceScore": 95 },
            { "ipAddress": "1.1.1.2", "abuseConfidenceScore": 80 },
            { "ipAddress": "1.1.1.3", "abuseConfidenceScore": 60 },
            { "ipAddress": "1.1.1.4", "abuseConfidenceScore": 10 },
        ]));
        let histogram = ConfidenceHistogram::from_entries(&data.data);
        assert_eq!(
            histogram,
            ConfidenceHistogram {
                critical: 1,
                high: 1,
                elevated: 1,
                low: 1
            }
        );

        let text = summarize_blacklist(&data, BlacklistSummaryOptions::default());
        assert!(text.contains("  • 90-100%: 1"));
        assert!(text.contains("  • 75-89%:  1"));
        assert!(text.contains("  • 50-74%:  1"));
        assert!(text.contains("  • 0-49%:   1"));
    }

    #[test]
    fn test_histogram_boundaries() {
        let data = snapshot(json!([
            { "ipAddress": "1.1.1.1", "abuseConfidenceScore": 90 },
            { "ipAddress": "1.1.1.2", "abuseConfidenceScore": 89 },
            { "ipAddress": "1.1.1.3", "abuseConfidenceScore": 75 },
            { "ipAddress": "1.1.1.4", "abuseConfidenceScore": 74 },
            { "ipAddress": "1.1.1.5", "abuseConfidenceScore": 50 },
            { "ipAddress": "1.1.1.6", "abuseConfidenceScore": 49 },
        ]));
        let histogram = ConfidenceHistogram::from_entries(&data.data);
        assert_eq!(histogram.critical, 1);
        assert_eq!(histogram.high, 2);
        assert_eq!(histogram.elevated, 2);
        assert_eq!(histogram.low, 1);
    }

    #[test]
    fn test_country_ties_keep_first_seen_order() {
        let data = snapshot(json!([
            { "ipAddress": "1.1.1.1", "abuseConfidenceScore": 100, "countryCode": "NL" },
            { "ipAddress": "1.1.1.2", "abuseConfidenceScore": 100, "countryCode": "CN" },
            { "ipAddress": "1.1.1.3", "abuseConfidenceScore": 100 },
            { "ipAddress": "1.1.1.4", "abuseConfidenceScore": 100, "countryCode": "US" },
            { "ipAddress": "1.1.1.5", "abuseConfidenceScore": 100, "countryCode": "US" },
        ]));
        let counts = country_counts(&data.data);
        assert_eq!(
            counts,
            vec![("US", 2), ("NL", 1), ("CN", 1), ("Unknown", 1)]
        );

        let text = summarize_blacklist(&data, BlacklistSummaryOptions::default());
        let countries = text
            .split("Top Countries:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap();
        assert_eq!(
            countries,
            "  • US: 2\n  • NL: 1\n  • CN: 1\n  • Unknown: 1"
        );
    }

    #[test]
    fn test_top_countries_capped() {
        let entries: Vec<_> = (0..15)
            .map(|i| json!({ "ipAddress": format!("10.0.0.{}", i), "abuseConfidenceScore": 100, "countryCode": format!("C{}", i) }))
            .collect();
        let text = summarize_blacklist(&snapshot(json!(entries)), BlacklistSummaryOptions::default());
        assert!(text.contains("  • C9: 1"));
        assert!(!text.contains("  • C10: 1"));
    }

    #[test]
    fn test_sample_entries_sorted_and_truncated() {
        let entries: Vec<_> = (0..25u8)
            .map(|i| {
                json!({
                    "ipAddress": format!("192.0.2.{}", i),
                    "abuseConfidenceScore": 50 + i * 2,
                    "countryCode": "RU",
                    "lastReportedAt": if i == 24 { json!(null) } else { json!("2024-04-30T23:59:59+00:00") },
                })
            })
            .collect();
        let options = BlacklistSummaryOptions {
            confidence_minimum: 50,
            limit: Some(25_000),
        };
        let text = summarize_blacklist(&snapshot(json!(entries)), options);

        assert!(text.starts_with("Blacklist Retrieved: 25 entries"));
        assert!(text.contains("Generated:           2024-05-01T12:00:00+00:00"));
        assert!(text.contains("Minimum Confidence:  50%"));
        assert!(text.contains("Limit Applied:       25,000"));

        let samples: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("  • 192.0.2."))
            .collect();
        assert_eq!(samples.len(), 20);
        assert_eq!(samples[0], "  • 192.0.2.24 (RU) – 98% [CRITICAL] – last: Unknown");
        assert_eq!(samples[1], "  • 192.0.2.23 (RU) – 96% [CRITICAL] – last: 2024-04-30");
        assert!(text.ends_with("  ... and 5 more entries"));
    }

    #[test]
    fn test_empty_blacklist() {
        let text = summarize_blacklist(&BlacklistResponse::default(), BlacklistSummaryOptions::default());
        assert!(text.starts_with("Blacklist Retrieved: 0 entries"));
        assert!(text.contains("Generated:           Unknown"));
        assert!(text.contains("Minimum Confidence:  90%"));
        assert!(!text.contains("Limit Applied"));
        assert!(!text.contains("Top Countries"));
        assert!(!text.contains("Sample Entries"));
    }

    #[test]
    fn test_plain_blacklist() {
        let body: String = (0..23).map(|i| format!("203.0.113.{}\n", i)).collect();
        let text = summarize_plain_blacklist(&body, BlacklistSummaryOptions::default());
        assert!(text.starts_with("Blacklist Retrieved: 23 entries (plain text)"));
        assert_eq!(text.lines().filter(|l| l.starts_with("  • 203.")).count(), 20);
        assert!(text.ends_with("  ... and 3 more entries"));
    }
}
