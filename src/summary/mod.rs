//! Text summaries of AbuseIPDB responses.
//!
//! Every summarizer is a pure function of its inputs: no clock, no I/O.
//! Output is bounded by fixed list caps so a single response cannot flood
//! the caller's context window (the bulk recap is the one exception, its
//! input is already capped at 100 addresses).

mod blacklist;
mod block;
mod bulk;
mod ip;

pub use blacklist::{
    summarize_blacklist, summarize_plain_blacklist, BlacklistSummaryOptions, ConfidenceHistogram,
};
pub use block::summarize_block;
pub use bulk::{summarize_bulk, BulkOutcome, BulkResult};
pub use ip::{summarize_ip, IpSummaryOptions};

/// Default flagging threshold for single and bulk lookups.
pub const DEFAULT_THRESHOLD: u8 = 75;

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("Unknown")
}

/// Format an integer with `,` thousands separators.
fn thousands(value: impl Into<u128>) -> String {
    let digits = value.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0u64), "0");
        assert_eq!(thousands(999u64), "999");
        assert_eq!(thousands(1000u64), "1,000");
        assert_eq!(thousands(65536u64), "65,536");
        assert_eq!(thousands(1234567u64), "1,234,567");
        assert_eq!(
            thousands(1u128 << 64),
            "18,446,744,073,709,551,616"
        );
    }
}
